//! Wiring configuration into a running service.

use crate::{
    ApiState, FolkreelConfig, InMemoryDirectory, RestoreSummary, StateFile, TracingNotifier,
    create_router, spawn_checkpoint_job, spawn_reset_jobs,
};
use folkreel_error::{FolkreelResult, HttpError};
use folkreel_interface::{GenerationNotifier, SpeechSynthesizer, TextGenerator};
use folkreel_models::{ChatCompletionClient, ThrottledTextGenerator, VoiceRssClient};
use folkreel_narrative::{GenerationService, Orchestrator, Stages};
use folkreel_quota::{AdmissionGate, QuotaLedger};
use folkreel_storage::{ArtifactStore, FileSystemArtifactStore, GenerationIndex};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// A fully wired service: generation pipeline, ledger and account directory.
#[derive(Debug, Clone)]
pub struct FolkreelApp {
    service: GenerationService,
    ledger: Arc<QuotaLedger>,
    directory: Arc<InMemoryDirectory>,
    state: Arc<StateFile>,
    checkpoint_every: Duration,
}

impl FolkreelApp {
    /// Build the production clients from configuration and wire them up.
    ///
    /// # Errors
    ///
    /// Fails when a provider key is missing, the prompts file is unusable, the
    /// output directory cannot be created or saved state cannot be loaded.
    #[instrument(skip_all)]
    pub async fn from_config(config: &FolkreelConfig) -> FolkreelResult<Self> {
        let text = ThrottledTextGenerator::new(
            ChatCompletionClient::from_config(&config.text)?,
            *config.text.max_rpm(),
        )
        .with_max_wait(Duration::from_secs(*config.text.timeout_secs()));
        let speech = VoiceRssClient::from_config(&config.speech)?;
        Self::with_clients(config, Arc::new(text), Arc::new(speech)).await
    }

    /// Wire the service around caller-supplied generative clients.
    ///
    /// Generations already in the output directory are indexed again and saved
    /// ledger counters are loaded before the app is returned.
    pub async fn with_clients(
        config: &FolkreelConfig,
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> FolkreelResult<Self> {
        let store: Arc<dyn ArtifactStore> =
            Arc::new(FileSystemArtifactStore::new(&config.storage.output_dir)?);
        let index = Arc::new(GenerationIndex::new());
        let ledger = Arc::new(QuotaLedger::new(config.quota.clone()));
        let directory = Arc::new(InMemoryDirectory::seeded(
            Arc::clone(&ledger),
            &config.accounts,
        ));

        let state = Arc::new(StateFile::new(
            config.storage.state_path(),
            Arc::clone(&ledger),
            Arc::clone(&index),
        ));
        let RestoreSummary {
            generations,
            accounts,
        } = state.restore(store.as_ref()).await?;

        let gate = AdmissionGate::new(
            Arc::clone(&ledger),
            directory.clone(),
            directory.clone(),
        );
        let stages = Stages::new(text, speech, config.prompts.load()?)
            .with_retry(config.retry.clone())
            .with_voice(config.speech.voice().clone());
        let notifier: Arc<dyn GenerationNotifier> = Arc::new(TracingNotifier);
        let orchestrator = Orchestrator::new(stages, store, index)
            .with_notifier(notifier)
            .with_notifier(state.clone());

        info!(
            output_dir = %config.storage.output_dir.display(),
            accounts = config.accounts.len(),
            restored_generations = generations,
            restored_accounts = accounts,
            "Service wired"
        );
        Ok(Self {
            service: GenerationService::new(gate, orchestrator),
            ledger,
            directory,
            state,
            checkpoint_every: Duration::from_secs(config.storage.checkpoint_secs.max(1)),
        })
    }

    /// Save ledger and counter state now.
    ///
    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub async fn checkpoint(&self) -> FolkreelResult<()> {
        Ok(self.state.save().await?)
    }

    /// The state file.
    pub fn state(&self) -> &Arc<StateFile> {
        &self.state
    }

    /// The generation service.
    pub fn service(&self) -> &GenerationService {
        &self.service
    }

    /// The quota ledger.
    pub fn ledger(&self) -> &Arc<QuotaLedger> {
        &self.ledger
    }

    /// The account directory.
    pub fn directory(&self) -> &Arc<InMemoryDirectory> {
        &self.directory
    }

    /// Router over this app's service.
    pub fn router(&self) -> axum::Router {
        create_router(ApiState::new(self.service.clone()))
    }
}

/// Serve the API on `bind` until Ctrl-C, with reset and checkpoint jobs running
/// alongside. State is saved once more on the way out.
#[instrument(skip(app))]
pub async fn serve(app: FolkreelApp, bind: &str) -> FolkreelResult<()> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| HttpError::new(format!("Failed to bind {}: {}", bind, e)))?;
    let jobs = spawn_reset_jobs(Arc::clone(app.ledger()));
    let checkpoints = spawn_checkpoint_job(Arc::clone(app.state()), app.checkpoint_every);

    info!(bind, "Listening");
    let result = axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HttpError::new(format!("Server error: {}", e)));

    jobs.abort();
    checkpoints.abort();
    app.checkpoint().await?;
    info!("Server stopped");
    Ok(result?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
