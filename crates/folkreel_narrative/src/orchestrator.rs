//! Sequencing, persistence and accounting of one generation.

use crate::{SCENES_FAILED, StageOutcome, Stages, Voiceover};
use chrono::{DateTime, Utc};
use folkreel_core::{
    AccountId, AccountUsage, ArtifactKind, ArtifactRef, ArtifactSet, GenerationEvent,
    GenerationId, GenerationMetadata, GenerationRecord, validate_country,
};
use folkreel_error::{PipelineError, PipelineErrorKind, StorageError};
use folkreel_interface::GenerationNotifier;
use folkreel_quota::Admission;
use folkreel_storage::{ArtifactStore, GenerationIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, error, info, instrument, warn};

/// Text produced by a run, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Story text
    pub story: String,
    /// Voiceover script
    pub voiceover: String,
    /// Scene breakdown or [`SCENES_FAILED`]
    pub scenes: String,
    /// Whether audio was stored
    pub audio_available: bool,
}

/// A persisted and counted generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// The new record
    pub record: GenerationRecord,
    /// Stored text
    pub content: GeneratedContent,
    /// Stages that fell back (`voiceover_audio`, `scenes`)
    pub degraded: Vec<String>,
    /// Account usage after the commit
    pub usage: AccountUsage,
}

impl GenerationOutcome {
    /// Whether any stage fell back.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Runs stages in order and persists what they produce.
///
/// Story and script failures stop the run with nothing stored. Audio and scene
/// failures are replaced by fallbacks. The admission permit is committed only
/// after the artifacts, metadata and record are all saved.
#[derive(Clone)]
pub struct Orchestrator {
    stages: Stages,
    store: Arc<dyn ArtifactStore>,
    index: Arc<GenerationIndex>,
    notifiers: Vec<Arc<dyn GenerationNotifier>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("stages", &self.stages)
            .field("notifiers", &self.notifiers.len())
            .finish_non_exhaustive()
    }
}

/// A reserved identity. Dropping it gives the identity back unless the record
/// was indexed first, so a cancelled run never strands its reservation.
struct IdentityClaim {
    index: Arc<GenerationIndex>,
    id: GenerationId,
}

impl Drop for IdentityClaim {
    fn drop(&mut self) {
        self.index.release_identity(&self.id);
    }
}

/// What one run has put in the store so far.
#[derive(Debug, Default)]
struct Written {
    artifacts: Vec<ArtifactKind>,
    metadata: bool,
}

impl Orchestrator {
    /// Orchestrator writing to `store` and recording into `index`.
    pub fn new(stages: Stages, store: Arc<dyn ArtifactStore>, index: Arc<GenerationIndex>) -> Self {
        Self {
            stages,
            store,
            index,
            notifiers: Vec::new(),
        }
    }

    /// Also notify `notifier` after every persisted generation.
    pub fn with_notifier(mut self, notifier: Arc<dyn GenerationNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Index the orchestrator records into.
    pub fn index(&self) -> &Arc<GenerationIndex> {
        &self.index
    }

    /// Store the orchestrator writes to.
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Run the pipeline for an admitted request.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a blank or unusable country
    /// - `StoryGenerationFailed` / `VoiceoverGenerationFailed` when a fatal stage fails
    /// - `PersistenceFailed` when artifacts or the record cannot be saved
    ///
    /// On every error the permit is dropped, so no quota is consumed.
    #[instrument(skip_all, fields(account = %admission.account(), country = %country, generation_id))]
    pub async fn run(
        &self,
        admission: Admission,
        country: &str,
    ) -> Result<GenerationOutcome, PipelineError> {
        let country = validate_country(country)?;
        let (account, _tier, permit) = admission.into_parts();

        let created_at = Utc::now();
        let claim = self.claim_identity(country, created_at).await.map_err(|e| {
            error!(error = %e, "Failed to claim a generation identity");
            PipelineError::new(PipelineErrorKind::PersistenceFailed(e.to_string()))
        })?;
        let id = claim.id.clone();
        tracing::Span::current().record("generation_id", tracing::field::display(&id));
        info!("Generation started");

        let mut degraded = Vec::new();

        let story = match self.stages.produce_story(country).await {
            StageOutcome::Complete(story) => story,
            StageOutcome::Degraded { fallback, cause } => {
                warn!(error = %cause, "Story degraded");
                fallback
            }
            StageOutcome::Fatal(cause) => {
                error!(error = %cause, "Story generation failed");
                return Err(PipelineError::new(PipelineErrorKind::StoryGenerationFailed(
                    cause.to_string(),
                )));
            }
        };

        let voiceover = match self.stages.produce_voiceover(&story).await {
            StageOutcome::Complete(voiceover) => voiceover,
            StageOutcome::Degraded { fallback, .. } => {
                degraded.push("voiceover_audio".to_string());
                fallback
            }
            StageOutcome::Fatal(cause) => {
                error!(error = %cause, "Voiceover generation failed");
                return Err(PipelineError::new(
                    PipelineErrorKind::VoiceoverGenerationFailed(cause.to_string()),
                ));
            }
        };

        let scenes = match self.stages.produce_scenes(&story).await {
            StageOutcome::Complete(scenes) => scenes,
            StageOutcome::Degraded { fallback, .. } => {
                degraded.push("scenes".to_string());
                fallback
            }
            // Scenes never stop a run.
            StageOutcome::Fatal(cause) => {
                warn!(error = %cause, "Scene generation failed");
                degraded.push("scenes".to_string());
                SCENES_FAILED.to_string()
            }
        };

        let mut written = Written::default();
        let record = match self
            .persist(&id, &account, country, created_at, &story, &voiceover, &scenes, &mut written)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Failed to persist generation");
                self.discard(&id, &written).await;
                return Err(PipelineError::new(PipelineErrorKind::PersistenceFailed(
                    e.to_string(),
                )));
            }
        };
        drop(claim);

        let usage = permit.commit();
        info!(
            monthly = usage.monthly,
            degraded = degraded.len(),
            "Generation completed"
        );

        self.notify(GenerationEvent {
            account,
            country: country.to_string(),
            generation_id: id,
        });

        Ok(GenerationOutcome {
            content: GeneratedContent {
                story,
                audio_available: voiceover.audio.is_some(),
                voiceover: voiceover.script,
                scenes,
            },
            record,
            degraded,
            usage,
        })
    }

    /// Reserve an identity nothing in the store already uses.
    ///
    /// Directories left by another process or an earlier run of this one are
    /// skipped the same way as identities reserved in memory.
    async fn claim_identity(
        &self,
        country: &str,
        created_at: DateTime<Utc>,
    ) -> Result<IdentityClaim, StorageError> {
        let mut occupied = Vec::new();
        loop {
            let claim = IdentityClaim {
                index: Arc::clone(&self.index),
                id: self.index.reserve_identity(country, created_at),
            };
            if !self.store.exists(&claim.id).await? {
                return Ok(claim);
            }
            warn!(generation_id = %claim.id, "Identity already present in the store, skipping");
            occupied.push(claim);
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        id: &GenerationId,
        account: &AccountId,
        country: &str,
        created_at: DateTime<Utc>,
        story: &str,
        voiceover: &Voiceover,
        scenes: &str,
        written: &mut Written,
    ) -> Result<GenerationRecord, StorageError> {
        let story_ref = self.put(id, ArtifactKind::Story, story.as_bytes(), written).await?;
        let voiceover_ref = self
            .put(id, ArtifactKind::Voiceover, voiceover.script.as_bytes(), written)
            .await?;
        let audio_ref = match &voiceover.audio {
            Some(audio) => Some(self.put(id, ArtifactKind::Audio, audio, written).await?),
            None => None,
        };
        let scenes_ref = self.put(id, ArtifactKind::Scenes, scenes.as_bytes(), written).await?;

        let artifacts = ArtifactSet {
            story: story_ref,
            voiceover: voiceover_ref,
            audio: audio_ref,
            scenes: scenes_ref,
        };
        let record = GenerationRecord::new(id.clone(), account.clone(), country, created_at, artifacts);
        self.store
            .put_metadata(&GenerationMetadata::describe(&record))
            .await?;
        written.metadata = true;

        self.index.insert(record.clone())?;
        Ok(record)
    }

    async fn put(
        &self,
        id: &GenerationId,
        kind: ArtifactKind,
        content: &[u8],
        written: &mut Written,
    ) -> Result<ArtifactRef, StorageError> {
        let reference = self.store.put(id, kind, content).await?;
        written.artifacts.push(kind);
        Ok(reference)
    }

    /// Delete what this run stored. Anything it did not write stays.
    async fn discard(&self, id: &GenerationId, written: &Written) {
        if written.metadata
            && let Err(e) = self.store.delete_metadata(id).await
        {
            warn!(error = %e, "Failed to delete partial metadata");
        }
        for kind in written.artifacts.iter().rev() {
            if let Err(e) = self.store.delete(id, *kind).await {
                warn!(error = %e, kind = %kind, "Failed to delete partial artifact");
            }
        }
    }

    fn notify(&self, event: GenerationEvent) {
        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let event = event.clone();
            tokio::spawn(
                async move {
                    if let Err(e) = notifier.notify(&event).await {
                        warn!(error = %e, "Generation notification failed");
                    }
                }
                .in_current_span(),
            );
        }
    }
}
