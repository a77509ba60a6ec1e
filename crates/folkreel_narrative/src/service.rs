//! Entry point tying admission, the pipeline and the archive together.

use crate::{GenerationOutcome, Orchestrator};
use chrono::Utc;
use folkreel_core::{AccountId, AccountUsage, CredentialId, GenerationId, validate_country};
use folkreel_error::FolkreelResult;
use folkreel_quota::{AdmissionGate, ResetSchedule, UsageReport};
use folkreel_storage::{Download, GenerationArchive, GenerationView, HistoryPage, HistoryQuery};
use tracing::instrument;

/// Account-scoped operations on generations.
#[derive(Debug, Clone)]
pub struct GenerationService {
    gate: AdmissionGate,
    orchestrator: Orchestrator,
    archive: GenerationArchive,
}

impl GenerationService {
    /// Service over a gate and an orchestrator. The archive reads the
    /// orchestrator's store and index.
    pub fn new(gate: AdmissionGate, orchestrator: Orchestrator) -> Self {
        let archive = GenerationArchive::new(
            orchestrator.store().clone(),
            orchestrator.index().clone(),
        );
        Self {
            gate,
            orchestrator,
            archive,
        }
    }

    /// Admission gate in front of the pipeline.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Read side of stored generations.
    pub fn archive(&self) -> &GenerationArchive {
        &self.archive
    }

    /// Admit and run one generation.
    ///
    /// The country is checked before admission so a blank request never
    /// consumes a credential call.
    #[instrument(skip_all, fields(account = %account, country = %country))]
    pub async fn generate(
        &self,
        account: &AccountId,
        credential: Option<&CredentialId>,
        country: &str,
    ) -> FolkreelResult<GenerationOutcome> {
        let country = validate_country(country)?;
        let admission = self.gate.admit(account, credential).await?;
        Ok(self.orchestrator.run(admission, country).await?)
    }

    /// One page of history.
    pub fn history(&self, account: &AccountId, query: &HistoryQuery) -> HistoryPage {
        self.archive.history(account, query)
    }

    /// View a generation, counting the view.
    pub async fn view(&self, account: &AccountId, id: &GenerationId) -> FolkreelResult<GenerationView> {
        Ok(self.archive.view(account, id).await?)
    }

    /// Download one artifact, counting the download.
    pub async fn download(
        &self,
        account: &AccountId,
        id: &GenerationId,
        kind: &str,
    ) -> FolkreelResult<Download> {
        self.archive.download(account, id, kind).await
    }

    /// Where the account stands against its allowance.
    #[instrument(skip(self), fields(account = %account))]
    pub async fn usage(&self, account: &AccountId) -> FolkreelResult<UsageReport> {
        let entitlement = self.gate.entitlement(account).await?;
        let ledger = self.gate.ledger();
        let usage = ledger
            .account_usage(account)
            .unwrap_or_else(|| AccountUsage::new(account.clone(), entitlement.tier));
        let month_generations = self
            .archive
            .index()
            .count_since(account, ResetSchedule::month_start(Utc::now()));

        Ok(UsageReport::build(
            &usage,
            &entitlement,
            ledger.limits_for(entitlement.tier),
            month_generations,
        ))
    }
}
