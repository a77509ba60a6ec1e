//! Ledger and counter state saved between restarts.

use async_trait::async_trait;
use chrono::Utc;
use folkreel_core::{GenerationEvent, GenerationId};
use folkreel_error::{FolkreelResult, StorageError, StorageErrorKind};
use folkreel_interface::GenerationNotifier;
use folkreel_quota::{LedgerSnapshot, QuotaLedger};
use folkreel_storage::{ArtifactStore, GenerationIndex, ViewCounters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Default state file name inside the output directory.
pub const STATE_FILE: &str = "state.json";

/// Contents of the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedState {
    /// Usage counters
    pub ledger: LedgerSnapshot,
    /// View and download counters by generation
    #[serde(default)]
    pub counters: BTreeMap<GenerationId, ViewCounters>,
}

/// What [`StateFile::restore`] brought back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Generations indexed from their metadata
    pub generations: usize,
    /// Account rows restored
    pub accounts: usize,
}

/// Saves the ledger and the index counters to one JSON file.
///
/// Generation records themselves are rebuilt from each generation's
/// `metadata.json`; only what changes after creation lives here. Saves are
/// serialized, so a slower save never overwrites a newer one.
#[derive(Debug)]
pub struct StateFile {
    path: PathBuf,
    ledger: Arc<QuotaLedger>,
    index: Arc<GenerationIndex>,
    saving: Mutex<()>,
}

impl StateFile {
    /// State of `ledger` and `index`, kept at `path`.
    pub fn new(path: impl Into<PathBuf>, ledger: Arc<QuotaLedger>, index: Arc<GenerationIndex>) -> Self {
        Self {
            path: path.into(),
            ledger,
            index,
            saving: Mutex::new(()),
        }
    }

    /// Where the state is kept.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the index from `store`, then load saved counters if there are any.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be listed or the state file exists but cannot
    /// be read or parsed.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn restore(&self, store: &dyn ArtifactStore) -> Result<RestoreSummary, StorageError> {
        let generations = self.index.rebuild(store).await?;

        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No saved state, starting fresh");
                return Ok(RestoreSummary {
                    generations,
                    accounts: 0,
                });
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                ))));
            }
        };
        let saved: SavedState = serde_json::from_slice(&data).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        let accounts = self.ledger.restore(saved.ledger, Utc::now());
        let counters = self.index.restore_counters(&saved.counters);
        info!(generations, accounts, counters, "State restored");
        Ok(RestoreSummary {
            generations,
            accounts,
        })
    }

    /// Write the current state, replacing the previous file in one rename.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self) -> Result<(), StorageError> {
        let _saving = self.saving.lock().await;
        let state = SavedState {
            ledger: self.ledger.snapshot(),
            counters: self.index.counters(),
        };
        let json = serde_json::to_vec_pretty(&state)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )))
        })?;
        tracing::debug!(
            accounts = state.ledger.accounts.len(),
            generations = state.counters.len(),
            "State saved"
        );
        Ok(())
    }
}

/// Saves state after every generation, so a crash never forgets a counted one.
#[async_trait]
impl GenerationNotifier for StateFile {
    async fn notify(&self, _event: &GenerationEvent) -> FolkreelResult<()> {
        Ok(self.save().await?)
    }
}
