//! In-memory generation index.

use crate::{ArtifactStore, HistoryPage, HistoryQuery};
use chrono::{DateTime, Utc};
use folkreel_core::{AccountId, GenerationId, GenerationRecord};
use folkreel_error::{StorageError, StorageErrorKind};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// View and download counts of one generation, as saved between restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCounters {
    /// Times viewed
    pub views: u64,
    /// Times downloaded
    pub downloads: u64,
}

/// Generation records keyed by identity.
///
/// Identities are handed out by [`reserve_identity`](Self::reserve_identity) before
/// a run starts, so two pipelines for the same country in the same second never
/// share a directory. Each record sits behind its own mutex; counter updates
/// never block other records.
///
/// Lock order: `reserved` before `records`. `records` is never held while
/// taking `reserved`.
#[derive(Debug, Default)]
pub struct GenerationIndex {
    records: RwLock<HashMap<GenerationId, Arc<Mutex<GenerationRecord>>>>,
    reserved: Mutex<HashSet<GenerationId>>,
}

impl GenerationIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a fresh identity for `country` at `now`.
    ///
    /// The first claim gets the bare derived identity; later claims for the same
    /// second get `_2`, `_3`, ...
    #[tracing::instrument(skip(self))]
    pub fn reserve_identity(&self, country: &str, now: DateTime<Utc>) -> GenerationId {
        let base = GenerationId::derive(country, now);
        let mut reserved = self.reserved.lock();

        let mut candidate = base.clone();
        let mut suffix = 2;
        while reserved.contains(&candidate) || self.records.read().contains_key(&candidate) {
            candidate = base.with_suffix(suffix);
            suffix += 1;
        }

        reserved.insert(candidate.clone());
        tracing::debug!(generation_id = %candidate, "Reserved generation identity");
        candidate
    }

    /// Give back an identity whose run did not persist.
    pub fn release_identity(&self, id: &GenerationId) {
        if self.reserved.lock().remove(id) {
            tracing::debug!(generation_id = %id, "Released generation identity");
        }
    }

    /// Identities handed out to runs that have not yet recorded or released them.
    pub fn pending(&self) -> usize {
        self.reserved.lock().len()
    }

    /// Record a completed generation. Each identity is recorded once.
    ///
    /// # Errors
    ///
    /// `Duplicate` if the identity is already recorded.
    #[tracing::instrument(skip_all, fields(generation_id = %record.id, account = %record.account))]
    pub fn insert(&self, record: GenerationRecord) -> Result<(), StorageError> {
        let id = record.id.clone();
        {
            let mut records = self.records.write();
            if records.contains_key(&id) {
                return Err(StorageError::new(StorageErrorKind::Duplicate(
                    id.to_string(),
                )));
            }
            records.insert(id.clone(), Arc::new(Mutex::new(record)));
        }
        self.reserved.lock().remove(&id);
        tracing::info!("Indexed generation");
        Ok(())
    }

    fn row(&self, id: &GenerationId) -> Option<Arc<Mutex<GenerationRecord>>> {
        self.records.read().get(id).cloned()
    }

    /// Snapshot of a record.
    pub fn get(&self, id: &GenerationId) -> Option<GenerationRecord> {
        self.row(id).map(|row| row.lock().clone())
    }

    /// Snapshot of a record, only if `account` owns it.
    pub fn get_owned(&self, account: &AccountId, id: &GenerationId) -> Option<GenerationRecord> {
        self.get(id).filter(|record| &record.account == account)
    }

    /// Bump the view counter, returning the new value.
    pub fn increment_view(&self, id: &GenerationId) -> Option<u64> {
        let row = self.row(id)?;
        let mut record = row.lock();
        record.view_count += 1;
        Some(record.view_count)
    }

    /// Bump the download counter, returning the new value.
    pub fn increment_download(&self, id: &GenerationId) -> Option<u64> {
        let row = self.row(id)?;
        let mut record = row.lock();
        record.download_count += 1;
        Some(record.download_count)
    }

    fn owned_by(&self, account: &AccountId) -> Vec<GenerationRecord> {
        let rows: Vec<_> = self.records.read().values().cloned().collect();
        rows.iter()
            .map(|row| row.lock().clone())
            .filter(|record| &record.account == account)
            .collect()
    }

    /// One page of an account's history, newest first.
    #[tracing::instrument(skip(self, query), fields(account = %account))]
    pub fn list(&self, account: &AccountId, query: &HistoryQuery) -> HistoryPage {
        let mut matching: Vec<_> = self
            .owned_by(account)
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        HistoryPage::paginate(matching, query)
    }

    /// Records `account` created at or after `since`.
    pub fn count_since(&self, account: &AccountId, since: DateTime<Utc>) -> u64 {
        self.owned_by(account)
            .iter()
            .filter(|record| record.created_at >= since)
            .count() as u64
    }

    /// Load every generation the store holds complete metadata for.
    ///
    /// Identities already recorded are kept as they are. Metadata without an owner
    /// or artifact references is skipped. Returns the number of records added.
    #[tracing::instrument(skip_all)]
    pub async fn rebuild(&self, store: &dyn ArtifactStore) -> Result<usize, StorageError> {
        let mut added = 0;
        for metadata in store.list_metadata().await? {
            let Some(record) = metadata.to_record() else {
                tracing::warn!(
                    generation_id = %metadata.generation_id,
                    "Metadata cannot be indexed, skipping"
                );
                continue;
            };
            if self.insert(record).is_ok() {
                added += 1;
            }
        }
        tracing::info!(added, total = self.len(), "Rebuilt generation index");
        Ok(added)
    }

    /// Current counters of every record.
    pub fn counters(&self) -> BTreeMap<GenerationId, ViewCounters> {
        let rows: Vec<_> = self.records.read().values().cloned().collect();
        rows.iter()
            .map(|row| {
                let record = row.lock();
                (
                    record.id.clone(),
                    ViewCounters {
                        views: record.view_count,
                        downloads: record.download_count,
                    },
                )
            })
            .collect()
    }

    /// Put saved counters back. Unknown identities are ignored.
    ///
    /// Returns the number of records updated.
    pub fn restore_counters(&self, counters: &BTreeMap<GenerationId, ViewCounters>) -> usize {
        let mut restored = 0;
        for (id, saved) in counters {
            if let Some(row) = self.row(id) {
                let mut record = row.lock();
                record.view_count = saved.views;
                record.download_count = saved.downloads;
                restored += 1;
            }
        }
        restored
    }

    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
