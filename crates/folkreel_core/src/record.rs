//! Generation requests, records and events.

use crate::{AccountId, ArtifactRef, ArtifactSet, GenerationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request to run the pipeline once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Requesting account
    pub account: AccountId,
    /// Country the folk tale comes from
    pub country: String,
}

impl GenerationRequest {
    /// Create a request.
    pub fn new(account: AccountId, country: impl Into<String>) -> Self {
        Self {
            account,
            country: country.into(),
        }
    }
}

/// Durable record of a completed generation.
///
/// Only the view and download counters change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation identity
    pub id: GenerationId,
    /// Owning account
    pub account: AccountId,
    /// Country as requested (trimmed)
    pub country: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Stored artifacts
    pub artifacts: ArtifactSet,
    /// Times the generation was viewed
    pub view_count: u64,
    /// Times an artifact was downloaded
    pub download_count: u64,
}

impl GenerationRecord {
    /// Fresh record with zeroed counters.
    pub fn new(
        id: GenerationId,
        account: AccountId,
        country: impl Into<String>,
        created_at: DateTime<Utc>,
        artifacts: ArtifactSet,
    ) -> Self {
        Self {
            id,
            account,
            country: country.into(),
            created_at,
            artifacts,
            view_count: 0,
            download_count: 0,
        }
    }
}

/// Contents of `metadata.json`.
///
/// `account` and `artifacts` are enough to rebuild the [`GenerationRecord`] after a
/// restart. Files written before they existed still load, without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Country as requested
    pub country: String,
    /// Generation identity
    pub generation_id: GenerationId,
    /// Creation time, RFC 3339
    pub timestamp: String,
    /// Artifact paths by key
    pub files: BTreeMap<String, String>,
    /// Owning account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountId>,
    /// Stored references with their hashes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactRef>,
}

impl GenerationMetadata {
    /// Metadata for a record about to be written.
    pub fn describe(record: &GenerationRecord) -> Self {
        Self {
            country: record.country.clone(),
            generation_id: record.id.clone(),
            timestamp: record.created_at.to_rfc3339(),
            files: record.artifacts.file_map(),
            account: Some(record.account.clone()),
            artifacts: record.artifacts.iter().cloned().collect(),
        }
    }

    /// The record this metadata was written for, with fresh counters.
    ///
    /// `None` when the owner, the timestamp or a required artifact is missing.
    pub fn to_record(&self) -> Option<GenerationRecord> {
        let account = self.account.clone()?;
        let created_at = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()?
            .with_timezone(&Utc);
        let artifacts = ArtifactSet::from_refs(self.artifacts.iter().cloned())?;
        Some(GenerationRecord::new(
            self.generation_id.clone(),
            account,
            self.country.clone(),
            created_at,
            artifacts,
        ))
    }
}

/// Notification payload emitted after a generation is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationEvent {
    /// Owning account
    pub account: AccountId,
    /// Country as requested
    pub country: String,
    /// Generation identity
    pub generation_id: GenerationId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactKind;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn reference(kind: ArtifactKind) -> ArtifactRef {
        ArtifactRef {
            kind,
            path: PathBuf::from("outputs/japan_20240309070501").join(kind.file_name()),
            content_hash: "ab".repeat(32),
            size_bytes: 5,
        }
    }

    fn record() -> GenerationRecord {
        GenerationRecord::new(
            GenerationId::from("japan_20240309070501"),
            AccountId::from("ada"),
            "Japan",
            Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
            ArtifactSet {
                story: reference(ArtifactKind::Story),
                voiceover: reference(ArtifactKind::Voiceover),
                audio: None,
                scenes: reference(ArtifactKind::Scenes),
            },
        )
    }

    #[test]
    fn test_metadata_rebuilds_record() {
        let record = record();
        let metadata = GenerationMetadata::describe(&record);
        assert_eq!(metadata.files.len(), 3);
        assert_eq!(metadata.to_record(), Some(record));
    }

    #[test]
    fn test_metadata_without_owner_does_not_rebuild() {
        let mut metadata = GenerationMetadata::describe(&record());
        metadata.account = None;
        assert!(metadata.to_record().is_none());
    }

    #[test]
    fn test_metadata_missing_story_does_not_rebuild() {
        let mut metadata = GenerationMetadata::describe(&record());
        metadata.artifacts.retain(|r| r.kind != ArtifactKind::Story);
        assert!(metadata.to_record().is_none());
    }
}
