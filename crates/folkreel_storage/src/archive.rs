//! Views and downloads of stored generations.

use crate::{ArtifactStore, GenerationIndex, HistoryPage, HistoryQuery};
use folkreel_core::{AccountId, ArtifactKind, GenerationId, GenerationMetadata, GenerationRecord};
use folkreel_error::{FolkreelResult, PipelineError, PipelineErrorKind, StorageError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Placeholder served for text that cannot be read back.
pub const CONTENT_NOT_AVAILABLE: &str = "Content not available";

/// Text content of a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContent {
    /// Story text
    pub story: String,
    /// Voiceover script
    pub voiceover: String,
    /// Scene breakdown
    pub scenes: String,
    /// Parsed `metadata.json`, absent when unreadable
    pub metadata: Option<GenerationMetadata>,
}

impl GenerationContent {
    fn unavailable() -> Self {
        Self {
            story: CONTENT_NOT_AVAILABLE.to_string(),
            voiceover: CONTENT_NOT_AVAILABLE.to_string(),
            scenes: CONTENT_NOT_AVAILABLE.to_string(),
            metadata: None,
        }
    }
}

/// A record together with its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationView {
    /// Record after the view was counted
    pub record: GenerationRecord,
    /// Stored text
    pub content: GenerationContent,
}

/// Bytes served for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested attachment name
    pub file_name: &'static str,
    /// MIME type
    pub content_type: &'static str,
    /// Artifact bytes
    pub bytes: Vec<u8>,
}

/// Read side of stored generations, scoped to the owning account.
#[derive(Clone)]
pub struct GenerationArchive {
    store: Arc<dyn ArtifactStore>,
    index: Arc<GenerationIndex>,
}

impl std::fmt::Debug for GenerationArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationArchive")
            .field("generations", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl GenerationArchive {
    /// Archive over a store and its index.
    pub fn new(store: Arc<dyn ArtifactStore>, index: Arc<GenerationIndex>) -> Self {
        Self { store, index }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Underlying index.
    pub fn index(&self) -> &Arc<GenerationIndex> {
        &self.index
    }

    /// One page of `account`'s history.
    pub fn history(&self, account: &AccountId, query: &HistoryQuery) -> HistoryPage {
        self.index.list(account, query)
    }

    fn owned(&self, account: &AccountId, id: &GenerationId) -> Result<GenerationRecord, PipelineError> {
        self.index.get_owned(account, id).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::GenerationNotFound(id.to_string()))
        })
    }

    /// Count a view and return the record with its content.
    ///
    /// If any piece of content cannot be read, every text field carries
    /// [`CONTENT_NOT_AVAILABLE`] and the metadata is absent.
    ///
    /// # Errors
    ///
    /// `GenerationNotFound` if the generation is missing or owned by someone else.
    #[tracing::instrument(skip(self), fields(account = %account, generation_id = %id))]
    pub async fn view(
        &self,
        account: &AccountId,
        id: &GenerationId,
    ) -> Result<GenerationView, PipelineError> {
        let mut record = self.owned(account, id)?;
        if let Some(views) = self.index.increment_view(id) {
            record.view_count = views;
        }

        let content = match self.read_content(&record).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "Stored content unreadable");
                GenerationContent::unavailable()
            }
        };

        Ok(GenerationView { record, content })
    }

    async fn read_text(&self, record: &GenerationRecord, kind: ArtifactKind) -> Result<String, StorageError> {
        let bytes = match record.artifacts.get(kind) {
            Some(reference) => self.store.retrieve(reference).await?,
            None => self.store.get(&record.id, kind).await?,
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn read_content(&self, record: &GenerationRecord) -> Result<GenerationContent, StorageError> {
        Ok(GenerationContent {
            story: self.read_text(record, ArtifactKind::Story).await?,
            voiceover: self.read_text(record, ArtifactKind::Voiceover).await?,
            scenes: self.read_text(record, ArtifactKind::Scenes).await?,
            metadata: Some(self.store.get_metadata(&record.id).await?),
        })
    }

    /// Serve one artifact and count the download.
    ///
    /// `kind` is the raw path segment. The counter only moves when bytes are
    /// actually served.
    ///
    /// # Errors
    ///
    /// - `GenerationNotFound` if missing or not owned
    /// - `InvalidArtifactKind` for anything but `story|voiceover|audio|scenes`
    /// - `ArtifactUnavailable` when the generation has no audio
    /// - storage errors if the bytes cannot be read
    #[tracing::instrument(skip(self), fields(account = %account, generation_id = %id))]
    pub async fn download(
        &self,
        account: &AccountId,
        id: &GenerationId,
        kind: &str,
    ) -> FolkreelResult<Download> {
        let record = self.owned(account, id)?;
        let kind = ArtifactKind::from_str(kind).map_err(|_| {
            PipelineError::new(PipelineErrorKind::InvalidArtifactKind(kind.to_string()))
        })?;
        let reference = record.artifacts.get(kind).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::ArtifactUnavailable(format!(
                "{} has no {}",
                id, kind
            )))
        })?;

        let bytes = self.store.retrieve(reference).await?;
        self.index.increment_download(id);
        tracing::info!(kind = %kind, size = bytes.len(), "Served download");

        Ok(Download {
            file_name: kind.file_name(),
            content_type: kind.content_type(),
            bytes,
        })
    }
}
