//! Filesystem artifact store.

use crate::{ArtifactStore, content_hash};
use folkreel_core::{ArtifactKind, ArtifactRef, GenerationId, GenerationMetadata};
use folkreel_error::{StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

/// Name of the per-generation metadata file.
pub const METADATA_FILE: &str = "metadata.json";

/// Filesystem storage backend.
///
/// # Layout
///
/// ```text
/// {root}/
/// └── japan_20240309070501/
///     ├── story.txt
///     ├── voiceover.txt
///     ├── voiceover_tts.mp3
///     ├── scenes.txt
///     └── metadata.json
/// ```
///
/// Writes go to a temp file and are renamed into place, so readers never see a
/// partial artifact.
#[derive(Debug, Clone)]
pub struct FileSystemArtifactStore {
    root: PathBuf,
}

impl FileSystemArtifactStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::info!(path = %root.display(), "Created artifact store");
        Ok(Self { root })
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one generation.
    ///
    /// Rejects identities that would leave the root.
    fn generation_dir(&self, id: &GenerationId) -> Result<PathBuf, StorageError> {
        let raw = id.as_str();
        let unsafe_id = raw.is_empty()
            || raw.starts_with('.')
            || raw.contains(['/', '\\'])
            || raw.chars().any(char::is_control);
        if unsafe_id {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                raw.to_string(),
            )));
        }
        Ok(self.root.join(raw))
    }

    fn artifact_path(&self, id: &GenerationId, kind: ArtifactKind) -> Result<PathBuf, StorageError> {
        Ok(self.generation_dir(id)?.join(kind.file_name()))
    }

    async fn write_once(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::Duplicate(
                path.display().to_string(),
            )));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })
    }

    async fn read(path: &Path) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })
    }

    /// Remove one file, then its generation directory if that left it empty.
    async fn delete_file(&self, path: &Path) -> Result<(), StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Deleted artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                    "remove {}: {}",
                    path.display(),
                    e
                ))));
            }
        }
        // Fails harmlessly while other files remain.
        if let Some(dir) = path.parent()
            && tokio::fs::remove_dir(dir).await.is_ok()
        {
            tracing::debug!(path = %dir.display(), "Removed empty generation directory");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    #[tracing::instrument(skip(self, content), fields(generation_id = %id, kind = %kind, size = content.len()))]
    async fn put(
        &self,
        id: &GenerationId,
        kind: ArtifactKind,
        content: &[u8],
    ) -> Result<ArtifactRef, StorageError> {
        let path = self.artifact_path(id, kind)?;
        self.write_once(&path, content).await?;

        let reference = ArtifactRef {
            kind,
            path,
            content_hash: content_hash(content),
            size_bytes: content.len() as u64,
        };
        tracing::debug!(
            path = %reference.path.display(),
            hash = %reference.content_hash,
            "Stored artifact"
        );
        Ok(reference)
    }

    #[tracing::instrument(skip(self), fields(generation_id = %id, kind = %kind))]
    async fn get(&self, id: &GenerationId, kind: ArtifactKind) -> Result<Vec<u8>, StorageError> {
        let path = self.artifact_path(id, kind)?;
        Self::read(&path).await
    }

    #[tracing::instrument(skip(self, reference), fields(path = %reference.path.display(), hash = %reference.content_hash))]
    async fn retrieve(&self, reference: &ArtifactRef) -> Result<Vec<u8>, StorageError> {
        let data = Self::read(&reference.path).await?;
        let actual = content_hash(&data);
        if actual != reference.content_hash {
            tracing::error!(actual = %actual, "Artifact content changed since it was stored");
            return Err(StorageError::new(StorageErrorKind::HashMismatch(format!(
                "{}: expected {}, got {}",
                reference.path.display(),
                reference.content_hash,
                actual
            ))));
        }
        Ok(data)
    }

    #[tracing::instrument(skip(self, metadata), fields(generation_id = %metadata.generation_id))]
    async fn put_metadata(&self, metadata: &GenerationMetadata) -> Result<PathBuf, StorageError> {
        let path = self.generation_dir(&metadata.generation_id)?.join(METADATA_FILE);
        let json = serde_json::to_vec_pretty(metadata).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(e.to_string()))
        })?;
        self.write_once(&path, &json).await?;
        tracing::info!(path = %path.display(), "Stored generation metadata");
        Ok(path)
    }

    #[tracing::instrument(skip(self), fields(generation_id = %id))]
    async fn get_metadata(&self, id: &GenerationId) -> Result<GenerationMetadata, StorageError> {
        let path = self.generation_dir(id)?.join(METADATA_FILE);
        let data = Self::read(&path).await?;
        serde_json::from_slice(&data).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_metadata(&self) -> Result<Vec<GenerationMetadata>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.root.display(),
                e
            )))
        })?;

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.root.display(),
                e
            )))
        })? {
            if !entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(GenerationId::from) else {
                continue;
            };
            match self.get_metadata(&name).await {
                Ok(metadata) => found.push(metadata),
                Err(e) if matches!(e.kind, StorageErrorKind::NotFound(_)) => {
                    tracing::debug!(generation_id = %name, "Skipping directory without metadata");
                }
                Err(e) => {
                    tracing::warn!(generation_id = %name, error = %e, "Skipping unreadable metadata");
                }
            }
        }

        found.sort_by(|a, b| a.generation_id.cmp(&b.generation_id));
        tracing::debug!(count = found.len(), "Listed generation metadata");
        Ok(found)
    }

    async fn exists(&self, id: &GenerationId) -> Result<bool, StorageError> {
        let dir = self.generation_dir(id)?;
        tokio::fs::try_exists(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })
    }

    #[tracing::instrument(skip(self), fields(generation_id = %id, kind = %kind))]
    async fn delete(&self, id: &GenerationId, kind: ArtifactKind) -> Result<(), StorageError> {
        let path = self.artifact_path(id, kind)?;
        self.delete_file(&path).await
    }

    #[tracing::instrument(skip(self), fields(generation_id = %id))]
    async fn delete_metadata(&self, id: &GenerationId) -> Result<(), StorageError> {
        let path = self.generation_dir(id)?.join(METADATA_FILE);
        self.delete_file(&path).await
    }
}
