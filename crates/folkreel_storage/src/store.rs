//! Storage trait definition.

use async_trait::async_trait;
use folkreel_core::{ArtifactKind, ArtifactRef, GenerationId, GenerationMetadata};
use folkreel_error::StorageError;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Durable keyed storage for generation artifacts.
///
/// Each `(generation, kind)` is written once; reads are repeatable and free of
/// side effects.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store one artifact and return where it went.
    async fn put(
        &self,
        id: &GenerationId,
        kind: ArtifactKind,
        content: &[u8],
    ) -> Result<ArtifactRef, StorageError>;

    /// Read one artifact, or `NotFound`.
    async fn get(&self, id: &GenerationId, kind: ArtifactKind) -> Result<Vec<u8>, StorageError>;

    /// Read through a reference and check the recorded hash.
    async fn retrieve(&self, reference: &ArtifactRef) -> Result<Vec<u8>, StorageError>;

    /// Write `metadata.json` for a generation.
    async fn put_metadata(&self, metadata: &GenerationMetadata) -> Result<PathBuf, StorageError>;

    /// Read `metadata.json`, or `NotFound`.
    async fn get_metadata(&self, id: &GenerationId) -> Result<GenerationMetadata, StorageError>;

    /// Metadata of every generation whose `metadata.json` is in place.
    async fn list_metadata(&self) -> Result<Vec<GenerationMetadata>, StorageError>;

    /// Whether anything at all is stored under a generation identity.
    async fn exists(&self, id: &GenerationId) -> Result<bool, StorageError>;

    /// Delete one artifact. Missing artifacts are fine.
    async fn delete(&self, id: &GenerationId, kind: ArtifactKind) -> Result<(), StorageError>;

    /// Delete `metadata.json`. A missing file is fine.
    async fn delete_metadata(&self, id: &GenerationId) -> Result<(), StorageError>;
}
