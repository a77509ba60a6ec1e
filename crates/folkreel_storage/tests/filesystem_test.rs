//! Tests for the filesystem artifact store.

use chrono::Utc;
use folkreel_core::{
    AccountId, ArtifactKind, ArtifactSet, GenerationId, GenerationMetadata, GenerationRecord,
};
use folkreel_error::StorageErrorKind;
use folkreel_storage::{ArtifactStore, FileSystemArtifactStore, METADATA_FILE, content_hash};
use tempfile::TempDir;

#[tokio::test]
async fn test_put_lays_out_generation_directory() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let id = GenerationId::from("japan_20240309070501");

    let reference = store.put(&id, ArtifactKind::Audio, b"ID3 fake mp3").await?;

    assert_eq!(
        reference.path,
        temp_dir.path().join("japan_20240309070501").join("voiceover_tts.mp3")
    );
    assert_eq!(reference.size_bytes, 12);
    assert_eq!(reference.content_hash, content_hash(b"ID3 fake mp3"));
    assert!(reference.path.exists());
    // No temp file left behind
    assert!(!reference.path.with_extension("tmp").exists());
    Ok(())
}

#[tokio::test]
async fn test_get_is_repeatable() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let id = GenerationId::from("peru_20240101000000");
    store
        .put(&id, ArtifactKind::Story, "Once, in the Andes...".as_bytes())
        .await?;

    let first = store.get(&id, ArtifactKind::Story).await?;
    let second = store.get(&id, ArtifactKind::Story).await?;

    assert_eq!(first, second);
    assert_eq!(first, "Once, in the Andes...".as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_get_missing_is_not_found() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;

    let err = store
        .get(&GenerationId::from("nowhere_20240101000000"), ArtifactKind::Scenes)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_artifacts_are_written_once() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let id = GenerationId::from("chile_20240101000000");

    store.put(&id, ArtifactKind::Scenes, b"Scene 1").await?;
    let err = store
        .put(&id, ArtifactKind::Scenes, b"Scene 1, again")
        .await
        .unwrap_err();

    assert!(matches!(err.kind, StorageErrorKind::Duplicate(_)));
    assert_eq!(store.get(&id, ArtifactKind::Scenes).await?, b"Scene 1");
    Ok(())
}

#[tokio::test]
async fn test_retrieve_detects_changed_content() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let id = GenerationId::from("ghana_20240101000000");

    let reference = store.put(&id, ArtifactKind::Voiceover, b"Narrator: ...").await?;
    assert_eq!(store.retrieve(&reference).await?, b"Narrator: ...");

    std::fs::write(&reference.path, b"tampered")?;
    let err = store.retrieve(&reference).await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::HashMismatch(_)));
    Ok(())
}

#[tokio::test]
async fn test_rejects_identities_outside_root() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;

    for raw in ["../escape", "..", "a/b", "a\\b", ""] {
        let err = store
            .put(&GenerationId::from(raw), ArtifactKind::Story, b"x")
            .await
            .unwrap_err();
        assert!(
            matches!(err.kind, StorageErrorKind::InvalidPath(_)),
            "{raw:?} should be rejected"
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_metadata_round_trip_and_listing() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let created_at = Utc::now();
    let id = GenerationId::derive("New Zealand", created_at);

    let artifacts = ArtifactSet {
        story: store.put(&id, ArtifactKind::Story, b"story").await?,
        voiceover: store.put(&id, ArtifactKind::Voiceover, b"script").await?,
        audio: None,
        scenes: store.put(&id, ArtifactKind::Scenes, b"scenes").await?,
    };
    let record = GenerationRecord::new(
        id.clone(),
        AccountId::from("ada"),
        "New Zealand",
        created_at,
        artifacts,
    );
    let metadata = GenerationMetadata::describe(&record);

    let path = store.put_metadata(&metadata).await?;
    assert!(path.ends_with(METADATA_FILE));

    let loaded = store.get_metadata(&id).await?;
    assert_eq!(loaded, metadata);
    assert!(loaded.files.contains_key("story"));
    assert!(!loaded.files.contains_key("voiceover_tts"));
    assert_eq!(loaded.to_record(), Some(record));
    assert_eq!(store.list_metadata().await?, vec![metadata]);
    Ok(())
}

#[tokio::test]
async fn test_delete_touches_only_named_files() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let id = GenerationId::from("chile_20240101000000");
    let story = store.put(&id, ArtifactKind::Story, b"story").await?;
    let scenes = store.put(&id, ArtifactKind::Scenes, b"scenes").await?;
    assert!(store.exists(&id).await?);

    store.delete(&id, ArtifactKind::Scenes).await?;
    assert!(!scenes.path.exists());
    assert!(story.path.exists());
    assert!(store.exists(&id).await?);
    // Deleting twice is fine
    store.delete(&id, ArtifactKind::Scenes).await?;
    store.delete_metadata(&id).await?;

    store.delete(&id, ArtifactKind::Story).await?;
    assert!(!temp_dir.path().join(id.as_str()).exists());
    assert!(!store.exists(&id).await?);
    Ok(())
}
