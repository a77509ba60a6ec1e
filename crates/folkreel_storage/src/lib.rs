//! Artifact storage for folkreel.
//!
//! - [`ArtifactStore`] persists the text and audio a generation produces, addressed
//!   by generation identity and [`ArtifactKind`](folkreel_core::ArtifactKind).
//! - [`FileSystemArtifactStore`] lays them out as
//!   `{root}/{generation_id}/{story.txt | voiceover.txt | voiceover_tts.mp3 | scenes.txt | metadata.json}`.
//! - [`GenerationIndex`] holds generation records, hands out unique identities and
//!   keeps the view and download counters.
//! - [`GenerationArchive`] serves history, views and downloads on top of both.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod filesystem;
mod history;
mod index;
mod store;

pub use archive::{
    CONTENT_NOT_AVAILABLE, Download, GenerationArchive, GenerationContent, GenerationView,
};
pub use filesystem::{FileSystemArtifactStore, METADATA_FILE};
pub use history::{DEFAULT_PER_PAGE, HistoryPage, HistoryQuery, MAX_PER_PAGE};
pub use index::{GenerationIndex, ViewCounters};
pub use store::{ArtifactStore, content_hash};
