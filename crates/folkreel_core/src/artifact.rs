//! Artifact kinds and references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The four objects a generation produces.
///
/// Parses from the download path segment (`story`, `voiceover`, `audio`, `scenes`).
///
/// ```
/// use folkreel_core::ArtifactKind;
/// use std::str::FromStr;
///
/// let kind = ArtifactKind::from_str("audio").unwrap();
/// assert_eq!(kind.file_name(), "voiceover_tts.mp3");
/// assert!(ArtifactKind::from_str("zip").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactKind {
    /// Folk tale text
    Story,
    /// Voiceover script
    Voiceover,
    /// Synthesized voiceover audio
    Audio,
    /// Scene prompt breakdown
    Scenes,
}

impl ArtifactKind {
    /// File name inside the generation directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Story => "story.txt",
            Self::Voiceover => "voiceover.txt",
            Self::Audio => "voiceover_tts.mp3",
            Self::Scenes => "scenes.txt",
        }
    }

    /// Key used in the `files` map of `metadata.json`.
    pub fn metadata_key(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Voiceover => "voiceover",
            Self::Audio => "voiceover_tts",
            Self::Scenes => "scenes",
        }
    }

    /// MIME type served on download.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Audio => "audio/mpeg",
            _ => "text/plain; charset=utf-8",
        }
    }

    /// Whether the artifact is UTF-8 text.
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Audio)
    }
}

/// Where an artifact was stored and what it hashed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Location in the store
    pub path: PathBuf,
    /// SHA-256 of the content, hex encoded
    pub content_hash: String,
    /// Content length in bytes
    pub size_bytes: u64,
}

/// References for one generation. Audio is absent when synthesis degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSet {
    /// Story text
    pub story: ArtifactRef,
    /// Voiceover script
    pub voiceover: ArtifactRef,
    /// Voiceover audio, if synthesis succeeded
    pub audio: Option<ArtifactRef>,
    /// Scene breakdown (possibly the failure notice)
    pub scenes: ArtifactRef,
}

impl ArtifactSet {
    /// Assemble a set from loose references. The last reference of a kind wins.
    ///
    /// `None` unless story, voiceover and scenes are all present.
    pub fn from_refs(refs: impl IntoIterator<Item = ArtifactRef>) -> Option<Self> {
        let (mut story, mut voiceover, mut audio, mut scenes) = (None, None, None, None);
        for reference in refs {
            match reference.kind {
                ArtifactKind::Story => story = Some(reference),
                ArtifactKind::Voiceover => voiceover = Some(reference),
                ArtifactKind::Audio => audio = Some(reference),
                ArtifactKind::Scenes => scenes = Some(reference),
            }
        }
        Some(Self {
            story: story?,
            voiceover: voiceover?,
            audio,
            scenes: scenes?,
        })
    }

    /// Reference for a kind, if present.
    pub fn get(&self, kind: ArtifactKind) -> Option<&ArtifactRef> {
        match kind {
            ArtifactKind::Story => Some(&self.story),
            ArtifactKind::Voiceover => Some(&self.voiceover),
            ArtifactKind::Audio => self.audio.as_ref(),
            ArtifactKind::Scenes => Some(&self.scenes),
        }
    }

    /// Present references in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &ArtifactRef> {
        [
            Some(&self.story),
            Some(&self.voiceover),
            self.audio.as_ref(),
            Some(&self.scenes),
        ]
        .into_iter()
        .flatten()
    }

    /// Paths keyed the way `metadata.json` lists them.
    pub fn file_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|r| {
                (
                    r.kind.metadata_key().to_string(),
                    r.path.display().to_string(),
                )
            })
            .collect()
    }
}
