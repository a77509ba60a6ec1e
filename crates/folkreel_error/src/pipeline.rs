//! Generation pipeline error types.

/// Terminal outcomes of a generation run and of history lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Request failed validation
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
    /// Story stage could not produce text
    #[display("Story generation failed: {}", _0)]
    StoryGenerationFailed(String),
    /// Voiceover script stage could not produce text
    #[display("Voiceover generation failed: {}", _0)]
    VoiceoverGenerationFailed(String),
    /// Artifacts or record could not be saved
    #[display("Failed to persist generation: {}", _0)]
    PersistenceFailed(String),
    /// Generation missing or owned by another account
    #[display("Generation not found: {}", _0)]
    GenerationNotFound(String),
    /// Download kind outside story|voiceover|audio|scenes
    #[display("Invalid file type: {}", _0)]
    InvalidArtifactKind(String),
    /// Generation exists but has no audio
    #[display("Artifact not available: {}", _0)]
    ArtifactUnavailable(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
