//! Speech-synthesis error types.

/// Failure modes of the speech-synthesis client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SynthesisErrorKind {
    /// Missing credential or invalid settings
    #[display("Speech synthesis is not configured: {}", _0)]
    Config(String),
    /// Network failure before a response arrived
    #[display("Speech synthesis request failed: {}", _0)]
    Transport(String),
    /// Service answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Request exceeded its deadline
    #[display("Speech synthesis timed out after {}s", _0)]
    Timeout(u64),
}

/// Speech-synthesis error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Synthesis Error: {} at line {} in {}", kind, line, file)]
pub struct SynthesisError {
    /// The kind of error that occurred
    pub kind: SynthesisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SynthesisError {
    /// Create a new synthesis error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynthesisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
