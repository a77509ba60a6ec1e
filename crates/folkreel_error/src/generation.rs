//! Text-generation error types and retry classification.

/// Failure modes of the text-generation client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Missing or unusable credential or endpoint settings
    #[display("Text generation is not configured: {}", _0)]
    Config(String),
    /// Network failure before a response arrived
    #[display("Text generation request failed: {}", _0)]
    Transport(String),
    /// Provider answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Request exceeded its deadline
    #[display("Text generation timed out after {}s", _0)]
    Timeout(u64),
    /// Completion payload was empty or malformed
    #[display("Empty completion: {}", _0)]
    EmptyResponse(String),
    /// The prompt itself cannot be sent
    #[display("Invalid prompt: {}", _0)]
    InvalidPrompt(String),
}

impl GenerationErrorKind {
    /// Returns true for failures a second attempt may cure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            Self::Config(_) | Self::EmptyResponse(_) | Self::InvalidPrompt(_) => false,
        }
    }

    /// Retry parameters `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            // Provider-side throttling: back off harder, try less often.
            Self::HttpStatus {
                status_code: 429, ..
            } => (5000, 3, 60),
            Self::HttpStatus {
                status_code: 503, ..
            } => (2000, 5, 60),
            Self::HttpStatus {
                status_code: 500 | 502 | 504,
                ..
            } => (1000, 3, 30),
            _ => (1000, 3, 30),
        }
    }
}

/// Text-generation error with location tracking.
///
/// # Examples
///
/// ```
/// use folkreel_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::HttpStatus {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = GenerationError::new(GenerationErrorKind::EmptyResponse("no choices".into()));
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new generation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Errors that know whether a retry is worthwhile.
///
/// The pipeline's retry policy consults this before scheduling another attempt.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503, 429, or network timeouts return true. Permanent
    /// errors like 401, 400, or an empty completion return false.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
