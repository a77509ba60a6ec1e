//! Top-level error wrapper types.

use crate::{
    AdmissionError, AdmissionErrorKind, ConfigError, GenerationError, GenerationErrorKind,
    HttpError, LedgerError, PipelineError, PipelineErrorKind, StorageError, StorageErrorKind,
    SynthesisError,
};

/// Every error the workspace can surface.
///
/// # Examples
///
/// ```
/// use folkreel_error::{FolkreelError, HttpError};
///
/// let err: FolkreelError = HttpError::new("address in use").into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FolkreelErrorKind {
    /// HTTP surface error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Text-generation client error
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Speech-synthesis client error
    #[from(SynthesisError)]
    Synthesis(SynthesisError),
    /// Artifact store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Admission gate rejection
    #[from(AdmissionError)]
    Admission(AdmissionError),
    /// Quota ledger error
    #[from(LedgerError)]
    Ledger(LedgerError),
    /// Generation pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Folkreel error with kind discrimination.
///
/// # Examples
///
/// ```
/// use folkreel_error::{AdmissionError, AdmissionErrorKind, FolkreelResult};
///
/// fn admit() -> FolkreelResult<()> {
///     Err(AdmissionError::new(AdmissionErrorKind::RateLimited(
///         "daily limit of 10 requests reached".to_string(),
///     )))?
/// }
///
/// assert_eq!(admit().unwrap_err().status_code(), 429);
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Folkreel Error: {}", _0)]
pub struct FolkreelError(Box<FolkreelErrorKind>);

impl FolkreelError {
    /// Create a new error from a kind.
    pub fn new(kind: FolkreelErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FolkreelErrorKind {
        &self.0
    }

    /// HTTP status code the API answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            FolkreelErrorKind::Admission(e) => match &e.kind {
                AdmissionErrorKind::EntitlementInactive(_)
                | AdmissionErrorKind::QuotaExceeded { .. } => 403,
                AdmissionErrorKind::RateLimited(_) => 429,
                AdmissionErrorKind::MissingCredential
                | AdmissionErrorKind::UnknownCredential
                | AdmissionErrorKind::UnknownAccount(_) => 401,
            },
            FolkreelErrorKind::Pipeline(e) => match &e.kind {
                PipelineErrorKind::InvalidRequest(_)
                | PipelineErrorKind::InvalidArtifactKind(_) => 400,
                PipelineErrorKind::GenerationNotFound(_)
                | PipelineErrorKind::ArtifactUnavailable(_) => 404,
                PipelineErrorKind::StoryGenerationFailed(_)
                | PipelineErrorKind::VoiceoverGenerationFailed(_)
                | PipelineErrorKind::PersistenceFailed(_) => 500,
            },
            FolkreelErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_)) => {
                404
            }
            FolkreelErrorKind::Ledger(_) => 401,
            FolkreelErrorKind::Generation(e)
                if matches!(e.kind, GenerationErrorKind::InvalidPrompt(_)) =>
            {
                400
            }
            FolkreelErrorKind::Generation(_) | FolkreelErrorKind::Synthesis(_) => 502,
            _ => 500,
        }
    }
}

// Generic From implementation for any type that converts to FolkreelErrorKind
impl<T> From<T> for FolkreelError
where
    T: Into<FolkreelErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for folkreel operations.
pub type FolkreelResult<T> = std::result::Result<T, FolkreelError>;
