//! Error types for folkreel.
//!
//! Every crate in the workspace reports failures through the types defined here.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Each error converts into [`FolkreelError`] with `?`, and
//! [`FolkreelError::status_code`] maps it to the HTTP status the API answers with.
//!
//! # Examples
//!
//! ```
//! use folkreel_error::{FolkreelResult, PipelineError, PipelineErrorKind};
//!
//! fn validate(country: &str) -> FolkreelResult<()> {
//!     if country.trim().is_empty() {
//!         Err(PipelineError::new(PipelineErrorKind::InvalidRequest(
//!             "country must not be blank".to_string(),
//!         )))?
//!     }
//!     Ok(())
//! }
//!
//! let err = validate("   ").unwrap_err();
//! assert_eq!(err.status_code(), 400);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admission;
mod config;
mod error;
mod generation;
mod http;
mod ledger;
mod pipeline;
mod storage;
mod synthesis;

pub use admission::{AdmissionError, AdmissionErrorKind};
pub use config::ConfigError;
pub use error::{FolkreelError, FolkreelErrorKind, FolkreelResult};
pub use generation::{GenerationError, GenerationErrorKind, RetryableError};
pub use http::HttpError;
pub use ledger::{LedgerError, LedgerErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use synthesis::{SynthesisError, SynthesisErrorKind};
