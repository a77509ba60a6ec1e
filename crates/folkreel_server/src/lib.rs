//! HTTP surface for folkreel.
//!
//! - [`FolkreelConfig`] layers bundled defaults, user files and `FOLKREEL__*`
//!   environment variables.
//! - [`InMemoryDirectory`] holds accounts, entitlements and API keys.
//! - [`create_router`] exposes the generation service under `/api/v1`.
//! - [`spawn_reset_jobs`] clears daily and monthly counters at UTC boundaries.
//! - [`StateFile`] keeps ledger and view counters across restarts; generation
//!   records are rebuilt from their `metadata.json`.
//! - [`FolkreelApp`] wires all of it together and [`serve`] runs it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod app;
mod config;
mod directory;
mod jobs;
mod notify;
mod state;

pub use api::{API_KEY_HEADER, ApiError, ApiKey, ApiState, GenerateBody, create_router};
pub use app::{FolkreelApp, serve};
pub use config::{AccountSeed, FolkreelConfig, PromptsConfig, ServerConfig, StorageConfig};
pub use directory::{API_KEY_LEN, CredentialRecord, InMemoryDirectory};
pub use jobs::{ResetJobs, run_reset, spawn_checkpoint_job, spawn_reset_jobs};
pub use notify::{ChannelNotifier, TracingNotifier};
pub use state::{RestoreSummary, STATE_FILE, SavedState, StateFile};
