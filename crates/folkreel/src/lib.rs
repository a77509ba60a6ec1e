//! Folkreel: folk tales, voiceovers and scene breakdowns on a metered budget.
//!
//! A request names a country. The pipeline asks a text model for a folk tale from
//! that country, turns the tale into a narration script, synthesizes the script to
//! audio and breaks the tale into visual scenes. Every step lands in an artifact
//! store under one generation identity.
//!
//! Accounts are metered two ways:
//!
//! - **Monthly generations** per subscription tier, counted only when a generation
//!   is persisted.
//! - **Daily requests** per API key, counted when a call is admitted.
//!
//! # Architecture
//!
//! - `folkreel_error` - Error types
//! - `folkreel_core` - Identities, tiers, records, tracing bootstrap
//! - `folkreel_interface` - Client and account-collaborator traits
//! - `folkreel_models` - Chat-completions and VoiceRSS clients
//! - `folkreel_quota` - Quota ledger, admission gate, reset schedule
//! - `folkreel_storage` - Artifact store, generation index, history
//! - `folkreel_narrative` - Stage functions, orchestrator, generation service
//! - `folkreel_server` - Configuration, account directory, HTTP API
//!
//! This crate re-exports everything for convenience.
//!
//! # Cargo Features
//!
//! - `observability` - OpenTelemetry span export to stdout

pub use folkreel_core::*;
pub use folkreel_error::*;
pub use folkreel_interface::*;
pub use folkreel_models::{
    ChatCompletionClient, SpeechConfig, TextGenerationConfig, ThrottledTextGenerator,
    VoiceRssClient,
};
pub use folkreel_narrative::{
    GeneratedContent, GenerationOutcome, GenerationService, Orchestrator, PromptSet,
    RetryPolicy, SCENES_FAILED, StageOutcome, Stages, Voiceover,
};
pub use folkreel_quota::{
    Admission, AdmissionGate, GenerationPermit, LedgerSnapshot, QuotaConfig, QuotaLedger,
    ResetKind, ResetSchedule, UsageReport,
};
pub use folkreel_server::{
    AccountSeed, FolkreelApp, FolkreelConfig, InMemoryDirectory, StateFile, create_router,
    serve, spawn_reset_jobs,
};
pub use folkreel_storage::{
    ArtifactStore, FileSystemArtifactStore, GenerationArchive, GenerationIndex, HistoryPage,
    HistoryQuery, ViewCounters,
};

#[cfg(feature = "observability")]
pub mod telemetry;
