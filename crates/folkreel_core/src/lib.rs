//! Core data types for folkreel.
//!
//! Identities, subscription tiers, usage snapshots, generation records and the
//! tracing bootstrap shared by every crate in the workspace.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod identity;
mod logging;
mod record;
mod tier;
mod usage;

pub use artifact::{ArtifactKind, ArtifactRef, ArtifactSet};
pub use identity::{
    AccountId, CredentialId, GenerationId, MAX_COUNTRY_LEN, normalize_country, validate_country,
};
pub use logging::{LoggingConfig, init_tracing};
pub use record::{GenerationEvent, GenerationMetadata, GenerationRecord, GenerationRequest};
pub use tier::{Entitlement, SubscriptionStatus, SubscriptionTier, TierLimits};
pub use usage::{AccountUsage, CredentialUsage};
