//! Trait definitions for folkreel.
//!
//! The pipeline talks to generative services through [`TextGenerator`] and
//! [`SpeechSynthesizer`], and to the account system through [`EntitlementSource`],
//! [`CredentialSource`] and [`GenerationNotifier`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{
    CredentialSource, EntitlementSource, GenerationNotifier, SpeechSynthesizer, TextGenerator,
};
pub use types::{ResolvedCredential, VoiceParams};
