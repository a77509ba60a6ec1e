//! Trait definitions for generative clients and account collaborators.

use crate::{ResolvedCredential, VoiceParams};
use async_trait::async_trait;
use folkreel_core::{AccountId, CredentialId, Entitlement, GenerationEvent};
use folkreel_error::{AdmissionError, FolkreelResult, GenerationError, SynthesisError};
use std::sync::Arc;

/// Prompt in, completion text out.
///
/// Implementations strip reasoning markup and trim the result. They never retry;
/// retry policy belongs to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Provider name (e.g., "groq").
    fn provider_name(&self) -> &str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).complete(prompt).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Script in, audio bytes out.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech. Only transport status is checked, not the payload.
    async fn synthesize(&self, text: &str, voice: &VoiceParams)
    -> Result<Vec<u8>, SynthesisError>;
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<Vec<u8>, SynthesisError> {
        (**self).synthesize(text, voice).await
    }
}

/// Billing-side view of an account.
#[async_trait]
pub trait EntitlementSource: Send + Sync {
    /// Tier and status for the account, or `UnknownAccount`.
    async fn get_entitlement(&self, account: &AccountId) -> Result<Entitlement, AdmissionError>;
}

/// API key registry.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Owner, activity and tier for a key, or `UnknownCredential`.
    async fn resolve_credential(
        &self,
        key: &CredentialId,
    ) -> Result<ResolvedCredential, AdmissionError>;
}

/// Receives an event after each persisted generation.
///
/// Called fire-and-forget; a failure is logged and never undoes the generation.
#[async_trait]
pub trait GenerationNotifier: Send + Sync {
    /// Deliver the event.
    async fn notify(&self, event: &GenerationEvent) -> FolkreelResult<()>;
}
