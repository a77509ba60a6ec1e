//! Value types exchanged across the trait seams.

use folkreel_core::{AccountId, SubscriptionTier};
use serde::{Deserialize, Serialize};

/// Voice settings passed through to the speech service untouched.
///
/// ```
/// use folkreel_interface::VoiceParams;
///
/// let voice = VoiceParams::default();
/// assert_eq!(voice.language(), "en-us");
/// assert_eq!(voice.codec(), "MP3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VoiceParams {
    /// Language code
    #[serde(default = "default_language")]
    language: String,
    /// Audio codec
    #[serde(default = "default_codec")]
    codec: String,
    /// Sample format
    #[serde(default = "default_format")]
    format: String,
}

fn default_language() -> String {
    "en-us".to_string()
}

fn default_codec() -> String {
    "MP3".to_string()
}

fn default_format() -> String {
    "44khz_16bit_stereo".to_string()
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            language: default_language(),
            codec: default_codec(),
            format: default_format(),
        }
    }
}

impl VoiceParams {
    /// Custom voice settings.
    pub fn new(
        language: impl Into<String>,
        codec: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            codec: codec.into(),
            format: format.into(),
        }
    }
}

/// What a credential lookup returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCredential {
    /// Account the key belongs to
    pub account: AccountId,
    /// Whether the key may be used
    pub active: bool,
    /// Tier of the owning account
    pub tier: SubscriptionTier,
}
