//! `[speech]` configuration section.

use folkreel_interface::VoiceParams;
use serde::{Deserialize, Serialize};

/// Settings for the speech-synthesis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SpeechConfig {
    /// Service URL
    #[serde(default = "default_endpoint")]
    endpoint: String,
    /// Voice settings passed through unchanged
    #[serde(flatten)]
    voice: VoiceParams,
    /// Request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    /// API key; falls back to `VOICE_RSS_API_KEY`
    #[serde(default, skip_serializing)]
    api_key: Option<String>,
}

fn default_endpoint() -> String {
    "http://api.voicerss.org/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            voice: VoiceParams::default(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl SpeechConfig {
    /// Point at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use different voice settings.
    pub fn with_voice(mut self, voice: VoiceParams) -> Self {
        self.voice = voice;
        self
    }

    /// Set an explicit API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
