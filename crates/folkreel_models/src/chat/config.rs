//! `[text]` configuration section.

use serde::{Deserialize, Serialize};

/// Settings for the text-generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TextGenerationConfig {
    /// Provider name used in logs
    #[serde(default = "default_provider")]
    provider: String,
    /// Chat-completions URL
    #[serde(default = "default_endpoint")]
    endpoint: String,
    /// Model identifier
    #[serde(default = "default_model")]
    model: String,
    /// System message sent with every prompt
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
    /// Request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    /// Outbound requests per minute across all accounts; unset means unthrottled
    #[serde(default)]
    max_rpm: Option<u32>,
    /// API key; falls back to `GROQ_API_KEY`
    #[serde(default, skip_serializing)]
    api_key: Option<String>,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-r1-distill-llama-70b".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
            max_rpm: None,
            api_key: None,
        }
    }
}

impl TextGenerationConfig {
    /// Point at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request deadline.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the outbound request cap.
    pub fn with_max_rpm(mut self, max_rpm: Option<u32>) -> Self {
        self.max_rpm = max_rpm;
        self
    }

    /// Set an explicit API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
