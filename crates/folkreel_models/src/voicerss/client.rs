//! VoiceRSS client.

use super::SpeechConfig;
use async_trait::async_trait;
use folkreel_error::{SynthesisError, SynthesisErrorKind};
use folkreel_interface::{SpeechSynthesizer, VoiceParams};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Speech synthesizer backed by the VoiceRSS HTTP API.
///
/// VoiceRSS reports some failures as a success status with an `ERROR:` text body;
/// the payload is returned as-is without inspection.
#[derive(Debug, Clone)]
pub struct VoiceRssClient {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
}

impl VoiceRssClient {
    /// Build from configuration.
    ///
    /// Uses the configured key, else `VOICE_RSS_API_KEY`.
    ///
    /// # Errors
    ///
    /// `Config` if no key is available or the HTTP client cannot be built.
    #[instrument(skip_all, fields(endpoint = %config.endpoint()))]
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SynthesisError> {
        let api_key = match config.api_key() {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var("VOICE_RSS_API_KEY").map_err(|e| {
                SynthesisError::new(SynthesisErrorKind::Config(format!(
                    "VOICE_RSS_API_KEY not set: {}",
                    e
                )))
            })?,
        };
        Self::with_api_key(api_key, config)
    }

    /// Build with an explicit key.
    ///
    /// # Errors
    ///
    /// `Config` if the key is empty or the HTTP client cannot be built.
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &SpeechConfig,
    ) -> Result<Self, SynthesisError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::Config(
                "API key is empty".to_string(),
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| {
                SynthesisError::new(SynthesisErrorKind::Config(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint().clone(),
            timeout_secs: *config.timeout_secs(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for VoiceRssClient {
    #[instrument(skip(self, text, voice), fields(text_len = text.len(), language = %voice.language()))]
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<Vec<u8>, SynthesisError> {
        let params = [
            ("key", self.api_key.as_str()),
            ("src", text),
            ("hl", voice.language().as_str()),
            ("c", voice.codec().as_str()),
            ("f", voice.format().as_str()),
        ];

        debug!(endpoint = %self.endpoint, "Sending speech synthesis request");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::new(SynthesisErrorKind::Timeout(self.timeout_secs))
                } else {
                    SynthesisError::new(SynthesisErrorKind::Transport(format!(
                        "Request failed: {}",
                        e
                    )))
                }
            })?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status_code, "Speech synthesis returned non-success status");
            return Err(SynthesisError::new(SynthesisErrorKind::HttpStatus {
                status_code,
                message,
            }));
        }

        let bytes = response.bytes().await.map_err(|e| {
            SynthesisError::new(SynthesisErrorKind::Transport(format!(
                "Failed to read audio body: {}",
                e
            )))
        })?;

        debug!(audio_bytes = bytes.len(), "Speech synthesis complete");
        Ok(bytes.to_vec())
    }
}
