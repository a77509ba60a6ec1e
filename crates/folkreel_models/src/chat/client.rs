//! Chat-completions client.

use super::{ChatMessage, ChatRequest, ChatResponse, TextGenerationConfig};
use crate::ReasoningFilter;
use async_trait::async_trait;
use folkreel_error::{GenerationError, GenerationErrorKind};
use folkreel_interface::TextGenerator;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Text generator over an OpenAI-compatible chat-completions endpoint.
///
/// Each call sends the configured system message and the prompt as a user message,
/// strips reasoning blocks from the first choice and trims the result.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    provider: String,
    system_prompt: String,
    timeout_secs: u64,
    filter: ReasoningFilter,
}

impl ChatCompletionClient {
    /// Build from configuration.
    ///
    /// Uses the configured key, else `GROQ_API_KEY`.
    ///
    /// # Errors
    ///
    /// `Config` if no key is available or the HTTP client cannot be built.
    #[instrument(skip_all, fields(provider = %config.provider(), model = %config.model()))]
    pub fn from_config(config: &TextGenerationConfig) -> Result<Self, GenerationError> {
        let api_key = match config.api_key() {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var("GROQ_API_KEY").map_err(|e| {
                GenerationError::new(GenerationErrorKind::Config(format!(
                    "GROQ_API_KEY not set: {}",
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
    #[instrument(skip(api_key, config), fields(model = %config.model()))]
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &TextGenerationConfig,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::Config(
                "API key is empty".to_string(),
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Config(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint().clone(),
            model: config.model().clone(),
            provider: config.provider().clone(),
            system_prompt: config.system_prompt().clone(),
            timeout_secs: *config.timeout_secs(),
            filter: ReasoningFilter::new()?,
        })
    }

    fn request_for(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(&self.system_prompt),
                ChatMessage::user(prompt),
            ],
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::new(GenerationErrorKind::Timeout(self.timeout_secs))
        } else {
            GenerationError::new(GenerationErrorKind::Transport(format!(
                "Request failed: {}",
                e
            )))
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    #[instrument(skip(self, prompt), fields(provider = %self.provider, model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::InvalidPrompt(
                "Prompt must not be empty".to_string(),
            )));
        }

        debug!(endpoint = %self.endpoint, "Sending chat completion request");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_for(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status_code, "Chat completion returned non-success status");
            return Err(GenerationError::new(GenerationErrorKind::HttpStatus {
                status_code,
                message,
            }));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::new(GenerationErrorKind::EmptyResponse(format!(
                "Malformed completion payload: {}",
                e
            )))
        })?;

        let raw = parsed.first_text().ok_or_else(|| {
            GenerationError::new(GenerationErrorKind::EmptyResponse(
                "Completion has no content".to_string(),
            ))
        })?;

        let text = self.filter.strip(raw);
        if text.is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyResponse(
                "Completion is empty after removing reasoning".to_string(),
            )));
        }

        debug!(completion_len = text.len(), "Chat completion received");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
