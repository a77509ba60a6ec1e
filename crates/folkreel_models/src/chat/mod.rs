//! OpenAI-compatible chat-completions client.

mod client;
mod config;
mod dto;

pub use client::ChatCompletionClient;
pub use config::TextGenerationConfig;
pub use dto::{ChatChoice, ChatChoiceMessage, ChatMessage, ChatRequest, ChatResponse};
