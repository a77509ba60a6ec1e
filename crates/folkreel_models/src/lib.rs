//! Generative service clients for folkreel.
//!
//! - [`ChatCompletionClient`] speaks the OpenAI-compatible chat-completions protocol
//!   (Groq by default) and implements [`TextGenerator`](folkreel_interface::TextGenerator).
//! - [`VoiceRssClient`] wraps the VoiceRSS text-to-speech API and implements
//!   [`SpeechSynthesizer`](folkreel_interface::SpeechSynthesizer).
//! - [`ThrottledTextGenerator`] caps outbound requests per minute for any generator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chat;
mod reasoning;
mod throttle;
mod voicerss;

pub use chat::{
    ChatChoice, ChatChoiceMessage, ChatCompletionClient, ChatMessage, ChatRequest, ChatResponse,
    TextGenerationConfig,
};
pub use reasoning::ReasoningFilter;
pub use throttle::{DEFAULT_SLOT_WAIT, ThrottledTextGenerator};
pub use voicerss::{SpeechConfig, VoiceRssClient};
