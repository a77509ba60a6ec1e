//! VoiceRSS text-to-speech client.

mod client;
mod config;

pub use client::VoiceRssClient;
pub use config::SpeechConfig;
