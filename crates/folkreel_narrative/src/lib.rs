//! The folkreel generation pipeline.
//!
//! One generation turns a country name into four artifacts, each stage feeding the
//! next:
//!
//! 1. **story**: a folk tale from the country (fatal on failure)
//! 2. **voiceover**: a plain-text narration script (fatal on failure) and its
//!    synthesized audio (dropped on failure)
//! 3. **scenes**: a numbered image-prompt breakdown (replaced by a notice on failure)
//!
//! [`Stages`] binds the stage functions to their clients, [`Orchestrator`] sequences
//! them and persists the results, and [`GenerationService`] puts the admission gate
//! in front and the archive behind.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;
mod prompts;
mod retry;
mod service;
mod stages;

pub use orchestrator::{GeneratedContent, GenerationOutcome, Orchestrator};
pub use prompts::PromptSet;
pub use retry::RetryPolicy;
pub use service::GenerationService;
pub use stages::{SCENES_FAILED, StageOutcome, Stages, Voiceover};
