//! Removal of `<think>` reasoning blocks from completions.

use folkreel_error::{GenerationError, GenerationErrorKind};
use regex::Regex;

/// Strips every `<think>…</think>` block (multi-line, non-greedy) and trims.
///
/// ```
/// use folkreel_models::ReasoningFilter;
///
/// let filter = ReasoningFilter::new().unwrap();
/// let text = "<think>\nplan the tale\n</think>\n  Once upon a time. ";
/// assert_eq!(filter.strip(text), "Once upon a time.");
/// ```
#[derive(Debug, Clone)]
pub struct ReasoningFilter {
    pattern: Regex,
}

impl ReasoningFilter {
    /// Compile the filter.
    pub fn new() -> Result<Self, GenerationError> {
        let pattern = Regex::new(r"(?s)<think>.*?</think>").map_err(|e| {
            GenerationError::new(GenerationErrorKind::Config(format!(
                "Invalid reasoning pattern: {}",
                e
            )))
        })?;
        Ok(Self { pattern })
    }

    /// Remove reasoning blocks and surrounding whitespace.
    pub fn strip(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").trim().to_string()
    }
}
