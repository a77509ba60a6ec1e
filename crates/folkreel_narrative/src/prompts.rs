//! Prompt templates for the three text stages.

use folkreel_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUNDLED_PROMPTS: &str = include_str!("../prompts.toml");

/// Templates for the story, voiceover and scene prompts.
///
/// `{country}` is substituted into the story template and `{story}` into the
/// other two.
///
/// # Examples
///
/// ```
/// use folkreel_narrative::PromptSet;
///
/// let prompts = PromptSet::bundled()?;
/// assert!(prompts.story_prompt("Japan").contains("Japan"));
/// assert!(!prompts.story_prompt("Japan").contains("{country}"));
/// # Ok::<(), folkreel_error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    story: String,
    voiceover: String,
    scenes: String,
}

impl PromptSet {
    /// Build and validate a prompt set.
    ///
    /// # Errors
    ///
    /// Returns error if any template is blank.
    pub fn new(
        story: impl Into<String>,
        voiceover: impl Into<String>,
        scenes: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let prompts = Self {
            story: story.into(),
            voiceover: voiceover.into(),
            scenes: scenes.into(),
        };
        prompts.validate()?;
        Ok(prompts)
    }

    /// Prompts shipped with the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::parse(BUNDLED_PROMPTS)
    }

    /// Parse a TOML prompt file with `story`, `voiceover` and `scenes` keys.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let prompts: Self = toml::from_str(toml_str)
            .map_err(|e| ConfigError::new(format!("Failed to parse prompts: {}", e)))?;
        prompts.validate()?;
        Ok(prompts)
    }

    /// Load prompts from a file.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read prompts {}: {}", path.display(), e))
        })?;
        let prompts = Self::parse(&contents)?;
        tracing::info!("Loaded prompt overrides");
        Ok(prompts)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, template, placeholder) in [
            ("story", &self.story, "{country}"),
            ("voiceover", &self.voiceover, "{story}"),
            ("scenes", &self.scenes, "{story}"),
        ] {
            if template.trim().is_empty() {
                return Err(ConfigError::new(format!(
                    "Prompt template '{}' is empty",
                    name
                )));
            }
            if !template.contains(placeholder) {
                tracing::warn!(template = name, placeholder, "Prompt template has no placeholder");
            }
        }
        Ok(())
    }

    /// Story prompt for a country.
    pub fn story_prompt(&self, country: &str) -> String {
        self.story.replace("{country}", country)
    }

    /// Voiceover-for-TTS prompt for a story.
    pub fn voiceover_prompt(&self, story: &str) -> String {
        self.voiceover.replace("{story}", story)
    }

    /// Scene breakdown prompt for a story.
    pub fn scene_prompt(&self, story: &str) -> String {
        self.scenes.replace("{story}", story)
    }
}
