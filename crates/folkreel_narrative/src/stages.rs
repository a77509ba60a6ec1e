//! The three pipeline stages.

use crate::{PromptSet, RetryPolicy};
use folkreel_error::{FolkreelError, GenerationError, GenerationErrorKind};
use folkreel_interface::{SpeechSynthesizer, TextGenerator, VoiceParams};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Stored in place of the scene breakdown when that stage fails.
pub const SCENES_FAILED: &str = "Scene generation failed.";

/// Result of one stage.
#[derive(Debug)]
pub enum StageOutcome<T> {
    /// Stage produced its output.
    Complete(T),
    /// Stage failed but the run continues with a fallback.
    Degraded {
        /// Value used instead
        fallback: T,
        /// What went wrong
        cause: FolkreelError,
    },
    /// Stage failed and the run stops.
    Fatal(FolkreelError),
}

impl<T> StageOutcome<T> {
    /// Whether the stage fell back.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Whether the run must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Output of the voiceover stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voiceover {
    /// Script text
    pub script: String,
    /// Synthesized audio; absent when synthesis failed
    pub audio: Option<Vec<u8>>,
}

/// Stage functions bound to their clients.
#[derive(Clone)]
pub struct Stages {
    text: Arc<dyn TextGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    prompts: PromptSet,
    retry: RetryPolicy,
    voice: VoiceParams,
}

impl std::fmt::Debug for Stages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stages")
            .field("provider", &self.text.provider_name())
            .field("model", &self.text.model_name())
            .field("retry", &self.retry)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

impl Stages {
    /// Bind stages to a text generator and speech synthesizer.
    pub fn new(
        text: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            text,
            speech,
            prompts,
            retry: RetryPolicy::default(),
            voice: VoiceParams::default(),
        }
    }

    /// Retry policy for the story and script calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Voice options passed to synthesis.
    pub fn with_voice(mut self, voice: VoiceParams) -> Self {
        self.voice = voice;
        self
    }

    async fn complete(&self, stage: &'static str, prompt: String) -> Result<String, GenerationError> {
        let text = self
            .retry
            .run(stage, || self.text.complete(&prompt))
            .await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyResponse(
                format!("{} stage produced no text", stage),
            )));
        }
        Ok(text.to_string())
    }

    /// Folk story for a country. Any failure is fatal.
    #[instrument(skip(self), fields(stage = "story"))]
    pub async fn produce_story(&self, country: &str) -> StageOutcome<String> {
        match self.complete("story", self.prompts.story_prompt(country)).await {
            Ok(story) => {
                debug!(chars = story.len(), "Story generated");
                StageOutcome::Complete(story)
            }
            Err(e) => StageOutcome::Fatal(e.into()),
        }
    }

    /// Voiceover script and its audio.
    ///
    /// A script failure is fatal. An audio failure degrades to the script without
    /// audio.
    #[instrument(skip_all, fields(stage = "voiceover"))]
    pub async fn produce_voiceover(&self, story: &str) -> StageOutcome<Voiceover> {
        let script = match self.complete("voiceover", self.prompts.voiceover_prompt(story)).await {
            Ok(script) => script,
            Err(e) => return StageOutcome::Fatal(e.into()),
        };

        match self.speech.synthesize(&script, &self.voice).await {
            Ok(audio) => {
                debug!(bytes = audio.len(), "Voiceover audio synthesized");
                StageOutcome::Complete(Voiceover {
                    script,
                    audio: Some(audio),
                })
            }
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed, continuing without audio");
                StageOutcome::Degraded {
                    fallback: Voiceover {
                        script,
                        audio: None,
                    },
                    cause: e.into(),
                }
            }
        }
    }

    /// Scene breakdown. Failure degrades to [`SCENES_FAILED`].
    #[instrument(skip_all, fields(stage = "scenes"))]
    pub async fn produce_scenes(&self, story: &str) -> StageOutcome<String> {
        let prompt = self.prompts.scene_prompt(story);
        let attempt = async {
            let scenes = self.text.complete(&prompt).await?;
            let scenes = scenes.trim();
            if scenes.is_empty() {
                return Err(GenerationError::new(GenerationErrorKind::EmptyResponse(
                    "scenes stage produced no text".to_string(),
                )));
            }
            Ok(scenes.to_string())
        };

        match attempt.await {
            Ok(scenes) => StageOutcome::Complete(scenes),
            Err(e) => {
                warn!(error = %e, "Scene generation failed, using notice");
                StageOutcome::Degraded {
                    fallback: SCENES_FAILED.to_string(),
                    cause: e.into(),
                }
            }
        }
    }
}
