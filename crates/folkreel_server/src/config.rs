//! Layered configuration for the whole service.

use crate::STATE_FILE;
use config::{Config, Environment, File, FileFormat};
use folkreel_core::{LoggingConfig, SubscriptionStatus, SubscriptionTier};
use folkreel_error::{ConfigError, FolkreelResult};
use folkreel_models::{SpeechConfig, TextGenerationConfig};
use folkreel_narrative::{PromptSet, RetryPolicy};
use folkreel_quota::QuotaConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../folkreel.toml");

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for generation artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Where ledger and counter state is saved; `{output_dir}/state.json` if unset
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Seconds between periodic state saves while serving
    #[serde(default = "default_checkpoint_secs")]
    pub checkpoint_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_checkpoint_secs() -> u64 {
    60
}

impl StorageConfig {
    /// Resolved state file path.
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join(STATE_FILE))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            state_file: None,
            checkpoint_secs: default_checkpoint_secs(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// `[prompts]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// TOML file replacing the bundled prompts
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl PromptsConfig {
    /// Prompts from the override file, or the bundled set.
    pub fn load(&self) -> Result<PromptSet, ConfigError> {
        match &self.file {
            Some(path) => PromptSet::from_file(path),
            None => PromptSet::bundled(),
        }
    }
}

/// One `[[accounts]]` entry seeding the in-memory directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSeed {
    /// Account name
    pub name: String,
    /// Subscription tier
    #[serde(default)]
    pub tier: SubscriptionTier,
    /// Subscription status
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// API keys issued to the account
    #[serde(default)]
    pub keys: Vec<String>,
}

/// Complete service configuration.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolkreelConfig {
    /// Text-generation provider
    #[serde(default)]
    pub text: TextGenerationConfig,
    /// Speech-synthesis service
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Tier allowances
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Artifact storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Retry policy for the story and script stages
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Prompt overrides
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Seed accounts
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

impl FolkreelConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> FolkreelResult<Self> {
        debug!("Loading configuration from file");

        Ok(Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> FolkreelResult<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(toml_str, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?)
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled.
    ///
    /// Sources, later overriding earlier:
    /// 1. Bundled defaults (`folkreel.toml` shipped with the crate)
    /// 2. `~/.config/folkreel/folkreel.toml`
    /// 3. `./folkreel.toml`
    /// 4. `FOLKREEL__SECTION__KEY` environment variables
    ///
    /// User config files are optional and skipped if missing.
    ///
    /// ```no_run
    /// use folkreel_server::FolkreelConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = FolkreelConfig::load()?;
    /// println!("listening on {}", config.server.bind);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> FolkreelResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/folkreel/folkreel.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("folkreel").required(false))
            .add_source(
                Environment::with_prefix("FOLKREEL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?)
    }
}
