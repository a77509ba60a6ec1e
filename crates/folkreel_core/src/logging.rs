//! Tracing subscriber bootstrap.

use folkreel_error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// `[logging]` section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Override the level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Toggle JSON output.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// `RUST_LOG` if set, otherwise the configured level.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| ConfigError::new(format!("Invalid log filter '{}': {}", self.level, e)))
    }

    /// Formatting layer matching the `json` flag.
    pub fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        if self.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .boxed()
        }
    }
}

/// Install the global subscriber: env filter plus a text or JSON fmt layer.
///
/// # Errors
///
/// Fails on an unparsable filter or when a global subscriber already exists.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = config.env_filter()?;
    tracing_subscriber::registry()
        .with(filter)
        .with(config.fmt_layer())
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;
    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
    Ok(())
}
