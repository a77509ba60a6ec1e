//! Caller-side retry for text stages.

use derive_getters::Getters;
use folkreel_error::{GenerationError, RetryableError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};

/// How often and how patiently a stage retries its text call.
///
/// `attempts` counts the first call, so the default of 1 never retries. Only
/// errors that report [`RetryableError::is_retryable`] are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Total attempts, including the first
    #[serde(default = "default_attempts")]
    attempts: u32,
    /// Backoff before the first retry (milliseconds)
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,
    /// Ceiling on any single backoff (seconds)
    #[serde(default = "default_max_delay_secs")]
    max_delay_secs: u64,
}

fn default_attempts() -> u32 {
    1
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    30
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one call.
    pub fn none() -> Self {
        Self::default()
    }

    /// Run `operation` under this policy.
    pub async fn run<T, F, Fut>(&self, stage: &'static str, mut operation: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        if self.attempts <= 1 {
            return operation().await;
        }

        let strategy = ExponentialBackoff::from_millis(self.initial_backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(self.max_delay_secs))
            .map(jitter)
            .take(self.attempts as usize - 1);

        Retry::spawn(strategy, || {
            let attempt = operation();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        tracing::warn!(stage, error = %e, "Text call failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(stage, error = %e, "Permanent text error, not retrying");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }
}
