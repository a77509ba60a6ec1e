//! Provider-wide request throttling.
//!
//! All accounts share one provider key, so outbound calls are paced with a GCRA
//! limiter from `governor` before they reach the provider.

use async_trait::async_trait;
use folkreel_error::{GenerationError, GenerationErrorKind};
use folkreel_interface::TextGenerator;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Longest a call waits for a slot unless told otherwise.
pub const DEFAULT_SLOT_WAIT: Duration = Duration::from_secs(60);

/// Wraps a [`TextGenerator`] and waits for an RPM slot before each call.
///
/// With no cap (or a cap of zero) calls pass straight through. A call that
/// cannot get a slot within the wait bound fails with `Timeout` without
/// reaching the provider.
#[derive(Clone)]
pub struct ThrottledTextGenerator<T> {
    inner: T,
    limiter: Option<Arc<DirectRateLimiter>>,
    max_wait: Duration,
}

impl<T: TextGenerator> ThrottledTextGenerator<T> {
    /// Throttle `inner` to `max_rpm` requests per minute.
    pub fn new(inner: T, max_rpm: Option<u32>) -> Self {
        let limiter = max_rpm
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        Self {
            inner,
            limiter,
            max_wait: DEFAULT_SLOT_WAIT,
        }
    }

    /// Give up on a slot after `max_wait`.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// The wrapped generator.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Whether a cap is in force.
    pub fn is_throttled(&self) -> bool {
        self.limiter.is_some()
    }
}

#[async_trait]
impl<T: TextGenerator> TextGenerator for ThrottledTextGenerator<T> {
    #[instrument(skip(self, prompt), fields(provider = %self.inner.provider_name()))]
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Some(limiter) = &self.limiter {
            if tokio::time::timeout(self.max_wait, limiter.until_ready())
                .await
                .is_err()
            {
                warn!(
                    max_wait_ms = self.max_wait.as_millis() as u64,
                    "No provider request slot in time"
                );
                return Err(GenerationError::new(GenerationErrorKind::Timeout(
                    self.max_wait.as_secs_f64().ceil() as u64,
                )));
            }
            debug!("Acquired provider request slot");
        }
        self.inner.complete(prompt).await
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
