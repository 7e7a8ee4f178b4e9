//! Opt-in retry decorator with exponential backoff and jitter.
//!
//! Feeds do not retry on their own. [`RetryingFeed`] re-issues a fetch only
//! for errors marked retryable and surfaces the last error unchanged, so the
//! caller still sees the same error kinds.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::feed::{FeedFuture, SentimentFeed};
use crate::FeedId;

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally +/- 50% jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(3),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt.min(i32::MAX as u32) as i32);
                let seconds = base.as_secs_f64() * scale;
                // A negative or NaN factor degrades to no delay.
                let capped_seconds = if seconds.is_nan() {
                    0.0
                } else {
                    seconds.clamp(0.0, max.as_secs_f64())
                };
                let delay = Duration::from_secs_f64(capped_seconds);

                if !jitter {
                    return delay;
                }

                let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                let total_ms =
                    delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                Duration::from_millis(total_ms.max(0) as u64)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Retry decorator preserving the [`SentimentFeed`] contract.
pub struct RetryingFeed {
    inner: Arc<dyn SentimentFeed>,
    config: RetryConfig,
}

impl RetryingFeed {
    pub fn new(inner: Arc<dyn SentimentFeed>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

impl SentimentFeed for RetryingFeed {
    fn id(&self) -> FeedId {
        self.inner.id()
    }

    fn cache_key(&self) -> String {
        self.inner.cache_key()
    }

    fn fetch<'a>(&'a self) -> FeedFuture<'a> {
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                match self.inner.fetch().await {
                    Ok(payload) => return Ok(payload),
                    Err(error) if error.retryable() && attempt < self.config.max_retries => {
                        let delay = self.config.delay_for_attempt(attempt);
                        debug!(
                            feed = %self.id(),
                            code = error.code(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying feed fetch"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Err(error) => return Err(error),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(7), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_doubles_until_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_half_the_delay() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..10 {
            for attempt in 0..5 {
                let expected = (100.0 * 2_f64.powi(attempt as i32)).min(1000.0);
                let delay_ms = backoff.delay(attempt).as_millis() as f64;
                assert!(delay_ms >= expected * 0.49, "attempt={attempt}, delay_ms={delay_ms}");
                assert!(delay_ms <= expected * 1.51, "attempt={attempt}, delay_ms={delay_ms}");
            }
        }
    }

    #[test]
    fn negative_or_nan_factor_yields_zero_delay() {
        for factor in [-2.0, f64::NAN] {
            let backoff = Backoff::Exponential {
                base: Duration::from_millis(100),
                factor,
                max: Duration::from_secs(1),
                jitter: true,
            };

            assert_eq!(backoff.delay(1), Duration::ZERO, "factor={factor}");
        }
    }

    #[test]
    fn fixed_config_reports_retry_budget() {
        let config = RetryConfig::fixed(Duration::from_millis(500), 2);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(500));
    }
}
