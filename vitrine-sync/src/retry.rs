//! Bounded retry with exponential backoff and per-attempt timeouts.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ApiError;
use crate::error::{SyncError, SyncResult};

/// Configuration for retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between attempts in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
    /// Time allowed for one attempt, in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            multiplier: 2.0,
            attempt_timeout_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            attempt_timeout_ms: 30_000,
        }
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let ms = timeout.as_millis() as u64;
        self.attempt_timeout_ms = ms;
        self
    }

    /// Time allowed for one attempt.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Delay after the given failed attempt (0-indexed).
    ///
    /// `initial * multiplier^attempt`, capped at `max_delay_ms`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped_delay as u64)
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// Each attempt is bounded by the configured timeout; a timed-out attempt
/// counts as a retryable failure. Non-retryable [`ApiError`]s return
/// [`SyncError::Api`] immediately.
///
/// # Errors
///
/// Returns [`SyncError::Api`] for a permanent failure, or
/// [`SyncError::ExhaustedRetries`] wrapping the last failure.
pub async fn run_with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut attempt_fn: F,
) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = config.max_attempts.max(1);
    let timeout = config.attempt_timeout();
    let mut last = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = config.delay_for_attempt(attempt - 1);
            tracing::debug!(operation, attempt, delay_ms = %delay.as_millis(), "Backing off before retry");
            tokio::time::sleep(delay).await;
        }

        let failure = match tokio::time::timeout(timeout, attempt_fn()).await {
            Ok(Ok(value)) => {
                if attempt > 0 {
                    tracing::info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(error)) if !error.is_retryable() => return Err(SyncError::Api(error)),
            Ok(Err(error)) => SyncError::Network(error),
            Err(_) => SyncError::Timeout(timeout),
        };

        warn!(
            operation,
            attempt = attempt + 1,
            max_attempts = attempts,
            error = %failure,
            "Attempt failed"
        );
        last = Some(failure);
    }

    Err(SyncError::ExhaustedRetries {
        attempts,
        last: Box::new(last.unwrap_or(SyncError::Timeout(timeout))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.attempt_timeout(), Duration::from_secs(30));
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::new(10, 100, 1_000, 2.0);
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(1_000));
        assert_eq!(config.delay_for_attempt(30), Duration::from_millis(1_000));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: RetryConfig =
            serde_json::from_str(r#"{ "max_attempts": 5 }"#).expect("deserialize");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_delay_ms, 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let calls = &AtomicU32::new(0);
        let result = run_with_retry(&RetryConfig::default(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiError::Transport("reset".into()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.expect("second attempt succeeds"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: SyncResult<()> = run_with_retry(&RetryConfig::default(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Status {
                status: 422,
                body: "bad".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(SyncError::Api(ApiError::Status { status: 422, .. }))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let calls = &AtomicU32::new(0);
        let config = RetryConfig::new(0, 1, 1, 2.0);
        let result: SyncResult<()> = run_with_retry(&config, "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Transport("down".into()))
        })
        .await;

        assert!(matches!(
            result,
            Err(SyncError::ExhaustedRetries { attempts: 1, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_delay_is_monotonic_and_capped(
                initial in 1u64..5_000,
                max in 1u64..120_000,
                multiplier in 1.0f64..4.0,
                attempt in 0u32..20,
            ) {
                let config = RetryConfig::new(5, initial, max, multiplier);
                let current = config.delay_for_attempt(attempt);
                let next = config.delay_for_attempt(attempt + 1);

                prop_assert!(current <= next, "delay must not shrink: {:?} > {:?}", current, next);
                prop_assert!(next <= Duration::from_millis(max), "delay {:?} above cap {}", next, max);
            }
        }
    }
}
