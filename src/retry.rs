//! Retry policy for transient provider errors (§4.4, §7, §9).
//!
//! Search and recognizer calls classified as transient (rate limits,
//! timeouts, temporary unavailability) are retried once with a jittered
//! exponential backoff. Scene-filter and planner calls are never retried
//! here — a bad classification or plan is not a transport fault.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// Jittered exponential backoff policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts beyond the first.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    /// Upper bound, in milliseconds, of additional random jitter added to
    /// each computed delay to avoid synchronized retries against the same
    /// provider.
    pub jitter_ms: u64,
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0).powi(attempt as i32);
        let base = (self.base_delay_ms as f64 * factor).round().max(0.0) as u64;
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        Duration::from_millis(base + jitter)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay_ms: 200,
            backoff_factor: 2.0,
            jitter_ms: 50,
        }
    }
}

/// Whether an error is worth retrying under this policy.
fn is_retryable(error: &Error) -> bool {
    error.is_transient()
}

/// Run `op` under the retry policy, retrying only on transient errors.
///
/// `op` is re-invoked from scratch on each attempt; callers must make sure
/// it is safe to call more than once (no partial side effects committed).
pub async fn with_retry<F, Fut, T>(config: RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let should_retry = attempt < config.max_retries && is_retryable(&error);
                if !should_retry {
                    return Err(error);
                }
                let delay = config.delay_for_attempt(attempt);
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(RetryConfig::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_up_to_max_retries() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            backoff_factor: 1.0,
            jitter_ms: 0,
        };
        let result: Result<i32> = with_retry(config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::provider("search", "rate limited", true))
        })
        .await;
        assert!(result.is_err());
        // first attempt + 2 retries = 3 calls total
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_fatal_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<i32> = with_retry(RetryConfig::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::provider("search", "unauthorized", false))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_one_transient_failure() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 1,
            base_delay_ms: 1,
            backoff_factor: 1.0,
            jitter_ms: 0,
        };
        let result = with_retry(config, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(Error::provider("recognize", "timeout", true))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
