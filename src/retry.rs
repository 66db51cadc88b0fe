//! Bounded upstream attempts with timeout and backoff.
//!
//! Provides [`attempt_with_retry`], used by the catalog cache to wrap each
//! call into a [`CatalogSource`](crate::source::CatalogSource).

use crate::source::UpstreamError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of attempts (no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default backoff between attempts in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`attempt_with_retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (minimum 1; 0 is treated as 1).
    pub max_attempts: u32,
    /// Sleep duration between consecutive attempts.
    pub backoff: Duration,
    /// Upper bound for each individual attempt.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Run `op` up to `config.max_attempts` times, each bounded by `config.timeout`.
///
/// Returns the first success, or the last error once all attempts fail.
/// An attempt that exceeds the timeout fails with [`UpstreamError::Timeout`].
pub async fn attempt_with_retry<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut op: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(config.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(config.timeout)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    label, attempt, max_attempts, e
                );
                warn!("Retrying {} in {}ms...", label, config.backoff.as_millis());
                tokio::time::sleep(config.backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            backoff: Duration::from_millis(1),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn retry_config_defaults() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(cfg.backoff, Duration::from_millis(DEFAULT_BACKOFF_MS));
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = attempt_with_retry(&fast(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, UpstreamError>(7) }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = attempt_with_retry(&fast(2), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(UpstreamError::Status(500))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returns_last_error_after_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = attempt_with_retry(&fast(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(UpstreamError::Status(503)) }
        })
        .await;

        assert!(matches!(result, Err(UpstreamError::Status(503))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_attempts_treated_as_one() {
        let calls = AtomicU32::new(0);
        let _: Result<(), _> = attempt_with_retry(&fast(0), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(UpstreamError::Status(500)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hung_attempt_times_out() {
        let cfg = RetryConfig {
            max_attempts: 1,
            backoff: Duration::from_millis(1),
            timeout: Duration::from_millis(20),
        };

        let result: Result<(), _> = attempt_with_retry(&cfg, "test", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(UpstreamError::Timeout(_))));
    }
}
