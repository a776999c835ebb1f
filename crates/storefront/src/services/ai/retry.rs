//! Exponential backoff for quota errors.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::AiError;

/// How often and how patiently to retry a rate-limited call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

/// Run `op`, retrying only while it fails with a quota error.
///
/// Sleeps `initial_delay`, then multiplies the delay after each retry.
/// Any other error, or running out of retries, returns the last error.
///
/// # Errors
///
/// Returns the error from the final attempt.
pub async fn with_quota_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, AiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let mut delay = policy.initial_delay;
    let mut retries_left = policy.max_retries;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retries_left > 0 && e.is_quota() => {
                warn!(
                    error = %e,
                    delay_ms = delay.as_millis(),
                    retries_left,
                    "Quota exceeded, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.multiplier);
                retries_left -= 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(1),
            ..RetryPolicy::default()
        }
    }

    fn quota() -> AiError {
        AiError::Api {
            provider: "Gemini",
            status: 429,
            message: "RESOURCE_EXHAUSTED".to_owned(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert!((policy.multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_retries_quota_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_quota_retry(&fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(quota())
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_quota_retry(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(quota())
        })
        .await;

        assert!(result.unwrap_err().is_quota());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_quota_retry(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AiError::InvalidResponse("not json".to_owned()))
        })
        .await;

        assert!(matches!(result, Err(AiError::InvalidResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles() {
        let start = tokio::time::Instant::now();
        let _: Result<(), _> =
            with_quota_retry(&RetryPolicy::default(), || async { Err(quota()) }).await;
        // 1 s + 2 s + 4 s
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }
}
