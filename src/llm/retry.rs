//! Bounded retry for rate-limited completion calls.
//!
//! Only `LlmError::RateLimited` is retried. Content errors (empty or
//! malformed payloads) propagate immediately — replaying them burns quota
//! without improving odds.

use std::time::Duration;

use tracing::warn;

use crate::error::LlmError;

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// retry ceiling is reached. With a ceiling of N the call is attempted at
/// most N+1 times.
///
/// The sleep before each retry uses the server's `retry_after` hint when
/// present, else exponential backoff from `base_delay`.
pub(crate) async fn with_retry<T, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    label: &str,
    mut call: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !err.is_retryable() || attempt > max_retries {
                    return Err(err);
                }

                let delay = match &err {
                    LlmError::RateLimited {
                        retry_after: Some(hint),
                        ..
                    } => *hint,
                    _ => base_delay * 2u32.pow(attempt - 1),
                };

                warn!(
                    label,
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    const BASE: Duration = Duration::from_millis(500);

    fn rate_limited(retry_after: Option<Duration>) -> LlmError {
        LlmError::RateLimited {
            provider: "test".into(),
            retry_after,
        }
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = with_retry(5, BASE, "test", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LlmError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhausts_ceiling_then_propagates() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = with_retry(5, BASE, "test", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited(None))
            }
        })
        .await;

        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        // Ceiling of 5 retries means exactly 6 attempts total.
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn honors_server_hint_exactly() {
        let start = tokio::time::Instant::now();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = with_retry(1, BASE, "test", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited(Some(Duration::from_millis(250))))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // One sleep before the second attempt: the 250ms hint, not the
        // 500ms exponential fallback.
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn exponential_fallback_without_hint() {
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = with_retry(3, BASE, "test", || async {
            Err(rate_limited(None))
        })
        .await;

        assert!(result.is_err());
        // 500 + 1000 + 2000 ms of backoff across the three retries.
        assert_eq!(start.elapsed(), Duration::from_millis(3500));
    }

    #[tokio::test]
    async fn non_retryable_error_propagates_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = with_retry(5, BASE, "test", || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::InvalidResponse {
                    provider: "test".into(),
                    reason: "garbage".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(LlmError::InvalidResponse { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = with_retry(5, BASE, "test", || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited(None))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
