//! Bounded exponential-backoff retry for rate-limited provider calls.
//!
//! Only rate-limit signals are retried; every other failure is returned
//! immediately so the caller can fall through to its next strategy.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::LlmError;

/// Default number of attempts for rate-limited calls.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default base delay; doubles on each subsequent attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Runs `op`, retrying up to `max_attempts` total attempts when the error is
/// a rate-limit signal. The delay starts at `base_delay` and doubles each
/// retry.
pub async fn retry_rate_limited<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(err) if err.is_rate_limited() && attempt + 1 < attempts => {
                attempt += 1;
                let delay = base_delay * (1u32 << (attempt - 1).min(5));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited() -> LlmError {
        LlmError::RateLimited {
            url: "http://x".into(),
            snippet: "rate limit".into(),
        }
    }

    #[tokio::test]
    async fn retries_rate_limits_up_to_bound() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = retry_rate_limited(3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_after_transient_rate_limit() {
        let calls = AtomicU32::new(0);
        let res = retry_rate_limited(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(rate_limited())
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;
        assert_eq!(res.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let res: Result<(), _> = retry_rate_limited(3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::HttpStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    url: "http://x".into(),
                    snippet: "boom".into(),
                })
            }
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
