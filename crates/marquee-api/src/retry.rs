// Retry logic with exponential backoff
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Single attempt. News and TMDB calls surface their first failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// One quick retry, used when a connection could not be established at all
    pub fn connection_failures() -> Self {
        Self {
            max_retries: 1,
            initial_delay_ms: 250,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Execute an operation, retrying the errors `should_retry` accepts.
///
/// The delay doubles (by `backoff_multiplier`) after each failed attempt
/// and never exceeds `max_delay_ms`.
pub async fn with_retry<F, Fut, T, E, R>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("Request succeeded after {} retries", attempt);
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= config.max_retries || !should_retry(&err) {
                    return Err(err);
                }
                attempt += 1;

                warn!(
                    "Request failed (attempt {}/{}): {}. Retrying in {}ms...",
                    attempt, config.max_retries, err, delay_ms
                );

                sleep(Duration::from_millis(delay_ms)).await;

                delay_ms = ((delay_ms as f64) * config.backoff_multiplier) as u64;
                delay_ms = delay_ms.min(config.max_delay_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 5,
            max_delay_ms: 20,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_immediately() {
        let call_count = AtomicU32::new(0);

        let result = with_retry(
            &RetryConfig::default(),
            || async {
                call_count.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(42)
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let call_count = AtomicU32::new(0);

        let result = with_retry(
            &fast(3),
            || async {
                let count = call_count.fetch_add(1, Ordering::SeqCst) + 1;
                if count < 3 {
                    Err("connection refused")
                } else {
                    Ok(42)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let call_count = AtomicU32::new(0);

        let result = with_retry(
            &fast(2),
            || async {
                call_count.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>("permanent failure")
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Err("permanent failure"));
        assert_eq!(call_count.load(Ordering::SeqCst), 3); // Initial attempt + 2 retries
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_at_once() {
        let call_count = AtomicU32::new(0);

        let result = with_retry(
            &fast(5),
            || async {
                call_count.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>("404")
            },
            |err| *err != "404",
        )
        .await;

        assert_eq!(result, Err("404"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_none_makes_a_single_attempt() {
        let call_count = AtomicU32::new(0);

        let _ = with_retry(
            &RetryConfig::none(),
            || async {
                call_count.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>("down")
            },
            |_| true,
        )
        .await;

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
