//! Bounded retry for outbound provider calls
//!
//! Every remote fetch in the pipeline goes through [`RetryPolicy::execute`],
//! which separates transient failures (worth retrying) from fatal ones
//! (retry-pointless). Rate-limit signals wait a fixed backoff before the
//! next attempt; a not-found resource fails on the first attempt because it
//! will never appear.

use crate::error::{AdvisorError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for provider calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (first call included)
    pub max_attempts: u32,

    /// Fixed backoff applied after a rate-limit signal
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, rate_limit_backoff: Duration) -> Self {
        Self {
            max_attempts,
            rate_limit_backoff,
        }
    }

    /// Create a policy with millisecond backoff (for tests)
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_backoff: Duration::from_millis(10),
        }
    }

    /// Execute an async operation with bounded retry
    ///
    /// Per-attempt state (attempt number, last error) lives only inside this
    /// call and is discarded once it resolves. The caller either gets the
    /// operation's value or the last observed error; partial data is never
    /// returned.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            debug!(
                "Attempt {}/{} for operation: {}",
                attempt, self.max_attempts, operation_name
            );

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name,
                            attempt - 1
                        );
                    }
                    return Ok(result);
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(
                        "Operation '{}' rate limited (attempt {}/{}), backing off {:?}",
                        operation_name, attempt, self.max_attempts, self.rate_limit_backoff
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        sleep(self.rate_limit_backoff).await;
                    }
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        "Operation '{}' failed (attempt {}/{}): {}",
                        operation_name, attempt, self.max_attempts, e
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(
                        "Operation '{}' failed with non-retryable error: {}",
                        operation_name, e
                    );
                    return Err(e);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| {
            AdvisorError::Other(format!("Operation '{operation_name}' failed with no error"))
        });

        warn!(
            "Operation '{}' failed after {} attempts: {}",
            operation_name, self.max_attempts, error
        );

        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::sync::Mutex;

    fn rate_limited() -> AdvisorError {
        AdvisorError::RateLimited {
            provider: "test".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.rate_limit_backoff, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let policy = RetryPolicy::fast();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();

        let result = policy
            .execute("test_op", || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Ok::<i32, AdvisorError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*attempt_count.lock().await, 1);
    }

    #[tokio::test]
    async fn test_rate_limit_twice_then_success_waits_twice() {
        let policy = RetryPolicy::fast();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();
        let started = Instant::now();

        let result = policy
            .execute("test_op", || {
                let count = count.clone();
                async move {
                    let mut current = count.lock().await;
                    *current += 1;
                    let attempt = *current;
                    drop(current);

                    if attempt <= 2 {
                        Err(rate_limited())
                    } else {
                        Ok::<i32, AdvisorError>(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(*attempt_count.lock().await, 3);
        // Two backoff waits must have elapsed before the third attempt.
        assert!(started.elapsed() >= policy.rate_limit_backoff * 2);
    }

    #[tokio::test]
    async fn test_not_found_fails_immediately_without_backoff() {
        let policy = RetryPolicy::fast();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();
        let started = Instant::now();

        let result = policy
            .execute("test_op", || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Err::<i32, AdvisorError>(AdvisorError::NotFound("BADSYM".to_string()))
                }
            })
            .await;

        assert!(matches!(result, Err(AdvisorError::NotFound(_))));
        assert_eq!(*attempt_count.lock().await, 1);
        assert!(started.elapsed() < policy.rate_limit_backoff);
    }

    #[tokio::test]
    async fn test_transient_errors_exhaust_attempts() {
        let policy = RetryPolicy::fast();
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();

        let result = policy
            .execute("test_op", || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Err::<i32, AdvisorError>(AdvisorError::Api("HTTP 503".to_string()))
                }
            })
            .await;

        // Last observed error surfaces after exhaustion.
        assert!(matches!(result, Err(AdvisorError::Api(_))));
        assert_eq!(*attempt_count.lock().await, 3);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_surfaces_last_error() {
        let policy = RetryPolicy::new(2, Duration::from_millis(5));
        let attempt_count = Arc::new(Mutex::new(0));
        let count = attempt_count.clone();

        let result = policy
            .execute("test_op", || {
                let count = count.clone();
                async move {
                    *count.lock().await += 1;
                    Err::<i32, AdvisorError>(rate_limited())
                }
            })
            .await;

        assert!(matches!(result, Err(AdvisorError::RateLimited { .. })));
        assert_eq!(*attempt_count.lock().await, 2);
    }
}
