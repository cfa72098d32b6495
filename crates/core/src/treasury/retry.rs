//! Bounded retry with randomized backoff.
//!
//! Wraps one transactional unit. Only errors the caller classifies as
//! retryable are retried; anything else aborts immediately.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Lower bound of the randomized delay between attempts.
    pub min_backoff: Duration,
    /// Upper bound of the randomized delay between attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy from attempt count and backoff bounds in milliseconds.
    #[must_use]
    pub const fn new(max_attempts: u32, min_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            min_backoff: Duration::from_millis(min_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// A policy that makes a single attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(1, 0, 0)
    }

    /// Effective number of attempts.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 { 1 } else { self.max_attempts }
    }

    /// Picks a delay uniformly within the backoff bounds.
    #[must_use]
    pub fn backoff_delay(&self) -> Duration {
        let low = u64::try_from(self.min_backoff.as_millis()).unwrap_or(u64::MAX);
        let high = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Duration::from_millis(rand::rng().random_range(low..=high))
    }
}

/// Failure of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: E,
    },

    /// A non-retryable error stopped the loop.
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    /// Returns the underlying error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } | Self::Aborted(last) => last,
        }
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error,
/// or the policy's attempts are used up.
///
/// `operation` receives the 1-based attempt number. Each call must start a
/// fresh transactional unit, since a failed attempt has been rolled back.
///
/// # Errors
///
/// Returns `RetryError::Aborted` for a non-retryable error, or
/// `RetryError::Exhausted` with the last error when attempts run out.
pub async fn with_retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => return Err(RetryError::Aborted(err)),
            Err(err) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }
            Err(_) => {
                let delay = policy.backoff_delay();
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treasury::error::BankError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, 0, 0)
    }

    #[test]
    fn test_backoff_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.backoff_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(500));
        }
    }

    #[test]
    fn test_backoff_swapped_bounds() {
        let policy = RetryPolicy::new(3, 20, 10);
        let delay = policy.backoff_delay();
        assert!(delay >= Duration::from_millis(10) && delay <= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, 0, 0).attempts(), 1);
        assert_eq!(RetryPolicy::no_retry().attempts(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_conflicts() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&instant_policy(3), BankError::is_retryable, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(BankError::LockConflict("deadlock detected".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(&instant_policy(3), BankError::is_retryable, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BankError::LockConflict("lock timeout".into())) }
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 3, last: BankError::LockConflict(_) })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_aborts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> =
            with_retry(&instant_policy(3), BankError::is_retryable, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(BankError::VoidReasonRequired) }
            })
            .await;

        assert!(matches!(
            result,
            Err(RetryError::Aborted(BankError::VoidReasonRequired))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
