//! The retry executor.
//!
//! Attempts are strictly sequential; nothing is cached between attempts,
//! so wrapped operations must be idempotent from the caller's point of
//! view (call sites only wrap read/generate calls).

use crate::policy::BackoffPolicy;
use crate::retryable::Retryable;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Record of one attempt within a retry sequence.
///
/// Ephemeral: it exists only for the duration of one logical request and
/// is discarded when the call resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// 0-based position within the bounded retry loop.
    pub attempt_index: u32,
    /// Wait computed before the next attempt (zero for the final or
    /// successful attempt).
    pub delay: Duration,
    /// Error text of this attempt, if it failed.
    pub error: Option<String>,
}

/// Aggregate state of a retry sequence, for callers that want to inspect
/// what happened.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    /// Number of attempts made.
    pub attempts: u32,
    /// Total time spent sleeping between attempts.
    pub total_wait: Duration,
    /// Per-attempt records.
    pub history: Vec<AttemptInfo>,
}

/// Execute `operation` under `policy`.
///
/// - On success, returns immediately with no further invocations.
/// - On a terminal (non-retryable) failure, propagates with no wait.
/// - On a retryable failure, sleeps the computed backoff delay and
///   re-invokes, up to `policy.max_attempts` total attempts; once the
///   budget is spent, the **last** retryable failure is returned.
pub async fn run_with_backoff<F, Fut, T, E>(policy: &BackoffPolicy, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let (result, _state) = run_with_backoff_state(policy, operation).await;
    result
}

/// Like [`run_with_backoff`], but also returns the attempt history.
pub async fn run_with_backoff_state<F, Fut, T, E>(
    policy: &BackoffPolicy,
    operation: F,
) -> (Result<T, E>, RetryState)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut state = RetryState::default();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt_index = 0u32;

    loop {
        state.attempts = attempt_index + 1;

        match operation().await {
            Ok(value) => {
                state.history.push(AttemptInfo {
                    attempt_index,
                    delay: Duration::ZERO,
                    error: None,
                });
                return (Ok(value), state);
            }
            Err(error) => {
                let attempts_left = max_attempts.saturating_sub(attempt_index + 1);

                if !error.is_retryable() || attempts_left == 0 {
                    if error.is_retryable() {
                        warn!(
                            attempts = state.attempts,
                            error = %error,
                            "retry budget exhausted"
                        );
                    }
                    state.history.push(AttemptInfo {
                        attempt_index,
                        delay: Duration::ZERO,
                        error: Some(error.to_string()),
                    });
                    return (Err(error), state);
                }

                let delay = policy.delay_for(attempt_index, error.retry_after());
                debug!(
                    attempt = attempt_index + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "rate limited, waiting before retry"
                );

                state.total_wait += delay;
                state.history.push(AttemptInfo {
                    attempt_index,
                    delay,
                    error: Some(error.to_string()),
                });

                sleep(delay).await;
                attempt_index += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("429 quota exceeded")]
        Quota { retry_after: Option<Duration> },
        #[error("500 internal error")]
        Internal,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Quota { .. })
        }

        fn retry_after(&self) -> Option<Duration> {
            match self {
                TestError::Quota { retry_after } => *retry_after,
                TestError::Internal => None,
            }
        }
    }

    fn fast_policy(max_attempts: u32) -> BackoffPolicy {
        BackoffPolicy::new()
            .max_attempts(max_attempts)
            .base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_is_single_invocation() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = run_with_backoff(&fast_policy(5), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_terminal_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let (result, state) = run_with_backoff_state(&fast_policy(5), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Internal)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Internal)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Terminal failure: zero wait occurred.
        assert_eq!(state.total_wait, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_until_success() {
        // Fails with a quota error on attempts 1-4 and succeeds on 5.
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let (result, state) = run_with_backoff_state(&fast_policy(5), || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 4 {
                    Err(TestError::Quota { retry_after: None })
                } else {
                    Ok("episode text")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "episode text");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(state.attempts, 5);

        // Four waits were logged, with strictly increasing delays.
        let waits: Vec<_> = state
            .history
            .iter()
            .filter(|a| a.delay > Duration::ZERO)
            .map(|a| a.delay)
            .collect();
        assert_eq!(waits.len(), 4);
        assert!(waits.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = run_with_backoff(&fast_policy(3), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Quota { retry_after: None })
            }
        })
        .await;

        // Exactly 3 attempts, no 4th, and the quota error is re-thrown.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(TestError::Quota { .. })));
    }

    #[tokio::test]
    async fn test_success_on_later_attempt_stops_invoking() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = run_with_backoff(&fast_policy(5), || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 1 {
                    Err(TestError::Quota { retry_after: None })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_server_hint_extends_wait() {
        let policy = fast_policy(2);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let (_result, state) = run_with_backoff_state(&policy, || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(TestError::Quota {
                        retry_after: Some(Duration::from_millis(5)),
                    })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        // 5 ms hint + 1 s padding beats the 1 ms exponential value.
        assert_eq!(state.history[0].delay, Duration::from_millis(1005));
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = run_with_backoff(&fast_policy(0), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(1)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
