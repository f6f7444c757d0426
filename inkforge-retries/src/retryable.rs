//! Classification trait for retryable errors.

use std::time::Duration;

/// Implemented by error types the retry executor can classify.
///
/// Only rate-limit failures are retried; everything else is terminal and
/// propagates to the caller without any wait. An error may additionally
/// carry a server-suggested minimum wait, which the backoff schedule
/// honors when it exceeds the exponential delay.
pub trait Retryable {
    /// Whether the executor should re-attempt after this error.
    fn is_retryable(&self) -> bool;

    /// Server-suggested wait before the next attempt, if the error
    /// carries one.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}
