//! Backoff policy: attempt budget and delay schedule.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Pad added on top of a server-suggested wait, so the next attempt lands
/// comfortably after the quota window reopens.
const HINT_PADDING: Duration = Duration::from_secs(1);

/// Attempt budget and delay schedule for [`run_with_backoff`].
///
/// The wait before re-attempt `i` (0-indexed) is `base_delay * 2^i`,
/// capped at `max_delay`. If the failed attempt carried a server wait
/// hint, the actual wait is the greater of the exponential value and the
/// hint plus one second.
///
/// [`run_with_backoff`]: crate::run_with_backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial delay.
    pub base_delay: Duration,
    /// Cap on the exponential schedule (server hints are not capped).
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with the default budget (5 attempts, 2 s base).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum attempt count.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay.
    #[must_use]
    pub fn base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }

    /// Set the cap on the exponential schedule.
    #[must_use]
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Compute the wait after the failed attempt at `attempt_index`
    /// (0-based), honoring a server hint when one is present.
    #[must_use]
    pub fn delay_for(&self, attempt_index: u32, hint: Option<Duration>) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        // Shift is clamped so pathological indices cannot overflow.
        let exp_ms = base_ms.saturating_mul(1u64 << attempt_index.min(20));
        let exponential = Duration::from_millis(exp_ms).min(self.max_delay);

        match hint {
            Some(h) => exponential.max(h + HINT_PADDING),
            None => exponential,
        }
    }
}
