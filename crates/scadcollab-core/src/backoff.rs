//! Bounded retry policy with linearly growing delay.

use std::time::Duration;

/// Retry policy: up to `max_attempts` tries, waiting
/// `attempt * base` between failures (attempts are 1-indexed, and no
/// wait follows the final attempt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    /// Delay to wait after the given (1-indexed) failed attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base * attempt
    }

    /// Iterator over attempt indices, `1..=max_attempts`.
    pub fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_attempts
    }
}
