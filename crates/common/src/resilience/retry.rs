//! Retry classification and backoff
//!
//! Failure handling is split into a pure classifier (does this error warrant
//! another attempt, and after how long?) and a backoff calculator. Both are
//! synchronous and deterministic so they can be tested without a runtime.

use std::time::Duration;

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay (e.g. from a Retry-After
    /// header)
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

impl RetryDecision {
    /// Whether this decision allows another attempt.
    #[must_use]
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::Stop)
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Classify `error` on 0-based `attempt`.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> RetryDecision,
{
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
        self(error, attempt)
    }
}

/// Exponential backoff: `base × 2^attempt`, capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Base unit for the first retry delay
    pub base: Duration,
    /// Upper bound for any single delay
    pub max: Duration,
}

impl Backoff {
    /// Conventional production backoff: 1 s base, 30 s cap.
    #[must_use]
    pub fn standard() -> Self {
        Self { base: Duration::from_secs(1), max: Duration::from_secs(30) }
    }

    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay before the retry following 0-based `attempt`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let shift = attempt.min(16);
        let multiplier = 1u32 << shift;
        self.base.saturating_mul(multiplier).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_per_attempt() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));

        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn delay_is_capped() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(backoff.delay(10), Duration::from_secs(5));
        // Far-out attempts must not overflow
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn standard_backoff_uses_one_second_base() {
        let backoff = Backoff::standard();
        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
    }

    #[test]
    fn closures_are_policies() {
        let policy = |error: &&str, attempt: u32| {
            if error.contains("transient") && attempt < 2 {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        };

        assert_eq!(policy.should_retry(&"transient glitch", 0), RetryDecision::Retry);
        assert_eq!(policy.should_retry(&"transient glitch", 2), RetryDecision::Stop);
        assert_eq!(policy.should_retry(&"fatal", 0), RetryDecision::Stop);
    }

    #[test]
    fn retry_after_counts_as_retry() {
        assert!(RetryDecision::Retry.should_retry());
        assert!(RetryDecision::RetryAfter(Duration::from_secs(2)).should_retry());
        assert!(!RetryDecision::Stop.should_retry());
    }
}
