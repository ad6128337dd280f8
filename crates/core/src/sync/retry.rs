//! Retry policy
//!
//! Bounded exponential backoff for transient sync failures. The ceiling
//! bounds both total latency and total quota consumption per job; fatal
//! categories are never retried because replaying a malformed payload only
//! wastes quota.

use std::time::Duration;

use opsdeck_domain::constants::{MAX_SYNC_RETRIES, RETRY_BACKOFF_BASE_MS};
use opsdeck_domain::ErrorCategory;

/// Retry decision and delay computation
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Policy with an explicit ceiling and base delay
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Whether a failed attempt should be rescheduled
    pub fn should_retry(&self, category: ErrorCategory, attempt: u32) -> bool {
        attempt < self.max_retries && category.is_retryable()
    }

    /// Delay before re-enqueueing attempt `attempt + 1`
    ///
    /// `base * 2^attempt`: 1s, 2s, 4s with the default base.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = 1u32 << attempt.min(8);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Configured retry ceiling
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_SYNC_RETRIES, Duration::from_millis(RETRY_BACKOFF_BASE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn retries_transient_categories_within_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(ErrorCategory::RateLimit, 0));
        assert!(policy.should_retry(ErrorCategory::Timeout, 2));
        assert!(policy.should_retry(ErrorCategory::Network, 1));
    }

    #[test]
    fn never_retries_fatal_categories() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(ErrorCategory::Auth, 0));
        assert!(!policy.should_retry(ErrorCategory::FieldMapping, 0));
        assert!(!policy.should_retry(ErrorCategory::Validation, 0));
    }

    #[test]
    fn stops_at_retry_ceiling() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(ErrorCategory::RateLimit, 3));
        assert!(!policy.should_retry(ErrorCategory::Network, 7));
    }
}
