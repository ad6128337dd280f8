//! Rate-limit tracking
//!
//! Tracks the remaining provider quota learned from the most recently
//! completed response. This is a cooperative, best-effort throttle: it does
//! not guarantee the provider limit is never hit, only that the queue backs
//! off once it has evidence it is close.

use std::time::Duration;

use opsdeck_domain::constants::{
    RATE_LIMIT_FALLBACK_WAIT_MS, RATE_LIMIT_INITIAL_REMAINING, RATE_LIMIT_PAUSE_THRESHOLD,
};
use tokio::time::Instant;

/// Quota state learned from response headers
///
/// Uses `tokio::time::Instant` so paused-clock tests stay deterministic.
#[derive(Debug, Clone)]
pub struct RateLimitTracker {
    remaining: u32,
    reset_at: Option<Instant>,
}

impl RateLimitTracker {
    /// Optimistic initial state; the first call is never blocked
    pub fn new() -> Self {
        Self { remaining: RATE_LIMIT_INITIAL_REMAINING, reset_at: None }
    }

    /// Overwrite tracked state from the latest response headers
    ///
    /// Quota is never decremented speculatively; only observed responses
    /// move the needle.
    pub fn record_response(&mut self, remaining: u32, window_ms: u64) {
        self.remaining = remaining;
        self.reset_at = Some(Instant::now() + Duration::from_millis(window_ms));
    }

    /// Whether the queue should pause before the next call
    pub fn should_pause(&self) -> bool {
        self.remaining < RATE_LIMIT_PAUSE_THRESHOLD
    }

    /// How long to pause: until the estimated window reset, or a fixed
    /// fallback when no response has been observed yet
    pub fn pause_duration(&self) -> Duration {
        match self.reset_at {
            Some(reset_at) => reset_at.saturating_duration_since(Instant::now()),
            None => Duration::from_millis(RATE_LIMIT_FALLBACK_WAIT_MS),
        }
    }

    /// Last observed remaining-quota count
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_optimistic() {
        let tracker = RateLimitTracker::new();
        assert!(!tracker.should_pause());
        assert_eq!(tracker.remaining(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_below_threshold() {
        let mut tracker = RateLimitTracker::new();

        tracker.record_response(3, 10_000);
        assert!(tracker.should_pause());

        tracker.record_response(5, 10_000);
        assert!(!tracker.should_pause());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_duration_tracks_window_reset() {
        let mut tracker = RateLimitTracker::new();
        tracker.record_response(2, 10_000);

        assert_eq!(tracker.pause_duration(), Duration::from_millis(10_000));

        tokio::time::advance(Duration::from_millis(4_000)).await;
        assert_eq!(tracker.pause_duration(), Duration::from_millis(6_000));

        tokio::time::advance(Duration::from_millis(7_000)).await;
        assert_eq!(tracker.pause_duration(), Duration::ZERO);
    }

    #[test]
    fn fallback_wait_when_reset_unknown() {
        let tracker = RateLimitTracker::new();
        assert_eq!(tracker.pause_duration(), Duration::from_millis(10_000));
    }
}
