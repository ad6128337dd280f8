//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// HubSpot API
pub const HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-HubSpot-RateLimit-Remaining";
pub const RATE_LIMIT_INTERVAL_HEADER: &str = "X-HubSpot-RateLimit-Interval-Milliseconds";
pub const BATCH_READ_LIMIT: usize = 100;

// Queue pacing and retry budget
pub const MAX_SYNC_RETRIES: u32 = 3;
pub const RETRY_BACKOFF_BASE_MS: u64 = 1_000;
pub const JOB_PACING_MS: u64 = 100;

// Rate-limit throttling. The remaining-quota count is learned from response
// headers; until the first response is observed we assume a full window.
pub const RATE_LIMIT_INITIAL_REMAINING: u32 = 100;
pub const RATE_LIMIT_PAUSE_THRESHOLD: u32 = 5;
pub const RATE_LIMIT_FALLBACK_WAIT_MS: u64 = 10_000;
pub const RATE_LIMIT_DEFAULT_WINDOW_MS: u64 = 10_000;

// Owner cache
pub const OWNER_CACHE_TTL_SECS: u64 = 3_600;

// Sync lock coordination
pub const SYNC_LOCK_TIMEOUT_MS: u64 = 300_000;

// Failure log sink
pub const FAILURE_SOURCE: &str = "hubspot";
