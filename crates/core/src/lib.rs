//! # OpsDeck Core
//!
//! Pure sync logic and port definitions for the OpsDeck CRM sync service.
//!
//! This crate contains:
//! - Failure classification (message-based taxonomy)
//! - Rate-limit tracking learned from provider response headers
//! - Retry policy (bounded exponential backoff)
//! - Port traits implemented by `opsdeck-infra`
//!
//! ## Architecture
//! - Depends only on `opsdeck-domain`
//! - No I/O; infrastructure implements the ports defined here

pub mod sync;

pub use sync::classify::classify_message;
pub use sync::ports::FailureLogSink;
pub use sync::rate_limit::RateLimitTracker;
pub use sync::retry::RetryPolicy;
