//! Sync primitives: classification, throttling, retry policy, ports

pub mod classify;
pub mod ports;
pub mod rate_limit;
pub mod retry;
