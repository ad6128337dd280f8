//! # OpsDeck Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client wrapper over `reqwest`
//! - HubSpot API client, sync queue manager and lock registry
//! - Postgres failure-log sink
//! - Configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `opsdeck-core`
//! - Depends on `opsdeck-domain` and `opsdeck-core`
//! - Contains all "impure" code (I/O, network, database)

pub mod config;
pub mod database;
pub mod http;
pub mod hubspot;

// Re-export commonly used items
pub use database::PostgresFailureLog;
pub use http::{HttpClient, HttpClientBuilder};
pub use hubspot::{
    HubSpotClient, HubSpotClientConfig, HubSpotError, JobExecutor, SyncLockRegistry,
    SyncQueueConfig, SyncQueueManager,
};
