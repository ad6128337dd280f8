//! HubSpot sync infrastructure
//!
//! This module provides the outbound CRM sync path:
//! - `HubSpotClient`: executes one job as one REST call and feeds the
//!   rate-limit tracker from response headers
//! - `SyncQueueManager`: in-process FIFO job queue with adaptive throttling
//!   and bounded exponential-backoff retries
//! - `SyncLockRegistry`: coordination locks between webhook and batch sync
//! - `properties`: the single source of truth for CRM property lists

pub mod client;
mod errors;
pub mod lock;
pub mod properties;
pub mod queue;

pub use client::{HubSpotClient, HubSpotClientConfig, SearchPage, SearchRequest};
pub use errors::HubSpotError;
pub use lock::SyncLockRegistry;
pub use queue::{JobExecutor, SyncQueueConfig, SyncQueueManager};
