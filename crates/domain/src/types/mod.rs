//! Common data types used throughout the application

pub mod failure;
pub mod job;

pub use failure::{ErrorCategory, FailureRecord, QueueStatus};
pub use job::{
    BatchAction, CompanyProperties, ContactProperties, DealProperties, EngagementProperties,
    JobPayload, ObjectType, SyncJob, SyncOperation,
};
