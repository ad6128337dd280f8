//! Port interfaces for sync operations

use async_trait::async_trait;
use opsdeck_domain::{FailureRecord, Result};

/// Trait for the external failure-log sink
///
/// One row per failed sync attempt. Implementations must treat the write as
/// best-effort from the caller's point of view; the queue never fails a job
/// because its failure could not be logged.
#[async_trait]
pub trait FailureLogSink: Send + Sync {
    /// Insert one failure record
    async fn record_failure(&self, record: &FailureRecord) -> Result<()>;
}
