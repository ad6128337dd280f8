//! Failure taxonomy and failure-log records

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{FAILURE_SOURCE, MAX_SYNC_RETRIES};
use crate::types::job::{ObjectType, SyncOperation};

/// Category assigned to a failed sync attempt
///
/// The category decides whether the attempt is retried: rate-limit, timeout
/// and network failures are transient; auth and payload-shape failures are
/// permanently fatal for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    RateLimit,
    Auth,
    Timeout,
    FieldMapping,
    Network,
    Validation,
}

impl ErrorCategory {
    /// Stable string form, matches the `sync_errors.error_type` column
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::Timeout => "timeout",
            Self::FieldMapping => "field_mapping",
            Self::Network => "network",
            Self::Validation => "validation",
        }
    }

    /// True for transient categories worth retrying
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Timeout | Self::Network)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row per failed sync attempt, written to the external log sink
///
/// Never mutated after insert; operators inspect these rows through the
/// dashboard rather than through any synchronous error channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub error_type: ErrorCategory,
    pub source: String,
    pub object_type: ObjectType,
    pub object_id: Option<String>,
    pub operation: SyncOperation,
    pub error_message: String,
    pub error_details: serde_json::Value,
    pub request_payload: serde_json::Value,
    pub retry_count: u32,
    pub max_retries: u32,
    /// When the next attempt is due; `None` when the job is dropped
    pub next_retry_at: Option<DateTime<Utc>>,
}

impl FailureRecord {
    /// Record with the standard source and retry ceiling filled in
    pub fn new(
        error_type: ErrorCategory,
        object_type: ObjectType,
        operation: SyncOperation,
        error_message: impl Into<String>,
    ) -> Self {
        let error_message = error_message.into();
        Self {
            error_type,
            source: FAILURE_SOURCE.to_string(),
            object_type,
            object_id: None,
            operation,
            error_details: serde_json::json!({ "originalError": error_message }),
            error_message,
            request_payload: serde_json::Value::Null,
            retry_count: 0,
            max_retries: MAX_SYNC_RETRIES,
            next_retry_at: None,
        }
    }
}

/// Read-only queue snapshot for operational dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub processing: bool,
    pub rate_limit_remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_categories() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Timeout.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::FieldMapping.is_retryable());
        assert!(!ErrorCategory::Validation.is_retryable());
    }

    #[test]
    fn category_round_trips_through_serde() {
        let json = serde_json::to_string(&ErrorCategory::FieldMapping).expect("serializes");
        assert_eq!(json, "\"field_mapping\"");

        let back: ErrorCategory = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, ErrorCategory::FieldMapping);
    }

    #[test]
    fn failure_record_defaults() {
        let record = FailureRecord::new(
            ErrorCategory::Validation,
            ObjectType::Contact,
            SyncOperation::Create,
            "boom",
        );

        assert_eq!(record.source, "hubspot");
        assert_eq!(record.max_retries, 3);
        assert!(record.next_retry_at.is_none());
        assert_eq!(record.error_details["originalError"], "boom");
    }
}
