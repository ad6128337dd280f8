//! HubSpot-specific error types
//!
//! Executor failures keep the HTTP status inside their display form so the
//! message-based classifier can see it ("429", "401", ...), the same way the
//! provider's own error payloads carry status text.

use opsdeck_core::classify_message;
use opsdeck_domain::ErrorCategory;
use thiserror::Error;

/// Errors raised while executing one sync job
#[derive(Debug, Error)]
pub enum HubSpotError {
    /// Non-success response; `message` is the serialized error payload
    #[error("HubSpot API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid response body: {0}")]
    Body(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubSpotError {
    /// Classify this failure for retry decisions and failure logging
    pub fn category(&self) -> ErrorCategory {
        classify_message(&self.to_string())
    }
}

impl From<reqwest::Error> for HubSpotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection refused: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_classify_by_status() {
        let err = HubSpotError::Api { status: 429, message: "too many requests".into() };
        assert_eq!(err.category(), ErrorCategory::RateLimit);

        let err = HubSpotError::Api { status: 401, message: "expired token".into() };
        assert_eq!(err.category(), ErrorCategory::Auth);

        let err = HubSpotError::Api {
            status: 400,
            message: "Property values were not valid".into(),
        };
        assert_eq!(err.category(), ErrorCategory::FieldMapping);
    }

    #[test]
    fn transport_errors_classify_as_transient() {
        assert_eq!(
            HubSpotError::Timeout("deadline elapsed".into()).category(),
            ErrorCategory::Timeout
        );
        assert_eq!(
            HubSpotError::Network("connection refused: tcp".into()).category(),
            ErrorCategory::Network
        );
    }
}
