//! Failure classification
//!
//! Assigns an [`ErrorCategory`] to a failure based on its message. The checks
//! run in priority order because a message can match several substrings; the
//! first match wins. Status codes surface here as substrings ("429", "401")
//! because executor errors embed the HTTP status in their display form.

use opsdeck_domain::ErrorCategory;

/// Classify a failure message into exactly one category
pub fn classify_message(message: &str) -> ErrorCategory {
    let message = message.to_lowercase();

    if message.contains("rate limit") || message.contains("429") {
        ErrorCategory::RateLimit
    } else if message.contains("auth") || message.contains("401") || message.contains("403") {
        ErrorCategory::Auth
    } else if message.contains("timeout") || message.contains("timed out") {
        ErrorCategory::Timeout
    } else if message.contains("field")
        || message.contains("property")
        || message.contains("invalid")
    {
        ErrorCategory::FieldMapping
    } else if message.contains("network")
        || message.contains("econnrefused")
        || message.contains("connection refused")
        || message.contains("fetch")
    {
        ErrorCategory::Network
    } else {
        ErrorCategory::Validation
    }
}
