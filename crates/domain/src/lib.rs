//! # OpsDeck Domain
//!
//! Business domain types and models for the OpsDeck CRM sync service.
//!
//! This crate contains:
//! - Sync job types (operations, payloads, object types)
//! - Failure taxonomy and failure-log records
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other OpsDeck crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
