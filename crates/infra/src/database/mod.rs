//! Database-backed infrastructure

mod failure_log;

pub use failure_log::PostgresFailureLog;
