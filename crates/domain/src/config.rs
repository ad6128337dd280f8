//! Configuration structures
//!
//! Deserialized from environment variables or a JSON/TOML config file by the
//! loader in `opsdeck-infra`.

use serde::{Deserialize, Serialize};

use crate::constants::{HUBSPOT_BASE_URL, JOB_PACING_MS, MAX_SYNC_RETRIES};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hubspot: HubSpotConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// HubSpot API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotConfig {
    /// Private-app access token (bearer auth)
    pub api_token: String,
    /// API base URL; override for tests
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Failure-log database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string for the `sync_errors` sink
    pub url: String,
}

/// Queue tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed delay between processed jobs, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    /// Maximum retry attempts per job
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-request HTTP timeout, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    HUBSPOT_BASE_URL.to_string()
}

fn default_pacing_ms() -> u64 {
    JOB_PACING_MS
}

fn default_max_retries() -> u32 {
    MAX_SYNC_RETRIES
}

fn default_request_timeout_secs() -> u64 {
    30
}
