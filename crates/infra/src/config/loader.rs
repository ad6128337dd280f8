//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables (after reading any
//!    `.env` file in the working directory)
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `OPSDECK_HUBSPOT_TOKEN`: HubSpot private-app access token (required)
//! - `OPSDECK_HUBSPOT_BASE_URL`: API base URL override (optional)
//! - `OPSDECK_DATABASE_URL`: Postgres connection string (required)
//! - `OPSDECK_SYNC_PACING_MS`: Delay between jobs in milliseconds (optional)
//! - `OPSDECK_SYNC_MAX_RETRIES`: Retry ceiling per job (optional)
//! - `OPSDECK_SYNC_REQUEST_TIMEOUT_SECS`: HTTP request timeout (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./opsdeck.json` or `./opsdeck.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use opsdeck_domain::{
    Config, DatabaseConfig, HubSpotConfig, OpsError, Result, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `OpsError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    // Make .env contents visible to the env path
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The HubSpot token and database URL are required; queue tuning variables
/// fall back to their defaults when unset.
///
/// # Errors
/// Returns `OpsError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let api_token = env_var("OPSDECK_HUBSPOT_TOKEN")?;
    let database_url = env_var("OPSDECK_DATABASE_URL")?;

    let defaults = SyncConfig::default();
    let base_url = std::env::var("OPSDECK_HUBSPOT_BASE_URL")
        .unwrap_or_else(|_| opsdeck_domain::constants::HUBSPOT_BASE_URL.to_string());

    let pacing_ms = env_parse("OPSDECK_SYNC_PACING_MS", defaults.pacing_ms)?;
    let max_retries = env_parse("OPSDECK_SYNC_MAX_RETRIES", defaults.max_retries)?;
    let request_timeout_secs =
        env_parse("OPSDECK_SYNC_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;

    Ok(Config {
        hubspot: HubSpotConfig { api_token, base_url },
        database: DatabaseConfig { url: database_url },
        sync: SyncConfig { pacing_ms, max_retries, request_timeout_secs },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `OpsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OpsError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OpsError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OpsError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OpsError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OpsError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OpsError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("opsdeck.json"),
            cwd.join("opsdeck.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("opsdeck.json"),
                exe_dir.join("opsdeck.toml"),
                exe_dir.join("../config.json"),
                exe_dir.join("../config.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| OpsError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| OpsError::Config(format!("Invalid value for {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        for key in [
            "OPSDECK_HUBSPOT_TOKEN",
            "OPSDECK_HUBSPOT_BASE_URL",
            "OPSDECK_DATABASE_URL",
            "OPSDECK_SYNC_PACING_MS",
            "OPSDECK_SYNC_MAX_RETRIES",
            "OPSDECK_SYNC_REQUEST_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn load_from_env_with_all_vars() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSDECK_HUBSPOT_TOKEN", "pat-test-token");
        std::env::set_var("OPSDECK_DATABASE_URL", "postgres://localhost/opsdeck");
        std::env::set_var("OPSDECK_SYNC_PACING_MS", "250");
        std::env::set_var("OPSDECK_SYNC_MAX_RETRIES", "5");

        let config = load_from_env().expect("loads from env");
        assert_eq!(config.hubspot.api_token, "pat-test-token");
        assert_eq!(config.database.url, "postgres://localhost/opsdeck");
        assert_eq!(config.sync.pacing_ms, 250);
        assert_eq!(config.sync.max_retries, 5);
        // Unset optional vars fall back to defaults
        assert_eq!(config.sync.request_timeout_secs, 30);
        assert_eq!(config.hubspot.base_url, "https://api.hubapi.com");

        clear_env();
    }

    #[test]
    fn load_from_env_missing_token_fails() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSDECK_DATABASE_URL", "postgres://localhost/opsdeck");

        let err = load_from_env().expect_err("missing token must fail");
        assert!(matches!(err, OpsError::Config(_)));

        clear_env();
    }

    #[test]
    fn load_from_env_invalid_number_fails() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("OPSDECK_HUBSPOT_TOKEN", "pat-test-token");
        std::env::set_var("OPSDECK_DATABASE_URL", "postgres://localhost/opsdeck");
        std::env::set_var("OPSDECK_SYNC_PACING_MS", "not-a-number");

        let err = load_from_env().expect_err("invalid pacing must fail");
        assert!(matches!(err, OpsError::Config(_)));

        clear_env();
    }

    #[test]
    fn load_from_file_json() {
        let json_content = r#"{
            "hubspot": {
                "api_token": "pat-file-token"
            },
            "database": {
                "url": "postgres://localhost/opsdeck"
            },
            "sync": {
                "pacing_ms": 200
            }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("loads from JSON file");
        assert_eq!(config.hubspot.api_token, "pat-file-token");
        assert_eq!(config.hubspot.base_url, "https://api.hubapi.com");
        assert_eq!(config.sync.pacing_ms, 200);
        assert_eq!(config.sync.max_retries, 3);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_toml() {
        let toml_content = r#"
[hubspot]
api_token = "pat-file-token"
base_url = "http://localhost:9000"

[database]
url = "postgres://localhost/opsdeck"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("loads from TOML file");
        assert_eq!(config.hubspot.base_url, "http://localhost:9000");
        assert_eq!(config.database.url, "postgres://localhost/opsdeck");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json")))
            .expect_err("missing file must fail");
        assert!(matches!(err, OpsError::Config(_)));
    }

    #[test]
    fn parse_config_rejects_unknown_extension() {
        let err = parse_config("anything", &PathBuf::from("config.yaml"))
            .expect_err("yaml is unsupported");
        assert!(matches!(err, OpsError::Config(_)));
    }
}
