//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `RECAP_PROVIDER_BASE_URL`: Recording provider API base URL
//! - `RECAP_PROVIDER_API_KEY`: Recording provider API key
//! - `RECAP_BOT_NAME`: Display name for scheduled bots (optional)
//! - `RECAP_OAUTH_CLIENT_ID`: Calendar OAuth client id
//! - `RECAP_OAUTH_CLIENT_SECRET`: Calendar OAuth client secret
//! - `RECAP_OAUTH_TOKEN_ENDPOINT`: Token refresh endpoint
//! - `RECAP_TOKEN_DIR`: Directory of per-user token documents
//! - `RECAP_STATE_DIR`: Directory of per-user state documents
//! - `RECAP_WORK_DIR`: Scratch directory for downloads and transcodes
//! - `RECAP_BLOB_ENDPOINT`: Object-store gateway endpoint
//! - `RECAP_BLOB_TOKEN`: Object-store bearer token (optional)
//! - `RECAP_LOOKAHEAD_DAYS`: Calendar sync window in days (optional)
//! - `RECAP_ORPHAN_THRESHOLD_HOURS`: Orphan probe threshold (optional)
//! - `RECAP_SYNC_CRON`: Cron expression for the periodic pass (optional)
//! - `RECAP_RUN_ON_START`: Run one pass at startup (optional, default true)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `recap.{json,toml}` in the
//! current directory, up to two parent directories, and next to the
//! executable.

use std::path::{Path, PathBuf};

use recap_domain::constants::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_ORPHAN_THRESHOLD_HOURS};
use recap_domain::{
    EngineConfig, OauthConfig, ProviderConfig, RecapConfig, RecapError, Result, StorageConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RecapError::Config` if configuration cannot be loaded from either
/// source.
pub fn load() -> Result<RecapConfig> {
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
/// All required environment variables must be present.
///
/// # Errors
/// Returns `RecapError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<RecapConfig> {
    let provider = ProviderConfig {
        base_url: env_var("RECAP_PROVIDER_BASE_URL")?,
        api_key: env_var("RECAP_PROVIDER_API_KEY")?,
        bot_name: std::env::var("RECAP_BOT_NAME")
            .unwrap_or_else(|_| recap_domain::constants::DEFAULT_BOT_NAME.to_string()),
    };

    let oauth = OauthConfig {
        client_id: env_var("RECAP_OAUTH_CLIENT_ID")?,
        client_secret: env_var("RECAP_OAUTH_CLIENT_SECRET")?,
        token_endpoint: env_var("RECAP_OAUTH_TOKEN_ENDPOINT")?,
        token_dir: env_var("RECAP_TOKEN_DIR")?,
    };

    let storage = StorageConfig {
        state_dir: env_var("RECAP_STATE_DIR")?,
        work_dir: env_var("RECAP_WORK_DIR")?,
        blob_endpoint: env_var("RECAP_BLOB_ENDPOINT")?,
        blob_token: std::env::var("RECAP_BLOB_TOKEN").ok(),
    };

    let engine = EngineConfig {
        lookahead_days: env_i64("RECAP_LOOKAHEAD_DAYS", DEFAULT_LOOKAHEAD_DAYS)?,
        orphan_threshold_hours: env_i64(
            "RECAP_ORPHAN_THRESHOLD_HOURS",
            DEFAULT_ORPHAN_THRESHOLD_HOURS,
        )?,
        cron_expression: std::env::var("RECAP_SYNC_CRON")
            .unwrap_or_else(|_| recap_domain::constants::DEFAULT_SYNC_CRON.to_string()),
        run_on_start: env_bool("RECAP_RUN_ON_START", true),
    };

    Ok(RecapConfig { provider, oauth, storage, engine })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RecapError::Config` if no file is found or the format is invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<RecapConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RecapError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RecapError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RecapError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<RecapConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RecapError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RecapError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RecapError::Config(format!("Unsupported config format: {extension}"))),
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
            cwd.join("recap.json"),
            cwd.join("recap.toml"),
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
                exe_dir.join("recap.json"),
                exe_dir.join("recap.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| RecapError::Config(format!("Missing required environment variable: {key}")))
}

fn env_i64(key: &str, default: i64) -> Result<i64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|e| RecapError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
