//! Configuration structures for the reconciliation engine.
//!
//! Loaded by `recap-infra`'s config loader from environment variables or a
//! TOML/JSON file; see that module for the loading strategy.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOT_NAME, DEFAULT_LOOKAHEAD_DAYS, DEFAULT_ORPHAN_THRESHOLD_HOURS, DEFAULT_SYNC_CRON,
};

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapConfig {
    pub provider: ProviderConfig,
    pub oauth: OauthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Recording/calendar provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API (e.g. `https://us-west-2.recall.ai/api/v2`).
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

/// OAuth settings used to refresh per-user calendar credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_endpoint: String,
    /// Directory holding one `{user_id}.json` token document per user.
    pub token_dir: String,
}

/// Filesystem and blob-store locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one persisted `UserSyncState` document per user.
    pub state_dir: String,
    /// Scratch directory for downloaded/transcoded artifacts.
    pub work_dir: String,
    /// Object-store gateway endpoint, including the bucket path segment.
    pub blob_endpoint: String,
    #[serde(default)]
    pub blob_token: Option<String>,
}

/// Reconciliation pass tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: i64,
    #[serde(default = "default_orphan_threshold_hours")]
    pub orphan_threshold_hours: i64,
    /// Cron expression driving the periodic all-users pass.
    #[serde(default = "default_sync_cron")]
    pub cron_expression: String,
    /// Run one pass immediately at scheduler start.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            orphan_threshold_hours: DEFAULT_ORPHAN_THRESHOLD_HOURS,
            cron_expression: DEFAULT_SYNC_CRON.to_string(),
            run_on_start: true,
        }
    }
}

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_lookahead_days() -> i64 {
    DEFAULT_LOOKAHEAD_DAYS
}

fn default_orphan_threshold_hours() -> i64 {
    DEFAULT_ORPHAN_THRESHOLD_HOURS
}

fn default_sync_cron() -> String {
    DEFAULT_SYNC_CRON.to_string()
}

fn default_true() -> bool {
    true
}
