//! Shared helpers for infra integration tests.

use recap_domain::{ProviderConfig, StorageConfig};

pub fn provider_config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        api_key: "test-key".to_string(),
        bot_name: "Recap Bot".to_string(),
    }
}

pub fn storage_config(blob_endpoint: &str, token: Option<&str>) -> StorageConfig {
    StorageConfig {
        state_dir: "/unused".to_string(),
        work_dir: "/unused".to_string(),
        blob_endpoint: blob_endpoint.to_string(),
        blob_token: token.map(|t| t.to_string()),
    }
}
