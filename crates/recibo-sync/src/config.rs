//! Configuration for the sync layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sync-side settings: local database and remote API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Remote receipt API settings.
    pub api: ApiConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("recibo.db"),
            api: ApiConfig::default(),
        }
    }
}

/// Remote API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote receipt store.
    pub base_url: String,

    /// API key sent as `x-api-key`, when required by the deployment.
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://api.example.com"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.database_path, PathBuf::from("recibo.db"));
        assert!(config.api.api_key.is_none());
    }
}
