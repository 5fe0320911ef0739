//! Combined application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use recibo_core::ReciboConfig;
use recibo_sync::SyncConfig;

/// The full configuration file: core pipeline sections plus sync settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub core: ReciboConfig,

    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recibo")
        .join("config.json")
}

/// Load from an explicit path, the default path, or defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return Ok(AppConfig::from_file(Path::new(path))?);
    }
    let default_path = default_config_path();
    if default_path.exists() {
        return Ok(AppConfig::from_file(&default_path)?);
    }
    Ok(AppConfig::default())
}
