//! Application configuration storage
//!
//! Handles persistent storage of backend selection, per-backend connection
//! settings and generation parameters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use inference::{BackendConfig, GenerationParams};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::{defaults, paths};

/// Full application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registry name of the backend to use ("gemini", "openai-compat")
    #[serde(default = "default_backend")]
    pub active_backend: String,
    /// Connection settings keyed by backend name
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
    /// Sampling parameters sent with every request
    #[serde(default)]
    pub generation: GenerationParams,
    /// Deadline for a single generation call in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Interval between progress messages in milliseconds
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,
    /// Name used for exported documents and archives
    #[serde(default)]
    pub project_name: Option<String>,
}

fn default_backend() -> String {
    inference::constants::defaults::BACKEND.to_string()
}

fn default_request_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

fn default_progress_interval() -> u64 {
    defaults::PROGRESS_INTERVAL_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            active_backend: default_backend(),
            backends: BTreeMap::new(),
            generation: GenerationParams::default(),
            request_timeout_secs: default_request_timeout(),
            progress_interval_ms: default_progress_interval(),
            project_name: None,
        }
    }
}

impl AppConfig {
    /// Platform data directory for SiteCraft, if one exists
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(paths::APP_DIR))
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the defaults.
    pub async fn load(app_data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = app_data_dir.join(paths::CONFIG_FILE);

        if !fs::try_exists(&config_path).await? {
            log::debug!("No configuration at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).await?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, app_data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(app_data_dir).await?;

        let config_path = app_data_dir.join(paths::CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents).await?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Connection settings for a backend (defaults if none stored)
    pub fn backend_config(&self, name: &str) -> BackendConfig {
        self.backends.get(name).cloned().unwrap_or_default()
    }

    pub fn set_backend_config(&mut self, name: &str, config: BackendConfig) {
        self.backends.insert(name.to_string(), config);
    }

    /// Fill in an API key for a backend unless one is already stored
    pub fn apply_api_key(&mut self, name: &str, api_key: &str) {
        let entry = self.backends.entry(name.to_string()).or_default();
        if entry.api_key().is_none() {
            entry.api_key = Some(api_key.to_string());
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
