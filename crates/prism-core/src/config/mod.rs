//! Configuration management for Prism.
//!
//! Configuration is loaded from a TOML file with sensible defaults. There is
//! no ambient global: the loaded [`Config`] is constructed once at process
//! start and handed by reference into each component's constructor.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Prism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion backend settings
    pub llm: LlmConfig,

    /// Blob storage settings
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.resolve_secrets();
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// ~/.prism/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "prism", "prism")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".prism").join("config.toml")
            })
    }

    /// Get the resolved download directory path (with ~ expansion).
    pub fn download_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.storage.download_dir);
        PathBuf::from(expanded.into_owned())
    }

    /// Resolve `${ENV_VAR}` references in credential fields.
    fn resolve_secrets(&mut self) {
        if let Some(key) = resolve_env_var(&self.llm.api_key) {
            self.llm.api_key = key;
        }
        if let Some(key) = resolve_env_var(&self.storage.account_key) {
            self.storage.account_key = key;
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
