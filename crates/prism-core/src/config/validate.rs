//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_secs must be > 0".into(),
            ));
        }
        if self.llm.api_version.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.api_version must not be empty".into(),
            ));
        }
        if self.llm.api_version_long.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.api_version_long must not be empty".into(),
            ));
        }
        if !self.llm.endpoint.is_empty() && !self.llm.endpoint.starts_with("http") {
            return Err(ConfigError::ValidationError(
                "llm.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.storage.download_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.download_dir must not be empty".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
