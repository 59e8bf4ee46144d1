//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Service endpoint, e.g. "https://myaccount.openai.azure.com"
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Deployment name for short-output requests
    pub deployment: String,

    /// Deployment name for long-output requests
    pub deployment_long: String,

    /// API version for short-output requests
    pub api_version: String,

    /// API version pin for long-output requests. Callers selecting long
    /// mode target this version explicitly.
    pub api_version_long: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: "${AZURE_OPENAI_API_KEY}".to_string(),
            deployment: "gpt-4o".to_string(),
            deployment_long: "gpt-4o-long".to_string(),
            api_version: "2024-06-01".to_string(),
            api_version_long: "2024-10-01-preview".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage account name
    pub account_name: String,

    /// Storage account key (supports ${ENV_VAR} syntax). Base64, as issued
    /// by the storage service.
    pub account_key: String,

    /// Endpoint override (for Azurite). Empty uses the public endpoint
    /// derived from the account name.
    pub endpoint: String,

    /// Default container for uploads
    pub container_name: String,

    /// Local directory downloads are written into (supports ~ expansion)
    pub download_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            account_key: "${BLOB_ACCOUNT_KEY}".to_string(),
            endpoint: String::new(),
            container_name: "documents".to_string(),
            download_dir: "data".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
