//! Error types for the Prism extraction gateway.
//!
//! Errors are organized by subsystem: configuration, completion invocation,
//! and blob storage. Invocation and store errors carry the HTTP status code
//! of the backend response where one exists, so callers can classify faults
//! without parsing messages.

use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Completion invocation errors
    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    /// Blob store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while building or submitting a completion request.
#[derive(Error, Debug)]
pub enum InvocationError {
    /// Downloading the image behind a remote reference returned non-2xx.
    /// Fatal for the whole request: there is no sane default image.
    #[error("Image fetch failed for {url}: HTTP {status}")]
    FetchFailure { url: String, status: u16 },

    /// The backend answered, but the response body did not match the
    /// expected completion shape.
    #[error("Backend response failed validation: {message}")]
    ValidationFailed { message: String },

    /// Transport-level failure talking to the completion backend.
    #[error("Backend transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },
}

/// Errors reported by a blob store backend.
///
/// The gateway converts every variant into a terminal outcome; these only
/// cross a public boundary through the [`BlobStore`](crate::blob::BlobStore)
/// trait itself.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Create-with-no-overwrite hit an existing blob.
    #[error("Blob already exists: {blob_name}")]
    AlreadyExists { blob_name: String },

    /// Container or blob not found.
    #[error("Container or blob not found: {name}")]
    NotFound { name: String },

    /// Backend-reported transport fault.
    #[error("Store transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// Anything outside the backend's own error taxonomy.
    #[error("Unclassified store error: {message}")]
    Other { message: String },
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;
