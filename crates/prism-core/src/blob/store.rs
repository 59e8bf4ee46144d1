//! Blob store trait definition.

use crate::error::StoreError;
use async_trait::async_trait;

/// Trait for pluggable blob storage backends.
///
/// A backend is a key/value byte store addressed by `(container, blob_name)`
/// supporting existence checks, create-with-no-overwrite (fails if present),
/// overwrite, read-all, and full key enumeration. Implementations own their
/// transport; each operation is a single logical round trip.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the gateway holds an `Arc<dyn BlobStore>`).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Canonical URL of a blob, whether or not it exists. Never carries a
    /// query string.
    fn blob_url(&self, container: &str, blob_name: &str) -> String;

    /// Whether the blob exists.
    async fn exists(&self, container: &str, blob_name: &str) -> Result<bool, StoreError>;

    /// Write a blob. With `overwrite = false` the write must fail with
    /// [`StoreError::AlreadyExists`] if the blob is present.
    async fn put(
        &self,
        container: &str,
        blob_name: &str,
        content: &[u8],
        overwrite: bool,
    ) -> Result<(), StoreError>;

    /// Read a blob's full contents.
    async fn get(&self, container: &str, blob_name: &str) -> Result<Vec<u8>, StoreError>;

    /// Enumerate every blob name in a container. Implementations must
    /// exhaust backend pagination before returning.
    async fn list(&self, container: &str) -> Result<Vec<String>, StoreError>;
}
