//! Blob upload/download gateway.
//!
//! The gateway wraps a pluggable [`BlobStore`] backend with the upload
//! decision policy (skip / overwrite / reject), SAS token issuance, and
//! download classification. Every gateway operation is total: failures are
//! converted to a terminal outcome plus a log record, never a panic or a
//! propagated error.

mod azure;
mod gateway;
mod sas;
mod store;

pub use azure::AzureBlobStore;
pub use gateway::{BlobGateway, FileRecord, UploadOptions, UploadOutcome, UploadStatus};
pub use sas::{SasSigner, SasToken};
pub use store::BlobStore;
