//! Upload/download gateway over a [`BlobStore`] backend.
//!
//! Implements the upload decision policy (skip / overwrite / reject), read
//! SAS issuance for uploaded artifacts, and download classification. Every
//! public operation here is total: faults become an outcome or `None` plus a
//! log record, and never escape to the caller.

use super::sas::SasSigner;
use super::store::BlobStore;
use crate::error::StoreError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Terminal state of one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// `skip_if_existed` was set and a prior blob was found; nothing written.
    Skipped,
    /// The blob was written.
    Uploaded,
    /// The write lost a create race but `skip_if_existed` allowed recovery.
    AlreadyExists,
    /// The write failed; details are in the log.
    Rejected,
}

/// Result of one upload attempt. Produced once per call, never retried here.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub status: UploadStatus,
    pub url: Option<String>,
}

/// Knobs for one upload.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Appended to the logical name to form the blob key.
    pub extension: String,
    /// Replace an existing blob instead of failing the write.
    pub overwrite: bool,
    /// Treat an existing blob as success and return its URL.
    pub skip_if_existed: bool,
    /// When set, mint a read SAS for this path within the container and
    /// append it to the returned URL.
    pub additional_sas_path: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            overwrite: false,
            skip_if_existed: false,
            additional_sas_path: None,
        }
    }
}

/// A downloaded artifact classified into a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub project_name: String,
    /// Full blob name within the container.
    pub file: String,
    pub original_url: String,
    /// File extension, taken from the last `.` segment of the name.
    pub document_type: String,
    /// Local path the bytes were written to.
    pub file_path: PathBuf,
}

pub struct BlobGateway {
    store: Arc<dyn BlobStore>,
    signer: SasSigner,
    download_dir: PathBuf,
}

impl BlobGateway {
    pub fn new(
        store: Arc<dyn BlobStore>,
        signer: SasSigner,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            signer,
            download_dir: download_dir.into(),
        }
    }

    /// Probe for `{name}.{extension}` and return its canonical URL if
    /// present. Transport faults read as absence.
    pub async fn exists(&self, name: &str, container: &str, extension: &str) -> Option<String> {
        let blob_name = format!("{name}.{extension}");
        match self.store.exists(container, &blob_name).await {
            Ok(true) => Some(self.store.blob_url(container, &blob_name)),
            Ok(false) => None,
            Err(e) => {
                warn!(container, blob = %blob_name, error = %e, "existence probe failed");
                None
            }
        }
    }

    /// Upload `content` as `{name}.{extension}`.
    ///
    /// Policy, in order: a proactive skip check when `skip_if_existed` is
    /// set; the write; recovery from a lost create race (again only under
    /// `skip_if_existed`); everything else becomes `Rejected`. The returned
    /// URL carries a read SAS when `additional_sas_path` is supplied —
    /// plain `?` concatenation is safe because the store's canonical URL
    /// never has a query string.
    pub async fn upload(
        &self,
        name: &str,
        container: &str,
        content: &[u8],
        options: &UploadOptions,
    ) -> UploadOutcome {
        let blob_name = format!("{}.{}", name, options.extension);

        if options.skip_if_existed {
            match self.store.exists(container, &blob_name).await {
                Ok(true) => {
                    let url = self.store.blob_url(container, &blob_name);
                    info!(container, blob = %blob_name, "blob already present, skipping upload");
                    return UploadOutcome {
                        status: UploadStatus::Skipped,
                        url: Some(url),
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    // The write itself decides; a failed probe is not fatal.
                    warn!(container, blob = %blob_name, error = %e, "skip check failed");
                }
            }
        }

        let size_mib = content.len() as f64 / (1024.0 * 1024.0);
        debug!(container, blob = %blob_name, size_mib = %format!("{size_mib:.2}"), "uploading blob");

        match self
            .store
            .put(container, &blob_name, content, options.overwrite)
            .await
        {
            Ok(()) => {
                let url = self.store.blob_url(container, &blob_name);
                info!(container, blob = %blob_name, "blob uploaded");
                match &options.additional_sas_path {
                    Some(path) => match self.signer.mint_read_token(container, path) {
                        Ok(token) => UploadOutcome {
                            status: UploadStatus::Uploaded,
                            url: Some(format!("{}?{}", url, token.query_string())),
                        },
                        Err(e) => {
                            error!(container, blob = %blob_name, error = %e, "token minting failed after upload");
                            UploadOutcome {
                                status: UploadStatus::Rejected,
                                url: None,
                            }
                        }
                    },
                    None => UploadOutcome {
                        status: UploadStatus::Uploaded,
                        url: Some(url),
                    },
                }
            }
            Err(StoreError::AlreadyExists { .. }) if options.skip_if_existed => {
                let url = self.store.blob_url(container, &blob_name);
                info!(container, blob = %blob_name, "lost create race, keeping existing blob");
                UploadOutcome {
                    status: UploadStatus::AlreadyExists,
                    url: Some(url),
                }
            }
            Err(e @ StoreError::AlreadyExists { .. }) => {
                warn!(container, blob = %blob_name, error = %e, "blob exists and overwrite is off, not uploaded");
                UploadOutcome {
                    status: UploadStatus::Rejected,
                    url: None,
                }
            }
            Err(
                e @ (StoreError::NotFound { .. }
                | StoreError::Transport { .. }
                | StoreError::Other { .. }),
            ) => {
                error!(container, blob = %blob_name, error = %e, "upload failed");
                UploadOutcome {
                    status: UploadStatus::Rejected,
                    url: None,
                }
            }
        }
    }

    /// Fetch a blob, write it under the download directory, and classify it
    /// into a project by substring match on the blob name. Names matching
    /// neither project read as `None` even though the file was written.
    /// A missing blob is `None`, not an error.
    pub async fn download(&self, name: &str, container: &str) -> Option<FileRecord> {
        let bytes = match self.store.get(container, name).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound { .. }) => {
                warn!(container, blob = %name, "blob not found");
                return None;
            }
            Err(e) => {
                error!(container, blob = %name, error = %e, "download failed");
                return None;
            }
        };

        let file = name.rsplit('/').next().unwrap_or(name);
        let document_type = name.rsplit('.').next().unwrap_or_default().to_string();
        let file_path = self.download_dir.join(file);
        if let Err(e) = std::fs::create_dir_all(&self.download_dir)
            .and_then(|()| std::fs::write(&file_path, &bytes))
        {
            error!(container, blob = %name, path = %file_path.display(), error = %e, "failed to write downloaded blob");
            return None;
        }
        debug!(container, blob = %name, path = %file_path.display(), "blob downloaded");

        let project_name = if name.contains("cds") {
            "cds wiki"
        } else if name.contains("Toll Gates") {
            "toll gates"
        } else {
            return None;
        };

        Some(FileRecord {
            project_name: project_name.to_string(),
            file: name.to_string(),
            original_url: self.store.blob_url(container, name),
            document_type,
            file_path,
        })
    }

    /// Enumerate every blob name in a container. Faults read as empty.
    pub async fn list_files(&self, container: &str) -> Vec<String> {
        match self.store.list(container).await {
            Ok(names) => names,
            Err(e) => {
                error!(container, error = %e, "listing failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum FailMode {
        None,
        Transport,
        Other,
    }

    /// In-memory store. `hide_from_exists` makes the existence probe miss
    /// while `put` still sees the blob, simulating a lost create race.
    struct MemoryStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        put_calls: AtomicU32,
        fail: FailMode,
        hide_from_exists: bool,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
                put_calls: AtomicU32::new(0),
                fail: FailMode::None,
                hide_from_exists: false,
            }
        }

        fn failing(fail: FailMode) -> Self {
            Self {
                fail,
                ..Self::new()
            }
        }

        fn key(container: &str, blob_name: &str) -> String {
            format!("{container}/{blob_name}")
        }

        fn fault(&self) -> Option<StoreError> {
            match self.fail {
                FailMode::None => None,
                FailMode::Transport => Some(StoreError::Transport {
                    message: "connection reset".to_string(),
                    status_code: Some(500),
                }),
                FailMode::Other => Some(StoreError::Other {
                    message: "unclassified".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl BlobStore for MemoryStore {
        fn name(&self) -> &str {
            "memory"
        }

        fn blob_url(&self, container: &str, blob_name: &str) -> String {
            format!("https://mem.example/{container}/{blob_name}")
        }

        async fn exists(&self, container: &str, blob_name: &str) -> Result<bool, StoreError> {
            if let Some(e) = self.fault() {
                return Err(e);
            }
            if self.hide_from_exists {
                return Ok(false);
            }
            Ok(self
                .blobs
                .lock()
                .unwrap()
                .contains_key(&Self::key(container, blob_name)))
        }

        async fn put(
            &self,
            container: &str,
            blob_name: &str,
            content: &[u8],
            overwrite: bool,
        ) -> Result<(), StoreError> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(e) = self.fault() {
                return Err(e);
            }
            let mut blobs = self.blobs.lock().unwrap();
            let key = Self::key(container, blob_name);
            if !overwrite && blobs.contains_key(&key) {
                return Err(StoreError::AlreadyExists {
                    blob_name: blob_name.to_string(),
                });
            }
            blobs.insert(key, content.to_vec());
            Ok(())
        }

        async fn get(&self, container: &str, blob_name: &str) -> Result<Vec<u8>, StoreError> {
            if let Some(e) = self.fault() {
                return Err(e);
            }
            self.blobs
                .lock()
                .unwrap()
                .get(&Self::key(container, blob_name))
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    name: format!("{container}/{blob_name}"),
                })
        }

        async fn list(&self, container: &str) -> Result<Vec<String>, StoreError> {
            if let Some(e) = self.fault() {
                return Err(e);
            }
            let prefix = format!("{container}/");
            let mut names: Vec<String> = self
                .blobs
                .lock()
                .unwrap()
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
                .collect();
            names.sort();
            Ok(names)
        }
    }

    fn signer() -> SasSigner {
        let config = StorageConfig {
            account_name: "prismstore".to_string(),
            account_key: "cHJpc20tdGVzdC1hY2NvdW50LWtleQ==".to_string(),
            ..StorageConfig::default()
        };
        SasSigner::new(&config)
    }

    fn gateway_over(store: MemoryStore) -> (BlobGateway, Arc<MemoryStore>, tempfile::TempDir) {
        let store = Arc::new(store);
        let dir = tempfile::tempdir().unwrap();
        let gateway = BlobGateway::new(store.clone(), signer(), dir.path());
        (gateway, store, dir)
    }

    #[tokio::test]
    async fn test_upload_then_exists_round_trip() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::new());
        let options = UploadOptions {
            overwrite: true,
            ..UploadOptions::default()
        };

        assert!(gateway.exists("report", "docs", "txt").await.is_none());

        let outcome = gateway.upload("report", "docs", b"body", &options).await;
        assert_eq!(outcome.status, UploadStatus::Uploaded);
        assert_eq!(
            outcome.url.as_deref(),
            Some("https://mem.example/docs/report.txt")
        );

        let url = gateway.exists("report", "docs", "txt").await;
        assert_eq!(url.as_deref(), Some("https://mem.example/docs/report.txt"));
    }

    #[tokio::test]
    async fn test_skip_if_existed_writes_once() {
        let (gateway, store, _dir) = gateway_over(MemoryStore::new());
        let options = UploadOptions {
            skip_if_existed: true,
            ..UploadOptions::default()
        };

        let first = gateway.upload("report", "docs", b"body", &options).await;
        assert_eq!(first.status, UploadStatus::Uploaded);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 1);

        let second = gateway.upload("report", "docs", b"body", &options).await;
        assert_eq!(second.status, UploadStatus::Skipped);
        assert_eq!(second.url, first.url);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skip_if_existed_never_writes_over_preexisting_blob() {
        let store = MemoryStore::new();
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/report.txt".to_string(), b"prior".to_vec());
        let (gateway, store, _dir) = gateway_over(store);

        let options = UploadOptions {
            skip_if_existed: true,
            ..UploadOptions::default()
        };
        let first = gateway.upload("report", "docs", b"body", &options).await;
        let second = gateway.upload("report", "docs", b"body", &options).await;

        assert_eq!(first.status, UploadStatus::Skipped);
        assert_eq!(second.status, UploadStatus::Skipped);
        assert_eq!(first.url.as_deref(), Some("https://mem.example/docs/report.txt"));
        assert_eq!(second.url, first.url);
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_existing_blob_without_skip_is_rejected() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::new());
        let overwrite = UploadOptions {
            overwrite: true,
            ..UploadOptions::default()
        };
        gateway.upload("report", "docs", b"v1", &overwrite).await;

        let outcome = gateway
            .upload("report", "docs", b"v2", &UploadOptions::default())
            .await;
        assert_eq!(outcome.status, UploadStatus::Rejected);
        assert!(outcome.url.is_none());
    }

    #[tokio::test]
    async fn test_create_race_recovers_under_skip_policy() {
        let mut store = MemoryStore::new();
        store.hide_from_exists = true;
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/report.txt".to_string(), b"prior".to_vec());
        let (gateway, _, _dir) = gateway_over(store);

        let options = UploadOptions {
            skip_if_existed: true,
            ..UploadOptions::default()
        };
        let outcome = gateway.upload("report", "docs", b"body", &options).await;
        assert_eq!(outcome.status, UploadStatus::AlreadyExists);
        assert_eq!(
            outcome.url.as_deref(),
            Some("https://mem.example/docs/report.txt")
        );
    }

    #[tokio::test]
    async fn test_additional_sas_path_appends_read_token() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::new());
        let options = UploadOptions {
            additional_sas_path: Some("report.txt".to_string()),
            ..UploadOptions::default()
        };

        let outcome = gateway.upload("report", "docs", b"body", &options).await;
        assert_eq!(outcome.status, UploadStatus::Uploaded);
        let url = outcome.url.unwrap();
        assert!(url.starts_with("https://mem.example/docs/report.txt?"));
        assert!(url.contains("sp=rl"));
        assert!(url.contains("sig="));
    }

    #[tokio::test]
    async fn test_transport_fault_is_rejected_not_raised() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::failing(FailMode::Transport));
        let outcome = gateway
            .upload("report", "docs", b"body", &UploadOptions::default())
            .await;
        assert_eq!(outcome.status, UploadStatus::Rejected);
        assert!(outcome.url.is_none());
    }

    #[tokio::test]
    async fn test_unclassified_fault_is_rejected_not_raised() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::failing(FailMode::Other));
        let outcome = gateway
            .upload("report", "docs", b"body", &UploadOptions::default())
            .await;
        assert_eq!(outcome.status, UploadStatus::Rejected);
    }

    #[tokio::test]
    async fn test_exists_swallows_transport_fault() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::failing(FailMode::Transport));
        assert!(gateway.exists("report", "docs", "txt").await.is_none());
    }

    #[tokio::test]
    async fn test_download_classifies_and_writes_file() {
        let store = MemoryStore::new();
        store.blobs.lock().unwrap().insert(
            "docs/cds/notes/page.png".to_string(),
            vec![1u8, 2, 3],
        );
        let (gateway, _, dir) = gateway_over(store);

        let record = gateway.download("cds/notes/page.png", "docs").await.unwrap();
        assert_eq!(record.project_name, "cds wiki");
        assert_eq!(record.file, "cds/notes/page.png");
        assert_eq!(record.document_type, "png");
        assert_eq!(record.file_path, dir.path().join("page.png"));
        assert_eq!(std::fs::read(&record.file_path).unwrap(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_download_toll_gates_project() {
        let store = MemoryStore::new();
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/Toll Gates/r.pdf".to_string(), b"pdf".to_vec());
        let (gateway, _, _dir) = gateway_over(store);

        let record = gateway.download("Toll Gates/r.pdf", "docs").await.unwrap();
        assert_eq!(record.project_name, "toll gates");
    }

    #[tokio::test]
    async fn test_download_unmatched_name_writes_but_returns_none() {
        let store = MemoryStore::new();
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/misc/other.txt".to_string(), b"x".to_vec());
        let (gateway, _, dir) = gateway_over(store);

        assert!(gateway.download("misc/other.txt", "docs").await.is_none());
        // The write happens before classification
        assert!(dir.path().join("other.txt").exists());
    }

    #[tokio::test]
    async fn test_download_missing_blob_is_none() {
        let (gateway, _, _dir) = gateway_over(MemoryStore::new());
        assert!(gateway.download("ghost.txt", "docs").await.is_none());
    }

    #[tokio::test]
    async fn test_list_files_and_fault_fallback() {
        let store = MemoryStore::new();
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/a.txt".to_string(), Vec::new());
        store
            .blobs
            .lock()
            .unwrap()
            .insert("docs/b.txt".to_string(), Vec::new());
        let (gateway, _, _dir) = gateway_over(store);
        assert_eq!(gateway.list_files("docs").await, vec!["a.txt", "b.txt"]);

        let (broken, _, _dir2) = gateway_over(MemoryStore::failing(FailMode::Transport));
        assert!(broken.list_files("docs").await.is_empty());
    }
}
