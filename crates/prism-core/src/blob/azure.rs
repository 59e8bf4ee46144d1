//! Azure Blob Storage backend over the REST API.
//!
//! Talks to the storage service directly with `reqwest`, authenticating each
//! call with a freshly minted service SAS scoped to the operation. The
//! endpoint is derived from the account name and can be overridden for a
//! local emulator.

use super::sas::{SasResource, SasSigner, SAS_VERSION};
use super::store::BlobStore;
use crate::config::StorageConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};

/// Path characters escaped in blob URLs. Mirrors the URL path set: the
/// segment separator `/` stays literal.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct AzureBlobStore {
    endpoint: String,
    signer: SasSigner,
    client: reqwest::Client,
}

impl AzureBlobStore {
    pub fn new(config: &StorageConfig) -> Self {
        let endpoint = if config.endpoint.is_empty() {
            format!("https://{}.blob.core.windows.net", config.account_name)
        } else {
            config.endpoint.trim_end_matches('/').to_string()
        };
        Self {
            endpoint,
            signer: SasSigner::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// URL for one blob, authenticated with a per-call SAS.
    fn signed_url(
        &self,
        container: &str,
        blob_name: &str,
        permissions: &str,
    ) -> Result<String, StoreError> {
        let token = self.signer.mint_at(
            SasResource::Blob,
            container,
            blob_name,
            permissions,
            chrono::Utc::now(),
        )?;
        Ok(format!(
            "{}?{}",
            self.blob_url(container, blob_name),
            token.query_string()
        ))
    }

    fn transport(e: reqwest::Error) -> StoreError {
        StoreError::Transport {
            message: e.to_string(),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    fn name(&self) -> &str {
        "azure-blob"
    }

    fn blob_url(&self, container: &str, blob_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            container,
            utf8_percent_encode(blob_name, PATH)
        )
    }

    async fn exists(&self, container: &str, blob_name: &str) -> Result<bool, StoreError> {
        let url = self.signed_url(container, blob_name, "r")?;
        let response = self
            .client
            .head(&url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .map_err(Self::transport)?;

        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(StoreError::Transport {
                message: format!("existence probe returned HTTP {status}"),
                status_code: Some(status),
            }),
        }
    }

    async fn put(
        &self,
        container: &str,
        blob_name: &str,
        content: &[u8],
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let url = self.signed_url(container, blob_name, "cw")?;
        let mut request = self
            .client
            .put(&url)
            .header("x-ms-version", SAS_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .body(content.to_vec());
        if !overwrite {
            // Create-only: the service refuses the write if the blob exists
            request = request.header("If-None-Match", "*");
        }

        let response = request.send().await.map_err(Self::transport)?;
        let status = response.status();
        match status.as_u16() {
            201 => Ok(()),
            409 | 412 => Err(StoreError::AlreadyExists {
                blob_name: blob_name.to_string(),
            }),
            404 => Err(StoreError::NotFound {
                name: format!("{container}/{blob_name}"),
            }),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Transport {
                    message: format!("upload returned HTTP {status}: {body}"),
                    status_code: Some(code),
                })
            }
        }
    }

    async fn get(&self, container: &str, blob_name: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.signed_url(container, blob_name, "r")?;
        let response = self
            .client
            .get(&url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .map_err(Self::transport)?;

        let status = response.status();
        match status.as_u16() {
            200 => Ok(response.bytes().await.map_err(Self::transport)?.to_vec()),
            404 => Err(StoreError::NotFound {
                name: format!("{container}/{blob_name}"),
            }),
            code => Err(StoreError::Transport {
                message: format!("download returned HTTP {status}"),
                status_code: Some(code),
            }),
        }
    }

    async fn list(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let token = self.signer.mint_at(
            SasResource::Container,
            container,
            "",
            "l",
            chrono::Utc::now(),
        )?;

        // The flat-listing endpoint is paginated; a full enumeration has to
        // chase continuation markers one page at a time.
        let mut names = Vec::new();
        let mut marker = String::new();
        loop {
            let mut url = format!(
                "{}/{}?restype=container&comp=list&{}",
                self.endpoint,
                container,
                token.query_string()
            );
            if !marker.is_empty() {
                // Markers derive from blob names and can carry reserved
                // characters
                url.push_str("&marker=");
                url.push_str(&utf8_percent_encode(&marker, NON_ALPHANUMERIC).to_string());
            }

            let response = self
                .client
                .get(&url)
                .header("x-ms-version", SAS_VERSION)
                .send()
                .await
                .map_err(Self::transport)?;

            let status = response.status();
            if status.as_u16() == 404 {
                return Err(StoreError::NotFound {
                    name: container.to_string(),
                });
            }
            if !status.is_success() {
                return Err(StoreError::Transport {
                    message: format!("listing returned HTTP {status}"),
                    status_code: Some(status.as_u16()),
                });
            }

            let body = response.text().await.map_err(Self::transport)?;
            names.extend(extract_tag_values(&body, "Name"));
            marker = extract_tag_values(&body, "NextMarker")
                .into_iter()
                .find(|m| !m.is_empty())
                .unwrap_or_default();
            if marker.is_empty() {
                return Ok(names);
            }
        }
    }
}

/// Pull the text of every `<tag>…</tag>` out of a listing response.
///
/// The enumeration body is a flat XML list of `<Blob><Name>…</Name></Blob>`
/// entries plus an optional `<NextMarker>`; a tag scan plus entity decoding
/// is all it takes.
fn extract_tag_values(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut values = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        match after.find(&close) {
            Some(end) => {
                values.push(unescape_xml(&after[..end]));
                rest = &after[end + close.len()..];
            }
            None => break,
        }
    }
    values
}

/// Decode the five predefined XML entities. Blob names containing `&` and
/// friends arrive escaped in the listing body; leaving them escaped yields
/// names that 404 on the next request.
fn unescape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (decoded, len) = if rest.starts_with("&amp;") {
            ("&", 5)
        } else if rest.starts_with("&lt;") {
            ("<", 4)
        } else if rest.starts_with("&gt;") {
            (">", 4)
        } else if rest.starts_with("&quot;") {
            ("\"", 6)
        } else if rest.starts_with("&apos;") {
            ("'", 6)
        } else {
            // Bare ampersand, not a recognized entity
            ("&", 1)
        };
        out.push_str(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}
