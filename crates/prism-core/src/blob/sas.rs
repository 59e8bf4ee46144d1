//! Service SAS token minting.
//!
//! A SAS token is a time-boxed, permission-scoped signed credential granting
//! access to one storage object without sharing account keys. The signature
//! is HMAC-SHA256 over the service string-to-sign, keyed with the
//! base64-decoded account key.

use crate::config::StorageConfig;
use crate::error::StoreError;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signed storage service version.
pub(crate) const SAS_VERSION: &str = "2022-11-02";

/// Start time is backdated to absorb clock drift between this host and the
/// storage service; without it a token can be rejected as not-yet-valid.
const CLOCK_SKEW: Duration = Duration::seconds(60);

/// Tokens are valid for one hour from their (backdated) start.
const VALIDITY: Duration = Duration::seconds(3600);

/// What a token is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SasResource {
    Blob,
    Container,
}

impl SasResource {
    fn signed_resource(self) -> &'static str {
        match self {
            Self::Blob => "b",
            Self::Container => "c",
        }
    }
}

/// A minted SAS token. Generated fresh per request; never cached.
#[derive(Debug, Clone)]
pub struct SasToken {
    query: String,
    /// Validity window start (now − 60s)
    pub start: DateTime<Utc>,
    /// Validity window end (start + 1h)
    pub expiry: DateTime<Utc>,
    /// Permission letters in service order, e.g. `"rl"`
    pub permissions: String,
}

impl SasToken {
    /// The token as a URL query string (no leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query
    }
}

/// Mints service SAS tokens for one storage account.
///
/// Pure function of current time plus static account credentials; holds no
/// transport state.
#[derive(Debug, Clone)]
pub struct SasSigner {
    account_name: String,
    account_key: String,
}

impl SasSigner {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            account_name: config.account_name.clone(),
            account_key: config.account_key.clone(),
        }
    }

    /// Mint a read+list token for one container+blob pair, valid from
    /// now − 60s for one hour.
    ///
    /// The blob name is percent-decoded before signing: the signing
    /// primitive expects the raw (unescaped) name even when the public URL
    /// carries the escaped form.
    pub fn mint_read_token(
        &self,
        container: &str,
        blob_name: &str,
    ) -> Result<SasToken, StoreError> {
        self.mint_at(SasResource::Blob, container, blob_name, "rl", Utc::now())
    }

    /// Mint a token with explicit permissions at a given time. The time
    /// parameter keeps the signature deterministic under test.
    pub(crate) fn mint_at(
        &self,
        resource: SasResource,
        container: &str,
        blob_name: &str,
        permissions: &str,
        now: DateTime<Utc>,
    ) -> Result<SasToken, StoreError> {
        let start = now - CLOCK_SKEW;
        let expiry = start + VALIDITY;
        let start_str = format_time(start);
        let expiry_str = format_time(expiry);

        let blob_name = percent_decode_str(blob_name).decode_utf8_lossy();
        let canonical_resource = match resource {
            SasResource::Blob => {
                format!("/blob/{}/{}/{}", self.account_name, container, blob_name)
            }
            SasResource::Container => format!("/blob/{}/{}", self.account_name, container),
        };

        // Service string-to-sign for version 2022-11-02: permissions, start,
        // expiry, canonicalized resource, identifier, IP, protocol, version,
        // resource, snapshot time, encryption scope, then the five response
        // header overrides.
        let string_to_sign = format!(
            "{permissions}\n{start_str}\n{expiry_str}\n{canonical_resource}\n\n\nhttps\n{SAS_VERSION}\n{}\n\n\n\n\n\n\n",
            resource.signed_resource()
        );

        let key = base64::engine::general_purpose::STANDARD
            .decode(&self.account_key)
            .map_err(|e| StoreError::Other {
                message: format!("account key is not valid base64: {e}"),
            })?;
        let mut mac = HmacSha256::new_from_slice(&key).map_err(|e| StoreError::Other {
            message: format!("failed to key signature: {e}"),
        })?;
        mac.update(string_to_sign.as_bytes());
        let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        let query = format!(
            "sv={SAS_VERSION}&sp={permissions}&sr={}&st={}&se={}&spr=https&sig={}",
            resource.signed_resource(),
            utf8_percent_encode(&start_str, NON_ALPHANUMERIC),
            utf8_percent_encode(&expiry_str, NON_ALPHANUMERIC),
            utf8_percent_encode(&signature, NON_ALPHANUMERIC),
        );

        Ok(SasToken {
            query,
            start,
            expiry,
            permissions: permissions.to_string(),
        })
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> SasSigner {
        let config = StorageConfig {
            account_name: "prismstore".to_string(),
            // base64 of "prism-test-account-key"
            account_key: "cHJpc20tdGVzdC1hY2NvdW50LWtleQ==".to_string(),
            ..StorageConfig::default()
        };
        SasSigner::new(&config)
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_backdated_one_minute_and_one_hour_long() {
        let token = signer()
            .mint_at(SasResource::Blob, "docs", "page.png", "rl", fixed_now())
            .unwrap();

        assert_eq!(token.start, fixed_now() - Duration::seconds(60));
        assert_eq!(token.expiry, token.start + Duration::seconds(3600));
    }

    #[test]
    fn test_read_token_permissions_are_read_and_list_only() {
        let token = signer().mint_read_token("docs", "page.png").unwrap();
        assert_eq!(token.permissions, "rl");
        assert!(token.query_string().contains("sp=rl"));
        assert!(token.query_string().contains("sr=b"));
    }

    #[test]
    fn test_signature_is_deterministic_at_fixed_time() {
        let a = signer()
            .mint_at(SasResource::Blob, "docs", "page.png", "rl", fixed_now())
            .unwrap();
        let b = signer()
            .mint_at(SasResource::Blob, "docs", "page.png", "rl", fixed_now())
            .unwrap();
        assert_eq!(a.query_string(), b.query_string());
    }

    #[test]
    fn test_escaped_and_raw_names_sign_identically() {
        let raw = signer()
            .mint_at(SasResource::Blob, "docs", "dir/page 1.png", "rl", fixed_now())
            .unwrap();
        let escaped = signer()
            .mint_at(
                SasResource::Blob,
                "docs",
                "dir/page%201.png",
                "rl",
                fixed_now(),
            )
            .unwrap();
        assert_eq!(raw.query_string(), escaped.query_string());
    }

    #[test]
    fn test_query_carries_window_and_version() {
        let token = signer()
            .mint_at(SasResource::Blob, "docs", "page.png", "rl", fixed_now())
            .unwrap();
        let query = token.query_string();
        assert!(query.contains("sv=2022-11-02"));
        assert!(query.contains("st=2026%2D08%2D23T11%3A59%3A00Z"));
        assert!(query.contains("se=2026%2D08%2D23T12%3A59%3A00Z"));
        assert!(query.contains("sig="));
    }

    #[test]
    fn test_container_scope_changes_resource_marker() {
        let token = signer()
            .mint_at(SasResource::Container, "docs", "", "l", fixed_now())
            .unwrap();
        assert!(token.query_string().contains("sr=c"));
    }

    #[test]
    fn test_invalid_account_key_is_reported() {
        let config = StorageConfig {
            account_name: "prismstore".to_string(),
            account_key: "!!not base64!!".to_string(),
            ..StorageConfig::default()
        };
        let err = SasSigner::new(&config)
            .mint_read_token("docs", "page.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::Other { .. }));
    }
}
