//! Prism Core - Document information-extraction orchestration library.
//!
//! Prism wires together a vision-capable chat-completion backend and a blob
//! store to support an image/document extraction workflow: it selects a
//! prompt template from a document-type tag, assembles a chat request around
//! an image reference and text context, invokes the completion backend, and
//! moves artifacts in and out of blob storage with idempotency checks and
//! SAS tokens.
//!
//! # Architecture
//!
//! ```text
//! Type tag → Prompt body → Chat request (system + image + text) → Completion
//! Artifact → Upload policy (skip / overwrite / reject) → URL (+ SAS)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{Config, Prism};
//!
//! #[tokio::main]
//! async fn main() -> prism_core::Result<()> {
//!     let config = Config::load()?;
//!     let prism = Prism::new(config)?;
//!
//!     let completion = prism
//!         .describe("https://…/page1.png", "extracted text", "TYPE3_PROMPT", false)
//!         .await?;
//!     println!("{:?}", completion.map(|c| c.text));
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod blob;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;

// Re-exports for convenient access
pub use blob::{AzureBlobStore, BlobGateway, BlobStore, FileRecord, SasSigner, SasToken,
    UploadOptions, UploadOutcome, UploadStatus};
pub use chat::{build_chat_request, invoke_blocking, AzureOpenAiBackend, ChatRequest, Completion,
    CompletionBackend, CompletionProfile, OutputMode};
pub use config::Config;
pub use error::{ConfigError, InvocationError, PrismError, Result, StoreError};
pub use prompt::{select_prompt_body, PromptKind, PromptSelection};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prism orchestrator - the main entry point.
///
/// Owns one completion backend and one blob gateway, both constructed once
/// from the configuration and reused for every call.
pub struct Prism {
    config: Config,
    http: reqwest::Client,
    backend: AzureOpenAiBackend,
    gateway: BlobGateway,
}

impl Prism {
    /// Create a new Prism instance with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Prism v{}", VERSION);
        let backend = AzureOpenAiBackend::new(&config.llm);
        let store = Arc::new(AzureBlobStore::new(&config.storage));
        let gateway = BlobGateway::new(
            store,
            SasSigner::new(&config.storage),
            config.download_dir(),
        );
        Ok(Self {
            config,
            http: reqwest::Client::new(),
            backend,
            gateway,
        })
    }

    /// Create a new Prism instance with configuration loaded from the
    /// default path.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Self::new(config)
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The blob upload/download gateway.
    pub fn gateway(&self) -> &BlobGateway {
        &self.gateway
    }

    /// The completion backend.
    pub fn backend(&self) -> &AzureOpenAiBackend {
        &self.backend
    }

    /// Describe one document image: select the prompt for `type_tag`, build
    /// the chat request, and invoke the completion backend with the profile
    /// matching `long_output`.
    ///
    /// An image-fetch failure is fatal (there is no sane default image). A
    /// backend fault is not: it is logged and surfaces as `None`.
    pub async fn describe(
        &self,
        image_ref: &str,
        text_context: &str,
        type_tag: &str,
        long_output: bool,
    ) -> std::result::Result<Option<Completion>, InvocationError> {
        let (request, selection) =
            build_chat_request(&self.http, image_ref, text_context, type_tag, long_output).await?;
        let profile = CompletionProfile::for_mode(long_output);

        match self.backend.complete(&request, &profile).await {
            Ok(completion) => Ok(Some(completion)),
            Err(e) => {
                tracing::warn!(
                    resolved_type = %selection.resolved_type,
                    error = %e,
                    "completion failed"
                );
                Ok(None)
            }
        }
    }

    /// Blocking variant of [`Prism::describe`] for synchronous call sites.
    /// Owns a current-thread runtime for the duration of the call. Must not
    /// be called from inside an async runtime.
    pub fn describe_blocking(
        &self,
        image_ref: &str,
        text_context: &str,
        type_tag: &str,
        long_output: bool,
    ) -> std::result::Result<Option<Completion>, InvocationError> {
        let runtime = chat::blocking_runtime()?;
        runtime.block_on(self.describe(image_ref, text_context, type_tag, long_output))
    }
}
