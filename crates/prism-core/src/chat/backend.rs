//! Completion backend trait and the Azure OpenAI implementation.
//!
//! The wire shape is the Chat Completions API: system prompt as a plain
//! string, user entries as content-part arrays (`image_url` / `text`).

use super::request::{ChatRequest, MessageContent, Role};
use crate::config::LlmConfig;
use crate::error::InvocationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Output-length mode selecting deployment, API version and decoding params.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Short,
    Long,
}

/// Fixed decoding parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionProfile {
    pub mode: OutputMode,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl CompletionProfile {
    /// Short-output profile: minimum creativity, standard token budget.
    pub fn short() -> Self {
        Self {
            mode: OutputMode::Short,
            max_tokens: 4095,
            temperature: 0.0,
            top_p: 0.95,
        }
    }

    /// Long-output profile. Temperature is near-zero rather than exactly
    /// zero to keep the backend off its degenerate greedy path.
    pub fn long() -> Self {
        Self {
            mode: OutputMode::Long,
            max_tokens: 16_384,
            temperature: 1e-6,
            top_p: 0.95,
        }
    }

    /// The profile for an output-length flag.
    pub fn for_mode(long_output: bool) -> Self {
        if long_output {
            Self::long()
        } else {
            Self::short()
        }
    }
}

/// The response from a completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Model identifier reported by the backend
    pub model: String,
    /// Total tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
    /// Backend-reported metadata (usage breakdown, finish reason)
    pub metadata: serde_json::Value,
}

/// Trait implemented by completion backends.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn CompletionBackend>` for dynamic dispatch).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Submit a chat request with the given profile.
    async fn complete(
        &self,
        request: &ChatRequest,
        profile: &CompletionProfile,
    ) -> Result<Completion, InvocationError>;

    /// Per-request timeout for this backend.
    fn timeout(&self) -> Duration;
}

/// Azure OpenAI backend over the Chat Completions REST API.
///
/// One client is built per backend and reused across sequential calls;
/// short and long modes share it but target different deployments and API
/// versions.
pub struct AzureOpenAiBackend {
    endpoint: String,
    api_key: String,
    deployment: String,
    deployment_long: String,
    api_version: String,
    api_version_long: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AzureOpenAiBackend {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            deployment_long: config.deployment_long.clone(),
            api_version: config.api_version.clone(),
            api_version_long: config.api_version_long.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint override, used by tests against a local mock server.
    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn request_url(&self, mode: OutputMode) -> String {
        let (deployment, api_version) = match mode {
            OutputMode::Short => (&self.deployment, &self.api_version),
            OutputMode::Long => (&self.deployment_long, &self.api_version_long),
        };
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, api_version
        )
    }
}

// --- Request types ---

#[derive(Serialize)]
struct WireRequest {
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum WirePart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Serialize)]
struct WireImageUrl {
    url: String,
}

fn to_wire(request: &ChatRequest) -> Vec<WireMessage> {
    request
        .messages()
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::System => "system",
                Role::User => "user",
            };
            let content = match (&message.role, &message.content) {
                // System instructions go out as a plain string
                (Role::System, MessageContent::Text(text)) => WireContent::Text(text.clone()),
                (_, MessageContent::Text(text)) => {
                    WireContent::Parts(vec![WirePart::Text { text: text.clone() }])
                }
                (_, MessageContent::Image(image)) => WireContent::Parts(vec![WirePart::ImageUrl {
                    image_url: WireImageUrl {
                        url: image.as_url().to_string(),
                    },
                }]),
            };
            WireMessage { role, content }
        })
        .collect()
}

// --- Response types ---

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    model: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: u32,
}

#[async_trait]
impl CompletionBackend for AzureOpenAiBackend {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        profile: &CompletionProfile,
    ) -> Result<Completion, InvocationError> {
        let start = Instant::now();

        let body = WireRequest {
            messages: to_wire(request),
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
            top_p: profile.top_p,
        };

        let response = self
            .client
            .post(self.request_url(profile.mode))
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| InvocationError::Transport {
                message: format!("completion request failed: {e}"),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InvocationError::Transport {
                message: format!("completion HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        // A malformed body is a validation failure, not a transport fault:
        // the backend answered, the shape is wrong.
        let wire: WireResponse =
            response
                .json()
                .await
                .map_err(|e| InvocationError::ValidationFailed {
                    message: format!("failed to parse completion response: {e}"),
                })?;

        let first = wire
            .choices
            .first()
            .ok_or_else(|| InvocationError::ValidationFailed {
                message: "completion returned an empty choices array".to_string(),
            })?;
        let text =
            first
                .message
                .content
                .clone()
                .ok_or_else(|| InvocationError::ValidationFailed {
                    message: "completion choice carried no content".to_string(),
                })?;

        let metadata = serde_json::json!({
            "finish_reason": first.finish_reason,
            "usage": wire.usage.as_ref().map(|u| serde_json::json!({
                "prompt_tokens": u.prompt_tokens,
                "completion_tokens": u.completion_tokens,
                "total_tokens": u.total_tokens,
            })),
        });
        tracing::debug!(metadata = %metadata, "completion metadata");

        Ok(Completion {
            text,
            model: wire.model.unwrap_or_default(),
            tokens_used: wire.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
            metadata,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
