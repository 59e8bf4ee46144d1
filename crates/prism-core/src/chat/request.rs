//! Chat request types and assembly.

use crate::error::InvocationError;
use crate::prompt::{
    render, select_prompt_body, PromptKind, PromptSelection, LONG_RESPONSE_TEMPLATE, MAIN_TEMPLATE,
    NO_TYPE_TEMPLATE,
};
use base64::Engine;

/// Author role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// Image reference inside a user message: a remote URL or an inline
/// base64 data URL, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Remote URL, passed through unchanged.
    Url(String),
    /// `data:image/png;base64,…` payload built from fetched bytes.
    InlineBase64(String),
}

impl ImageRef {
    /// The URL form sent on the wire (remote URL or data URL).
    pub fn as_url(&self) -> &str {
        match self {
            Self::Url(url) | Self::InlineBase64(url) => url,
        }
    }
}

/// Message content: text or an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Image(ImageRef),
}

/// One entry of a chat request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// An ordered chat message sequence ready for submission.
///
/// Invariant: exactly one system entry (the rendered template), followed by
/// one user image entry and one user text entry, in that order. The
/// constructor is the only way to build one, so a request can never be
/// missing its system entry.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    messages: Vec<ChatMessage>,
}

impl ChatRequest {
    fn new(system_text: String, image: ImageRef, text_context: String) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: MessageContent::Text(system_text),
                },
                ChatMessage {
                    role: Role::User,
                    content: MessageContent::Image(image),
                },
                ChatMessage {
                    role: Role::User,
                    content: MessageContent::Text(text_context),
                },
            ],
        }
    }

    /// The messages in submission order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The rendered system prompt.
    pub fn system_text(&self) -> &str {
        match &self.messages[0].content {
            MessageContent::Text(text) => text,
            MessageContent::Image(_) => unreachable!("system entry is always text"),
        }
    }
}

/// Assemble a chat request for one page image.
///
/// The document-type tag selects the prompt body; an unrecognized tag swaps
/// the whole outer template for the minimal no-placeholder one rather than
/// just changing the body fragment. With `long_output` the image behind
/// `image_ref` is fetched and embedded inline as base64 — a non-2xx fetch
/// fails the whole operation, since there is no sane default image. Without
/// it, `image_ref` is passed through as a URL unchanged.
///
/// `text_context` is carried verbatim: no trimming, no escaping.
pub async fn build_chat_request(
    http: &reqwest::Client,
    image_ref: &str,
    text_context: &str,
    type_tag: &str,
    long_output: bool,
) -> Result<(ChatRequest, PromptSelection), InvocationError> {
    let selection = select_prompt_body(type_tag);

    let system_text = if selection.kind == PromptKind::NoType {
        tracing::debug!(type_tag, "could not determine prompt type, using minimal template");
        NO_TYPE_TEMPLATE.to_string()
    } else {
        let outer = if long_output {
            LONG_RESPONSE_TEMPLATE
        } else {
            MAIN_TEMPLATE
        };
        render(outer, &selection.body_text)
    };

    tracing::debug!(image = %image_ref, long_output, "assembling chat request");

    let image = if long_output {
        let encoded = fetch_image_base64(http, image_ref).await?;
        ImageRef::InlineBase64(format!("data:image/png;base64,{encoded}"))
    } else {
        ImageRef::Url(image_ref.to_string())
    };

    Ok((
        ChatRequest::new(system_text, image, text_context.to_string()),
        selection,
    ))
}

/// Download the image behind a URL and base64-encode its bytes.
async fn fetch_image_base64(
    http: &reqwest::Client,
    url: &str,
) -> Result<String, InvocationError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| InvocationError::Transport {
            message: format!("image fetch failed: {e}"),
            status_code: None,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(InvocationError::FetchFailure {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| InvocationError::Transport {
            message: format!("image body read failed: {e}"),
            status_code: None,
        })?;

    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}
