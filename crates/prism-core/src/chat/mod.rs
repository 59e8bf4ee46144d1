//! Chat request assembly and completion invocation.
//!
//! A request is a fixed three-entry message sequence (system instructions,
//! user image, user text context) built from a prompt selection. Submission
//! goes through the [`CompletionBackend`] trait; [`bridge`] flattens the
//! async interface into a blocking call for synchronous callers.

mod backend;
mod bridge;
mod request;

pub use backend::{
    AzureOpenAiBackend, Completion, CompletionBackend, CompletionProfile, OutputMode,
};
pub use bridge::invoke_blocking;
pub(crate) use bridge::blocking_runtime;
pub use request::{build_chat_request, ChatMessage, ChatRequest, ImageRef, MessageContent, Role};
