//! Synchronous wrapper around the async completion interface.
//!
//! Some callers drive Prism from fully synchronous pipeline code. Instead of
//! a process-wide, implicitly reused event loop, each blocking invocation
//! owns a bounded-lifetime current-thread runtime: the call runs to
//! completion before the caller's next statement executes, and the runtime
//! is dropped with it.

use super::backend::{Completion, CompletionBackend, CompletionProfile};
use super::request::ChatRequest;
use crate::error::InvocationError;

/// Invoke a completion backend, blocking until it finishes.
///
/// Must not be called from inside an async runtime — use
/// [`CompletionBackend::complete`] directly there. No retry is performed at
/// this layer; a hung backend call blocks until the backend's own timeout
/// fires.
pub fn invoke_blocking(
    backend: &dyn CompletionBackend,
    request: &ChatRequest,
    profile: &CompletionProfile,
) -> Result<Completion, InvocationError> {
    let runtime = blocking_runtime()?;
    runtime.block_on(backend.complete(request, profile))
}

/// Build the bounded-lifetime runtime one blocking call owns. Every
/// sync-over-async entry point in the crate goes through here.
pub(crate) fn blocking_runtime() -> Result<tokio::runtime::Runtime, InvocationError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| InvocationError::Transport {
            message: format!("failed to build blocking runtime: {e}"),
            status_code: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::request::build_chat_request;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct MockBackend {
        call_count: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: &ChatRequest,
            _profile: &CompletionProfile,
        ) -> Result<Completion, InvocationError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            // Exercise the runtime's timer to prove it is fully enabled
            tokio::time::sleep(Duration::from_millis(1)).await;
            if self.fail {
                Err(InvocationError::ValidationFailed {
                    message: "bad shape".to_string(),
                })
            } else {
                Ok(Completion {
                    text: "done".to_string(),
                    model: "mock-v1".to_string(),
                    tokens_used: Some(5),
                    latency_ms: 1,
                    metadata: serde_json::Value::Null,
                })
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn sample_request() -> ChatRequest {
        // Building a short-mode request performs no I/O, so a throwaway
        // runtime is fine here.
        let runtime = blocking_runtime().unwrap();
        runtime
            .block_on(build_chat_request(
                &reqwest::Client::new(),
                "https://example.com/p.png",
                "ctx",
                "TYPE1_PROMPT",
                false,
            ))
            .unwrap()
            .0
    }

    #[test]
    fn test_blocking_invoke_runs_to_completion() {
        let backend = MockBackend {
            call_count: Arc::new(AtomicU32::new(0)),
            fail: false,
        };
        let request = sample_request();
        let completion =
            invoke_blocking(&backend, &request, &CompletionProfile::short()).unwrap();

        assert_eq!(completion.text, "done");
        assert_eq!(backend.call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_invoke_surfaces_backend_error() {
        let backend = MockBackend {
            call_count: Arc::new(AtomicU32::new(0)),
            fail: true,
        };
        let request = sample_request();
        let err = invoke_blocking(&backend, &request, &CompletionProfile::long()).unwrap_err();

        assert!(matches!(err, InvocationError::ValidationFailed { .. }));
    }

    #[test]
    fn test_each_invocation_gets_a_fresh_runtime() {
        let backend = MockBackend {
            call_count: Arc::new(AtomicU32::new(0)),
            fail: false,
        };
        let request = sample_request();
        for _ in 0..3 {
            invoke_blocking(&backend, &request, &CompletionProfile::short()).unwrap();
        }
        assert_eq!(backend.call_count.load(Ordering::SeqCst), 3);
    }
}
