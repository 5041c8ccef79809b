//! Shared test support: a scripted transport standing in for the provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{ChatCompletionRequest, Transport, TransportFailure, TransportResponse};

/// Plays back a fixed script of attempt outcomes and counts how many times it
/// was called. Panics if the client attempts more calls than scripted, which
/// turns an unexpected retry into a test failure.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportFailure>>>,
    calls: AtomicU32,
}

impl MockTransport {
    pub fn scripted(outcomes: Vec<Result<TransportResponse, TransportFailure>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &self,
        _request: &ChatCompletionRequest<'_>,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more times than scripted")
    }
}

/// A minimal 2xx chat-completion body whose first choice carries `content`.
pub fn completion_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

/// Same body with the content wrapped in a ```json fence, the way models
/// often reply despite instructions.
pub fn fenced_completion_body(content: &str) -> String {
    completion_body(&format!("```json\n{content}\n```"))
}
