//! LLM Client — the single point of entry for generation-provider calls.
//!
//! ARCHITECTURAL RULE: no other module talks to the provider directly. All
//! generation traffic goes through `LlmClient::generate`, which owns the
//! transport-level retry policy.
//!
//! Retry is an explicit attempt state machine: each attempt is classified as
//! Completed, Retry, or Fatal. Retryable outcomes (timeout, connection
//! failure, 5xx) consume one unit of the retry budget and back off
//! exponentially — `backoff_unit * 2^i` after failed attempt `i`, no jitter.
//! Everything else terminates the call on first occurrence. The HTTP handle
//! lives strictly inside one attempt; nothing is held across attempts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;

/// Terminal client errors. Retryable transport failures never surface
/// directly — they either recover within the budget or collapse into
/// `BudgetExhausted`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-retryable provider rejection (4xx). Carries the raw response body
    /// for diagnostics.
    #[error("provider rejected the request (status {status}): {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body was not the expected completion shape.
    #[error("malformed completion body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// 2xx response with an empty choices array.
    #[error("completion contained no choices")]
    EmptyCompletion,

    /// All budgeted attempts consumed; carries the last transport failure.
    #[error("retry budget exhausted after {attempts} attempts (last: {last})")]
    BudgetExhausted { attempts: u32, last: String },
}

/// A transport-level failure from one attempt. Always retryable.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("attempt timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),
}

/// Raw outcome of one delivered HTTP attempt. Status classification happens
/// in the client, not the transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// One HTTP attempt against the provider. Implementations must scope any
/// connection handle to the single call — tests substitute a scripted mock.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: &ChatCompletionRequest<'_>,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire shapes (OpenRouter chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP transport
// ────────────────────────────────────────────────────────────────────────────

/// Real transport. Builds a fresh `reqwest::Client` per attempt carrying the
/// per-attempt timeout, so the handle is released with the attempt whatever
/// its outcome.
pub struct HttpTransport {
    endpoint: String,
    api_key: String,
    app_title: Option<String>,
    app_referer: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            app_title: config.app_title.clone(),
            app_referer: config.app_referer.clone(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &ChatCompletionRequest<'_>,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::Connect(e.to_string()))?;

        let mut builder = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some(title) = &self.app_title {
            builder = builder.header("X-Title", title);
        }
        if let Some(referer) = &self.app_referer {
            builder = builder.header("HTTP-Referer", referer);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Connect(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Connect(e.to_string())
            }
        })?;

        Ok(TransportResponse { status, body })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// How one attempt resolved.
enum AttemptOutcome {
    Completed(String),
    Retry(String),
    Fatal(ClientError),
}

/// The generation client. Cheap to clone; holds no per-invocation state, so
/// any number of calls may run concurrently.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn Transport>,
    backoff_unit: Duration,
}

impl LlmClient {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            transport: Arc::new(HttpTransport::new(config)),
            backoff_unit: config.backoff_unit,
        }
    }

    /// Substitute a transport (tests use a scripted mock).
    pub fn with_transport(transport: Arc<dyn Transport>, backoff_unit: Duration) -> Self {
        Self {
            transport,
            backoff_unit,
        }
    }

    /// Sends one prompt and returns the trimmed content of the first choice.
    ///
    /// `retry_budget` is the total number of transport attempts, minimum 1.
    pub async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        model: &str,
        retry_budget: u32,
        attempt_timeout: Duration,
    ) -> Result<String, ClientError> {
        let request = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let budget = retry_budget.max(1);
        let mut last_failure = String::new();

        for attempt in 0..budget {
            if attempt > 0 {
                let delay = self.backoff_unit * (1u32 << (attempt - 1));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    last = %last_failure,
                    "generation attempt failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&request, attempt_timeout).await {
                AttemptOutcome::Completed(content) => {
                    debug!(attempt, chars = content.len(), "generation succeeded");
                    return Ok(content);
                }
                AttemptOutcome::Retry(cause) => {
                    last_failure = cause;
                }
                AttemptOutcome::Fatal(err) => return Err(err),
            }
        }

        Err(ClientError::BudgetExhausted {
            attempts: budget,
            last: last_failure,
        })
    }

    /// One attempt, classified. Timeout/connect/5xx are retryable; any other
    /// non-2xx is fatal with the provider's body attached; a 2xx that does
    /// not contain a usable first choice is fatal too (retrying a structural
    /// problem with the same prompt will not change it).
    async fn attempt(
        &self,
        request: &ChatCompletionRequest<'_>,
        attempt_timeout: Duration,
    ) -> AttemptOutcome {
        let response = match self.transport.execute(request, attempt_timeout).await {
            Ok(r) => r,
            Err(failure) => return AttemptOutcome::Retry(failure.to_string()),
        };

        match response.status {
            200..=299 => {
                let parsed: ChatCompletionResponse = match serde_json::from_str(&response.body) {
                    Ok(p) => p,
                    Err(e) => return AttemptOutcome::Fatal(ClientError::MalformedBody(e)),
                };
                match parsed.choices.into_iter().next() {
                    Some(choice) => {
                        AttemptOutcome::Completed(choice.message.content.trim().to_string())
                    }
                    None => AttemptOutcome::Fatal(ClientError::EmptyCompletion),
                }
            }
            status @ 500..=599 => {
                warn!(status, "provider returned a server error");
                AttemptOutcome::Retry(format!("status {status}: {}", response.body))
            }
            status => AttemptOutcome::Fatal(ClientError::Api {
                status,
                body: response.body,
            }),
        }
    }
}
