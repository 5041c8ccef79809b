use std::time::Duration;

use thiserror::Error;

use crate::extract::ExtractionError;
use crate::llm_client::ClientError;
use crate::prompts::TemplateError;
use crate::schema::ValidateError;

/// Top-level pipeline error, tagged by the stage that produced it.
/// Every variant is terminal by the time it reaches the caller: transport
/// retries have already been spent inside the client stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("prompt template: {0}")]
    Template(#[from] TemplateError),

    #[error("generation client: {0}")]
    Client(#[from] ClientError),

    #[error("response extraction: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("response validation: {0}")]
    Validate(#[from] ValidateError),

    #[error("invocation deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl PipelineError {
    /// Name of the pipeline stage that failed. Callers map this (plus the
    /// variant itself) onto their own externally visible status codes.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Template(_) => "prompt",
            PipelineError::Client(_) => "generate",
            PipelineError::Extraction(_) => "extract",
            PipelineError::Validate(_) => "validate",
            PipelineError::DeadlineExceeded(_) => "deadline",
        }
    }
}
