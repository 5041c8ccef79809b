//! SkillSync engine — the structured-generation pipeline behind the resume
//! analysis, JD matching, and resume improvement features.
//!
//! The pipeline renders a prompt from a closed set of templates, sends it to
//! the generation provider with transport-level retry and exponential
//! backoff, isolates the JSON embedded in the free-form reply, and validates
//! it against the caller-selected result schema. Callers get either a fully
//! typed result or a stage-tagged [`PipelineError`]; nothing partial, nothing
//! swallowed.
//!
//! ARCHITECTURAL RULE: route handlers and other collaborators never talk to
//! the provider directly — everything goes through [`Pipeline::run`].

mod config;
mod errors;
mod extract;
mod llm_client;
mod pipeline;
mod prompts;
mod schema;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use errors::PipelineError;
pub use extract::{extract, ExtractionError};
pub use llm_client::{
    ChatCompletionRequest, ChatMessage, ClientError, HttpTransport, LlmClient, Transport,
    TransportFailure, TransportResponse,
};
pub use pipeline::{Pipeline, RunOptions};
pub use prompts::{build as build_prompt, default_system_prompt, TemplateError, TemplateId};
pub use schema::{
    validate, FitSummary, JdMatch, ResumeAnalysis, ResumeImprovement, SchemaKind, TypedResult,
    ValidateError,
};
