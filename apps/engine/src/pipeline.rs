//! Pipeline — composes prompt building, generation, extraction, and
//! validation into one call.
//!
//! Flow: prompts::build → LlmClient::generate (internal retry loop) →
//! extract::extract → schema::validate. The first failure short-circuits the
//! rest and comes back tagged with its stage.
//!
//! A structurally bad response (extraction, parse, or validation failure)
//! after a successful HTTP exchange is terminal: the generation call is NOT
//! re-issued. The retry budget exists for transport instability only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::PipelineError;
use crate::llm_client::{LlmClient, Transport};
use crate::prompts::{self, TemplateId};
use crate::schema::{self, SchemaKind, TypedResult};

/// Per-call overrides. Anything left `None` falls back to the engine config
/// (and, for the system prompt, to the schema kind's default).
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub retry_budget: Option<u32>,
}

/// The orchestrator callers interact with. Stateless across invocations;
/// clones share the config and transport, so any number of `run` calls may
/// be in flight at once.
#[derive(Clone)]
pub struct Pipeline {
    config: EngineConfig,
    client: LlmClient,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> Self {
        let client = LlmClient::new(&config);
        Self { config, client }
    }

    /// Builds a pipeline over a caller-supplied transport (tests inject a
    /// scripted mock here).
    pub fn with_transport(config: EngineConfig, transport: Arc<dyn Transport>) -> Self {
        let client = LlmClient::with_transport(transport, config.backoff_unit);
        Self { config, client }
    }

    /// Runs one full invocation with config defaults.
    pub async fn run(
        &self,
        template: TemplateId,
        variables: &HashMap<String, String>,
        kind: SchemaKind,
    ) -> Result<TypedResult, PipelineError> {
        self.run_with(template, variables, kind, RunOptions::default())
            .await
    }

    /// Runs one full invocation with per-call overrides.
    pub async fn run_with(
        &self,
        template: TemplateId,
        variables: &HashMap<String, String>,
        kind: SchemaKind,
        options: RunOptions,
    ) -> Result<TypedResult, PipelineError> {
        let prompt = prompts::build(template, variables)?;

        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let system_prompt = options
            .system_prompt
            .as_deref()
            .unwrap_or_else(|| prompts::default_system_prompt(kind));
        let retry_budget = options.retry_budget.unwrap_or(self.config.retry_budget);

        debug!(
            template = template.as_str(),
            model, retry_budget, "running generation pipeline"
        );

        let stages = self.generate_and_validate(&prompt, system_prompt, model, retry_budget, kind);
        match self.config.overall_deadline {
            Some(deadline) => tokio::time::timeout(deadline, stages)
                .await
                .map_err(|_| PipelineError::DeadlineExceeded(deadline))?,
            None => stages.await,
        }
    }

    async fn generate_and_validate(
        &self,
        prompt: &str,
        system_prompt: &str,
        model: &str,
        retry_budget: u32,
        kind: SchemaKind,
    ) -> Result<TypedResult, PipelineError> {
        let raw = self
            .client
            .generate(
                prompt,
                system_prompt,
                model,
                retry_budget,
                self.config.attempt_timeout,
            )
            .await?;
        let candidate = crate::extract::extract(&raw)?;
        Ok(schema::validate(candidate, kind)?)
    }
}
