use std::time::Duration;

use anyhow::{Context, Result};

/// Default OpenRouter chat-completions base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default model used when a call does not override it.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
/// Default total transport attempts per invocation.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;
/// Default per-attempt HTTP timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Engine configuration loaded from environment variables.
/// Read once at process start and never mutated; shared by clone.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Total transport attempts (not extra retries) per invocation.
    pub retry_budget: u32,
    pub attempt_timeout: Duration,
    /// Bound on one whole invocation, spanning attempts and backoff waits.
    /// `None` means no overall deadline.
    pub overall_deadline: Option<Duration>,
    /// Unit for exponential backoff: waits are unit * 2^i. One second in
    /// production; tests shrink it.
    pub backoff_unit: Duration,
    /// Optional OpenRouter attribution headers.
    pub app_title: Option<String>,
    pub app_referer: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: require_env("OPENROUTER_API_KEY")?,
            model: std::env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            retry_budget: parse_env("PIPELINE_RETRY_BUDGET", DEFAULT_RETRY_BUDGET)?,
            attempt_timeout: Duration::from_secs(parse_env(
                "PIPELINE_ATTEMPT_TIMEOUT_SECS",
                DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
            )?),
            overall_deadline: match std::env::var("PIPELINE_DEADLINE_SECS") {
                Ok(raw) => Some(Duration::from_secs(raw.parse::<u64>().context(
                    "PIPELINE_DEADLINE_SECS must be a whole number of seconds",
                )?)),
                Err(_) => None,
            },
            backoff_unit: Duration::from_secs(1),
            app_title: std::env::var("PIPELINE_APP_TITLE").ok(),
            app_referer: std::env::var("PIPELINE_APP_REFERER").ok(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' is not a valid number")),
        Err(_) => Ok(default),
    }
}
