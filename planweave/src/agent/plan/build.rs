//! Builds a `PlanRunner` from `PlanBuildConfig`, constructing the default
//! chat client when the caller does not inject one.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;

use crate::config::PlanBuildConfig;
use crate::graph::CompilationError;
use crate::llm::{ChatOpenAI, LlmClient};

use super::runner::{PlanOptions, PlanRunner};

#[derive(Debug, thiserror::Error)]
pub enum BuildRunnerError {
    #[error("no API key: set GROQ_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}

fn openai_config_from(config: &PlanBuildConfig) -> Result<OpenAIConfig, BuildRunnerError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(BuildRunnerError::MissingApiKey)?;
    let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = config.api_base.as_deref().filter(|b| !b.is_empty()) {
        openai_config = openai_config.with_api_base(base.trim_end_matches('/'));
    }
    Ok(openai_config)
}

/// Default chat client for `config`.
pub fn build_default_llm(config: &PlanBuildConfig) -> Result<ChatOpenAI, BuildRunnerError> {
    let client = ChatOpenAI::with_config(openai_config_from(config)?, config.model.clone());
    Ok(match config.temperature {
        Some(t) => client.with_temperature(t),
        None => client,
    })
}

/// Runner for `config`; `llm` overrides the default client (tests, mocks).
pub fn build_plan_runner(
    config: &PlanBuildConfig,
    llm: Option<Arc<dyn LlmClient>>,
    verbose: bool,
) -> Result<PlanRunner, BuildRunnerError> {
    let llm = match llm {
        Some(l) => l,
        None => Arc::new(build_default_llm(config)?),
    };
    let options = PlanOptions {
        max_iterations: config.max_iterations,
        verbose,
    };
    Ok(PlanRunner::new(llm, options)?)
}
