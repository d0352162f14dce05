//! LLM config block for run config summary.

use super::ConfigSection;
use crate::config::{ApiKeySource, PlanBuildConfig};

/// Model, endpoint, temperature and where the key came from (never the key).
pub struct LlmConfigSummary {
    pub model: String,
    pub api_base: String,
    /// `None` displays as "(default)".
    pub temperature: Option<f32>,
    pub key_source: Option<ApiKeySource>,
}

impl LlmConfigSummary {
    pub fn from_config(config: &PlanBuildConfig) -> Self {
        Self {
            model: config.model.clone(),
            api_base: config.effective_api_base().to_string(),
            temperature: config.temperature,
            key_source: config.key_source,
        }
    }
}

impl ConfigSection for LlmConfigSummary {
    fn section_name(&self) -> &str {
        "LLM config"
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        let temperature = self
            .temperature
            .map(|t| t.to_string())
            .unwrap_or_else(|| "(default)".to_string());
        let key = match self.key_source {
            Some(ApiKeySource::Groq) => "GROQ_API_KEY",
            Some(ApiKeySource::OpenAi) => "OPENAI_API_KEY",
            None => "(unset)",
        };
        vec![
            ("model", self.model.clone()),
            ("api_base", self.api_base.clone()),
            ("temperature", temperature),
            ("api_key", key.to_string()),
        ]
    }
}
