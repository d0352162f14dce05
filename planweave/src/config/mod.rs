//! Build configuration for the plan runner, read from the environment.
//!
//! Callers usually run `config::load_and_apply("planweave", None)` first so
//! `.env` and `~/.config/planweave/config.toml` values are visible here.

pub mod summary;

use crate::agent::plan::DEFAULT_MAX_ITERATIONS;

/// Groq's OpenAI-compatible endpoint; used when the key comes from `GROQ_API_KEY`.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Model used when neither `PLAN_MODEL` nor `OPENAI_MODEL` is set.
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";

/// Which variable provided the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Groq,
    OpenAi,
}

/// Everything needed to build a `PlanRunner` with the default chat client.
#[derive(Clone, Debug)]
pub struct PlanBuildConfig {
    pub api_key: Option<String>,
    pub key_source: Option<ApiKeySource>,
    /// Explicit base URL; `None` means the client default (OpenAI).
    pub api_base: Option<String>,
    pub model: String,
    pub max_iterations: u32,
    pub temperature: Option<f32>,
}

impl Default for PlanBuildConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            key_source: None,
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: None,
        }
    }
}

impl PlanBuildConfig {
    /// Reads `GROQ_API_KEY` / `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `PLAN_MODEL` / `OPENAI_MODEL`, `PLAN_MAX_ITERATIONS` and `PLAN_TEMPERATURE`.
    ///
    /// No variable is required. A Groq key wins over an OpenAI key and implies
    /// the Groq base URL unless `OPENAI_BASE_URL` is set. Unparsable numbers
    /// fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (api_key, key_source) = match (get("GROQ_API_KEY"), get("OPENAI_API_KEY")) {
            (Some(k), _) => (Some(k), Some(ApiKeySource::Groq)),
            (None, Some(k)) => (Some(k), Some(ApiKeySource::OpenAi)),
            (None, None) => (None, None),
        };
        let api_base = get("OPENAI_BASE_URL")
            .map(|b| b.trim_end_matches('/').to_string())
            .or_else(|| (key_source == Some(ApiKeySource::Groq)).then(|| GROQ_API_BASE.to_string()));
        let model = get("PLAN_MODEL")
            .or_else(|| get("OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let max_iterations = parse_or_default("PLAN_MAX_ITERATIONS", get("PLAN_MAX_ITERATIONS"))
            .unwrap_or(DEFAULT_MAX_ITERATIONS);
        let temperature = parse_or_default("PLAN_TEMPERATURE", get("PLAN_TEMPERATURE"));

        Self {
            api_key,
            key_source,
            api_base,
            model,
            max_iterations,
            temperature,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Base URL the chat client will talk to.
    pub fn effective_api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or("https://api.openai.com/v1")
    }
}

fn parse_or_default<T: std::str::FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> PlanBuildConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlanBuildConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gemma2-9b-it");
        assert_eq!(config.max_iterations, 3);
        assert!(config.temperature.is_none());
        assert_eq!(config.effective_api_base(), "https://api.openai.com/v1");
    }

    /// **Scenario**: a Groq key selects the Groq endpoint.
    #[test]
    fn groq_key_implies_groq_base() {
        let config = config_from(&[("GROQ_API_KEY", "gsk"), ("OPENAI_API_KEY", "sk")]);
        assert_eq!(config.api_key.as_deref(), Some("gsk"));
        assert_eq!(config.key_source, Some(ApiKeySource::Groq));
        assert_eq!(config.api_base.as_deref(), Some(GROQ_API_BASE));
    }

    #[test]
    fn explicit_base_and_model_override() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("PLAN_MODEL", "llama3"),
            ("PLAN_MAX_ITERATIONS", "5"),
            ("PLAN_TEMPERATURE", "0.3"),
        ]);
        assert_eq!(config.key_source, Some(ApiKeySource::OpenAi));
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.model, "llama3");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.temperature, Some(0.3));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = config_from(&[("PLAN_MAX_ITERATIONS", "many"), ("PLAN_TEMPERATURE", "hot")]);
        assert_eq!(config.max_iterations, 3);
        assert!(config.temperature.is_none());
    }
}
