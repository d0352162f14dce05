//! `config.toml` under the user config dir: `[plan]` settings and raw `[env]` pairs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// `$XDG_CONFIG_HOME/<app>/config.toml`, else the platform config dir.
///
/// `None` when no config dir can be determined.
pub fn config_file_path(app_name: &str) -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)?;
    Some(base.join(app_name).join("config.toml"))
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    plan: PlanTable,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

#[derive(Deserialize, Default)]
struct PlanTable {
    model: Option<String>,
    max_iterations: Option<u32>,
    temperature: Option<f32>,
    api_base: Option<String>,
}

impl PlanTable {
    fn into_env(self) -> impl Iterator<Item = (String, String)> {
        [
            ("PLAN_MODEL", self.model),
            ("PLAN_MAX_ITERATIONS", self.max_iterations.map(|n| n.to_string())),
            ("PLAN_TEMPERATURE", self.temperature.map(|t| t.to_string())),
            ("OPENAI_BASE_URL", self.api_base),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
    }
}

/// Variables defined by the file at `path`. A missing file yields an empty map.
pub fn load_env_map(path: &Path) -> Result<BTreeMap<String, String>, LoadError> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = toml::from_str(&content).map_err(|source| LoadError::ParseConfig {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out: BTreeMap<String, String> = file.plan.into_env().collect();
    out.extend(file.env);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> BTreeMap<String, String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        load_env_map(&path).unwrap()
    }

    #[test]
    fn plan_table_maps_to_runner_variables() {
        let m = load(
            "[plan]\nmodel = \"llama3\"\nmax_iterations = 5\ntemperature = 0.5\napi_base = \"http://localhost:8000/v1\"\n",
        );
        assert_eq!(m.get("PLAN_MODEL").map(String::as_str), Some("llama3"));
        assert_eq!(m.get("PLAN_MAX_ITERATIONS").map(String::as_str), Some("5"));
        assert_eq!(m.get("PLAN_TEMPERATURE").map(String::as_str), Some("0.5"));
        assert_eq!(
            m.get("OPENAI_BASE_URL").map(String::as_str),
            Some("http://localhost:8000/v1")
        );
    }

    #[test]
    fn env_table_wins_over_plan_table() {
        let m = load("[plan]\nmodel = \"a\"\n\n[env]\nPLAN_MODEL = \"b\"\nGROQ_API_KEY = \"k\"\n");
        assert_eq!(m.get("PLAN_MODEL").map(String::as_str), Some("b"));
        assert_eq!(m.get("GROQ_API_KEY").map(String::as_str), Some("k"));
    }

    #[test]
    fn empty_file_and_missing_file_give_empty_map() {
        assert!(load("").is_empty());
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(&dir.path().join("absent.toml")).unwrap().is_empty());
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[plan]\nmax_iterations = \"many\"\n").unwrap();
        assert!(matches!(
            load_env_map(&path),
            Err(LoadError::ParseConfig { .. })
        ));
    }

    #[test]
    fn path_ends_with_app_config_toml() {
        if let Some(path) = config_file_path("planweave") {
            assert!(path.ends_with("planweave/config.toml"));
        }
    }
}
