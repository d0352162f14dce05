//! Load configuration from `config.toml` and a project `.env`, then apply it to
//! the process environment with priority: **existing env > .env > config.toml**.
//!
//! The config file lives at `$XDG_CONFIG_HOME/<app>/config.toml` (falling back
//! to the platform config dir). It has two tables:
//!
//! ```toml
//! [plan]
//! model = "llama-3.1-8b-instant"
//! max_iterations = 5
//! temperature = 0.2
//! api_base = "https://api.groq.com/openai/v1"
//!
//! [env]
//! GROQ_API_KEY = "..."
//! ```
//!
//! `[plan]` keys are mapped onto the variables the plan runner reads
//! (`PLAN_MODEL`, `PLAN_MAX_ITERATIONS`, `PLAN_TEMPERATURE`, `OPENAI_BASE_URL`);
//! `[env]` entries are taken verbatim and win over `[plan]`.

mod config_file;
mod dotenv;
#[cfg(feature = "tracing-init")]
pub mod tracing_init;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use config_file::config_file_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read config {}: {source}", .path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
    #[cfg(feature = "tracing-init")]
    #[error("open log file: {0}")]
    LogFile(#[from] tracing_appender::rolling::InitError),
}

/// Where an applied value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    DotEnv,
    ConfigFile,
}

/// One variable set by [`load_and_apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub key: String,
    pub source: Source,
}

/// Loads `config.toml` for `app_name` and the `.env` in `override_dir` (or the
/// current directory), then sets every variable not already present in the
/// process environment.
///
/// Returns the variables that were set, sorted by key. Missing files are not
/// an error.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<Applied>, LoadError> {
    let file = config_file_path(app_name);
    load_and_apply_from(file.as_deref(), override_dir)
}

/// [`load_and_apply`] with an explicit config file path.
pub fn load_and_apply_from(
    config_file: Option<&Path>,
    dotenv_dir: Option<&Path>,
) -> Result<Vec<Applied>, LoadError> {
    let file_map = match config_file {
        Some(path) => config_file::load_env_map(path)?,
        None => BTreeMap::new(),
    };
    let dotenv_map = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;

    let merged = merge(|key| std::env::var_os(key).is_some(), dotenv_map, file_map);
    let mut applied = Vec::with_capacity(merged.len());
    for (key, (value, source)) in merged {
        std::env::set_var(&key, value);
        applied.push(Applied { key, source });
    }
    Ok(applied)
}

/// Picks one value per key that `is_set` does not already cover: `.env` first,
/// then the config file.
fn merge<F>(
    is_set: F,
    dotenv: BTreeMap<String, String>,
    file: BTreeMap<String, String>,
) -> BTreeMap<String, (String, Source)>
where
    F: Fn(&str) -> bool,
{
    let mut out: BTreeMap<String, (String, Source)> = file
        .into_iter()
        .map(|(k, v)| (k, (v, Source::ConfigFile)))
        .collect();
    out.extend(dotenv.into_iter().map(|(k, v)| (k, (v, Source::DotEnv))));
    out.retain(|key, _| !is_set(key));
    out
}
