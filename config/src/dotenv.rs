//! `.env` parsing: `KEY=value` lines, optional `export ` prefix, quotes, `#` comments.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    Some(dir.join(".env")).filter(|p| p.is_file())
}

/// Parses `.env` content. Later lines override earlier ones.
///
/// - `"..."` values unescape `\"` and `\n`; `'...'` values are taken literally.
/// - Unquoted values end at ` #` (inline comment).
/// - Lines without `=` or with an empty key are skipped.
pub fn parse(content: &str) -> BTreeMap<String, String> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(raw.trim())))
}

fn unquote(raw: &str) -> String {
    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return inner.replace("\\\"", "\"").replace("\\n", "\n");
    }
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return inner.to_string();
    }
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Loads `.env` from `override_dir` or the current directory. Missing file: empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<BTreeMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse(&std::fs::read_to_string(path)?)),
        None => Ok(BTreeMap::new()),
    }
}
