//! Log file plumbing shared by binaries: `RUST_LOG` filter and a non-blocking
//! appender for the path in `LOG_FILE`.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::LoadError;

pub const LOG_FILE_VAR: &str = "LOG_FILE";

/// Filter from `RUST_LOG`, else `default` (e.g. `"info"`).
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Non-empty `LOG_FILE`, if set.
pub fn log_file_path() -> Option<PathBuf> {
    std::env::var_os(LOG_FILE_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Appends to `path` (no rotation) on a background worker.
///
/// Keep the guard alive until exit; dropping it flushes pending lines.
pub fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoadError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "planweave.log".to_string());
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}
