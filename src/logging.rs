//! Tracing setup: a compact stdout layer plus a non-blocking file layer.
//!
//! The file path comes from [`Config::log_file`], falling back to [`DEFAULT_LOG_FILE`]. If the
//! file cannot be opened the server keeps running with stdout only and says so once tracing is up.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Log file used when no path is configured.
pub const DEFAULT_LOG_FILE: &str = "logs/student-directory.log";

// Keeps the file writer's worker thread alive for the process lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Path the file layer writes to for `config`.
pub fn log_file_path(config: &Config) -> PathBuf {
    config
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Install the global subscriber. Respects `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let path = log_file_path(config);

    let (file_layer, file_error) = match open_append(&path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_GUARD.set(guard);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            (Some(layer), None)
        }
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();

    match file_error {
        None => tracing::debug!(path = %path.display(), "File logging enabled"),
        Some(err) => tracing::warn!(
            path = %path.display(),
            error = %err,
            "Log file unavailable; logging to stdout only"
        ),
    }
}

/// Open `path` for appending, creating missing parent directories.
fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
