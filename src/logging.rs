//! Tracing subscriber setup.
//!
//! The terminal UI owns stdout and stderr while it runs, so it logs to a file.
//! One-shot commands log to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Builds the filter from `RUST_LOG`, defaulting to `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Opens `path` for appending, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Installs the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(target: LogTarget) -> Result<()> {
    let result = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
