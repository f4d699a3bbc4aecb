//! Diagnostic logging for the CLI.
//!
//! Stderr logs at `[logging].level`. When `[logging].file` is set, a second
//! layer appends to that file at `file_level` (falling back to `level`).
//! `JOT_LOG` takes `EnvFilter` directives that override both.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use jotlog_core::config::ResolvedConfig;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const FILTER_ENV: &str = "JOT_LOG";

#[derive(Debug, Error)]
#[error("failed to open log file {path}: {source}")]
pub struct LoggingError {
    path: String,
    #[source]
    source: io::Error,
}

/// Flushes the file writer when dropped. Hold it until the command ends.
#[must_use]
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Install the stderr layer and, when configured, the file layer.
///
/// A second call in the same process keeps the first subscriber.
pub fn init(cfg: &ResolvedConfig) -> Result<LogGuard, LoggingError> {
    let logging = &cfg.logging;

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(env_filter(&logging.level, LevelFilter::WARN));
    let registry = tracing_subscriber::registry().with(stderr_layer);

    let Some(path) = logging.file.as_deref() else {
        let _ = registry.try_init();
        return Ok(LogGuard { _guard: None });
    };

    let file = open_append(path)
        .map_err(|source| LoggingError { path: path.display().to_string(), source })?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_level = logging.file_level.as_deref().unwrap_or(&logging.level);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter(file_level, LevelFilter::DEBUG));

    let _ = registry.with(file_layer).try_init();
    Ok(LogGuard { _guard: Some(guard) })
}

fn env_filter(level: &str, fallback: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_or(level, fallback).into())
        .with_env_var(FILTER_ENV)
        .from_env_lossy()
}

fn level_or(level: &str, fallback: LevelFilter) -> LevelFilter {
    match level.trim() {
        "" => fallback,
        s => s.parse().unwrap_or(fallback),
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_level_or() {
        assert_eq!(level_or("error", LevelFilter::WARN), LevelFilter::ERROR);
        assert_eq!(level_or("Info", LevelFilter::WARN), LevelFilter::INFO);
        assert_eq!(level_or("TRACE", LevelFilter::WARN), LevelFilter::TRACE);
        assert_eq!(level_or("off", LevelFilter::WARN), LevelFilter::OFF);
        assert_eq!(level_or("loud", LevelFilter::WARN), LevelFilter::WARN);
        assert_eq!(level_or("  ", LevelFilter::DEBUG), LevelFilter::DEBUG);
    }

    #[test]
    fn open_append_creates_parents_and_keeps_content() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/dir/jot.log");

        {
            use std::io::Write;
            let mut f = open_append(&path).unwrap();
            writeln!(f, "first").unwrap();
        }
        {
            use std::io::Write;
            let mut f = open_append(&path).unwrap();
            writeln!(f, "second").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
