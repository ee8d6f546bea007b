//! Tracing setup
//!
//! The dashboard owns the terminal, so interactive mode logs to a daily
//! rolling file only. One-shot commands log WARN and above to stderr.

use std::path::{Path, PathBuf};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Directory override for file logs
pub const LOG_DIR_ENV: &str = "SENTINEL_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "./logs";
const LOG_FILE: &str = "sentinel-dash.log";

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},sentinel_dash=debug", config.level))
    })
}

/// `rolling::daily` panics if it cannot create the first file, so check
/// that the directory is writable before handing it over.
fn writable_log_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".sentinel_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)?;
    let _ = std::fs::remove_file(&probe);
    Ok(())
}

/// File logging for the interactive dashboard. Returns the log directory
/// when file logging is active.
pub fn init_logging_file(config: &LoggingConfig) -> Option<PathBuf> {
    let log_dir = PathBuf::from(
        std::env::var(LOG_DIR_ENV).unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string()),
    );

    if let Err(e) = writable_log_dir(&log_dir) {
        eprintln!(
            "Warning: Could not write to log directory {} ({}), file logging disabled",
            log_dir.display(),
            e
        );
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // The process logs until exit; the guard must outlive main's scope.
    Box::leak(Box::new(guard));

    let (plain, json) = if config.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true),
            ),
            None,
        )
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(plain)
        .with(json)
        .try_init();

    Some(log_dir)
}

pub fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
