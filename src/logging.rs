//! Logging setup
//!
//! Logs go to stderr (stdout carries the agent's reply) and, when a log
//! directory is configured, to a daily rolling file written off-thread.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "file_manager_agent=info";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
    /// Directory for log files; `None` logs to stderr only
    pub log_dir: Option<PathBuf>,
    /// File name prefix inside `log_dir`
    pub log_file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            log_dir: None,
            log_file_name: "file-manager-agent.log".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read `FILE_MANAGER_LOG_JSON` and `FILE_MANAGER_LOG_DIR`
    pub fn from_env() -> Self {
        let json_format = std::env::var("FILE_MANAGER_LOG_JSON")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);
        let log_dir = std::env::var("FILE_MANAGER_LOG_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Self {
            json_format,
            log_dir,
            ..Self::default()
        }
    }
}

/// Keeps the file writer thread alive; hold it until the program exits
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the global subscriber
///
/// A second call leaves the existing subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut layers = Vec::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    layers.push(if config.json_format {
        stderr_layer.json().flatten_event(true).boxed()
    } else {
        stderr_layer.boxed()
    });

    let mut file_guard = None;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, &config.log_file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false);
        layers.push(if config.json_format {
            file_layer.json().flatten_event(true).boxed()
        } else {
            file_layer.boxed()
        });
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init();

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
