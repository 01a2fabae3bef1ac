use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_FILE_NAME: &str = "ldapcached.log";

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Initialize the global subscriber.
    ///
    /// Logs go to `config.log_file` when set, otherwise to stderr. The
    /// returned value keeps the file writer alive and must be held until
    /// exit.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;

        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let guard = if let Some(ref log_file) = config.log_file {
            let (directory, file_name) = split_log_path(log_file);
            let file_appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(directory, file_name),
                RotationPolicy::Hourly => rolling::hourly(directory, file_name),
                RotationPolicy::Never => rolling::never(directory, file_name),
            };

            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // File layer - always JSON for structured logging
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(env_filter);

            tracing_subscriber::registry()
                .with(file_layer)
                .try_init()
                .context("Failed to install file logger")?;

            Some(guard)
        } else {
            match config.format {
                LogFormat::Json => {
                    let stderr_layer = tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_filter(env_filter);

                    tracing_subscriber::registry()
                        .with(stderr_layer)
                        .try_init()
                        .context("Failed to install logger")?;
                }
                LogFormat::Pretty => {
                    let stderr_layer = tracing_subscriber::fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_filter(env_filter);

                    tracing_subscriber::registry()
                        .with(stderr_layer)
                        .try_init()
                        .context("Failed to install logger")?;
                }
            }

            None
        };

        tracing::debug!(
            level = %default_level,
            format = ?config.format,
            file_output = config.log_file.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }

    /// Get the worker guard (for testing)
    #[cfg(test)]
    pub const fn guard(&self) -> &Option<WorkerGuard> {
        &self._guard
    }
}

/// Parse a log level name. Only the first letter is significant, so `d`,
/// `Debug` and `DEBUG` all select debug; `C` (critical) maps to error.
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('T') => Ok(Level::TRACE),
        Some('D') => Ok(Level::DEBUG),
        Some('I') => Ok(Level::INFO),
        Some('W') => Ok(Level::WARN),
        Some('E' | 'C') => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

fn split_log_path(path: &Path) -> (&Path, &std::ffi::OsStr) {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE_NAME));
    (directory, file_name)
}
