use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level; only the first letter counts (D, I, W, E, C)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Log file. When set, logs go to this file instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Rotation policy for the log file
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Daily,
    Hourly,
    #[default]
    Never,
}

impl LogConfig {
    /// Logging settings derived from the command-line flags.
    ///
    /// `quiet` forces the level to `error`.
    pub fn from_flags(quiet: bool, level: &str, log_file: Option<PathBuf>) -> Self {
        Self {
            level: if quiet { "error".to_string() } else { level.to_string() },
            log_file,
            ..Self::default()
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_file: None,
            rotation: RotationPolicy::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_forces_error_level() {
        let config = LogConfig::from_flags(true, "debug", None);
        assert_eq!(config.level, "error");

        let config = LogConfig::from_flags(false, "debug", Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(config.level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(config.rotation, RotationPolicy::Never);
    }

    #[test]
    fn test_format_names() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        let rotation: RotationPolicy = serde_json::from_str("\"hourly\"").unwrap();
        assert_eq!(rotation, RotationPolicy::Hourly);
    }
}
