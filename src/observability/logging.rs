//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default directive when nothing else is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Directive used with `--verbose`.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses `pretty` or `json`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
///
/// Logs always go to stderr or a file; stdout belongs to command output and
/// the stdio transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub directive: String,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Level precedence: `RUST_LOG`, `DEADENDS_LOG_LEVEL`, the config file,
    /// then `--verbose`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, |key| std::env::var(key).ok())
    }

    fn resolve(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let fallback = if verbose {
            VERBOSE_LOG_LEVEL
        } else {
            DEFAULT_LOG_LEVEL
        };

        let directive = env("RUST_LOG")
            .or_else(|| env("DEADENDS_LOG_LEVEL"))
            .or_else(|| settings.and_then(|s| s.level.clone()))
            .unwrap_or_else(|| fallback.to_string());

        let format = env("DEADENDS_LOG_FORMAT")
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .and_then(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        let file = env("DEADENDS_LOG_FILE")
            .map(PathBuf::from)
            .or_else(|| settings.and_then(|s| s.file.clone()));

        Self {
            directive,
            format,
            file,
        }
    }

    /// The filter, falling back to the default level on a bad directive.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |k| map.get(k).map(|v| (*v).to_string())
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::resolve(None, false, env(&[]));
        assert_eq!(config.directive, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(LoggingConfig::resolve(None, true, env(&[])).directive, "debug");
    }

    #[test]
    fn test_precedence() {
        let settings = LoggingSettings {
            level: Some("info".to_string()),
            format: Some("json".to_string()),
            file: None,
        };
        let from_file = LoggingConfig::resolve(Some(&settings), true, env(&[]));
        assert_eq!(from_file.directive, "info");
        assert_eq!(from_file.format, LogFormat::Json);

        let from_env = LoggingConfig::resolve(
            Some(&settings),
            false,
            env(&[("DEADENDS_LOG_LEVEL", "error"), ("DEADENDS_LOG_FORMAT", "pretty")]),
        );
        assert_eq!(from_env.directive, "error");
        assert_eq!(from_env.format, LogFormat::Pretty);

        let rust_log = LoggingConfig::resolve(
            Some(&settings),
            false,
            env(&[("RUST_LOG", "deadends=trace"), ("DEADENDS_LOG_LEVEL", "error")]),
        );
        assert_eq!(rust_log.directive, "deadends=trace");
    }

    #[test]
    fn test_log_file_from_env() {
        let config = LoggingConfig::resolve(None, false, env(&[("DEADENDS_LOG_FILE", "/tmp/d.log")]));
        assert_eq!(config.file, Some(PathBuf::from("/tmp/d.log")));
    }

    #[test]
    fn test_unknown_format_falls_back() {
        assert_eq!(LogFormat::parse("xml"), None);
        let settings = LoggingSettings {
            format: Some("xml".to_string()),
            ..LoggingSettings::default()
        };
        assert_eq!(
            LoggingConfig::resolve(Some(&settings), false, env(&[])).format,
            LogFormat::Pretty
        );
    }
}
