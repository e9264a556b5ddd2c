//! Configuration management.
//!
//! Configuration is read from a TOML file and then overridden by
//! `DEADENDS_*` environment variables. Lookup order for the file:
//!
//! 1. `--config <path>` on the command line
//! 2. `DEADENDS_CONFIG_PATH`
//! 3. Platform config dir (`~/Library/Application Support/deadends/` on macOS)
//! 4. `~/.config/deadends/config.toml`
//!
//! Missing files fall through to built-in defaults.

use crate::validation::{DEFAULT_BASE_URL, FreshnessPolicy, Validator};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DEADENDS_CONFIG_PATH";

/// Main configuration for deadends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadendsConfig {
    /// Directory holding the canon JSON files.
    pub data_dir: PathBuf,
    /// Base url canon urls derive from.
    pub base_url: String,
    /// Search limits.
    pub search: SearchConfig,
    /// Lookup rendering.
    pub lookup: LookupConfig,
    /// Validation thresholds.
    pub validation: ValidationConfig,
    /// Logging and metrics settings.
    pub observability: ObservabilitySettings,
    /// The file this configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Results returned when the caller gives no limit.
    pub default_limit: usize,
    /// Hard cap on results.
    pub max_limit: usize,
}

/// Lookup rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookupConfig {
    /// Matches rendered by the `lookup_error` tool.
    pub max_rendered_matches: usize,
}

/// Validation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationConfig {
    /// Days after which a canon is stale.
    pub stale_after_days: i64,
    /// Days after which a canon is aging.
    pub aging_after_days: i64,
    /// Whether freshness warnings are produced.
    pub freshness_checks: bool,
}

/// Observability section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `deadends=debug`.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Log file path; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

/// Metrics settings from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Whether the Prometheus exporter is installed.
    pub enabled: Option<bool>,
    /// Listener port.
    pub port: Option<u16>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Base url.
    pub base_url: Option<String>,
    /// Search section.
    pub search: Option<ConfigFileSearch>,
    /// Lookup section.
    pub lookup: Option<ConfigFileLookup>,
    /// Validation section.
    pub validation: Option<ConfigFileValidation>,
    /// Observability section.
    pub observability: Option<ObservabilitySettings>,
}

/// Search section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileSearch {
    /// Default result count.
    pub default_limit: Option<usize>,
    /// Hard cap.
    pub max_limit: Option<usize>,
}

/// Lookup section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLookup {
    /// Matches rendered per lookup.
    pub max_rendered_matches: Option<usize>,
}

/// Validation section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileValidation {
    /// Stale threshold in days.
    pub stale_after_days: Option<i64>,
    /// Aging threshold in days.
    pub aging_after_days: Option<i64>,
    /// Whether freshness warnings are produced.
    pub freshness_checks: Option<bool>,
}

impl Default for DeadendsConfig {
    fn default() -> Self {
        let freshness = FreshnessPolicy::default();
        Self {
            data_dir: PathBuf::from("data/canons"),
            base_url: DEFAULT_BASE_URL.to_string(),
            search: SearchConfig {
                default_limit: crate::services::DEFAULT_SEARCH_LIMIT,
                max_limit: crate::services::MAX_SEARCH_LIMIT,
            },
            lookup: LookupConfig {
                max_rendered_matches: 5,
            },
            validation: ValidationConfig {
                stale_after_days: freshness.stale_after_days,
                aging_after_days: freshness.aging_after_days,
                freshness_checks: true,
            },
            observability: ObservabilitySettings::default(),
            source: None,
        }
    }
}

impl DeadendsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration using the full lookup order, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file (`explicit` or
    /// `DEADENDS_CONFIG_PATH`) cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let mut config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML or unknown keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default locations.
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("deadends").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("deadends")
                .join("config.toml"),
        ];
        candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load_from_file(path).ok())
            .unwrap_or_default()
    }

    /// Converts a `ConfigFile` to `DeadendsConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(base_url) = file.base_url {
            config.base_url = base_url;
        }
        if let Some(search) = file.search {
            if let Some(v) = search.default_limit {
                config.search.default_limit = v;
            }
            if let Some(v) = search.max_limit {
                config.search.max_limit = v;
            }
        }
        if let Some(v) = file.lookup.and_then(|l| l.max_rendered_matches) {
            config.lookup.max_rendered_matches = v;
        }
        if let Some(validation) = file.validation {
            if let Some(v) = validation.stale_after_days {
                config.validation.stale_after_days = v;
            }
            if let Some(v) = validation.aging_after_days {
                config.validation.aging_after_days = v;
            }
            if let Some(v) = validation.freshness_checks {
                config.validation.freshness_checks = v;
            }
        }
        if let Some(observability) = file.observability {
            config.observability = observability;
        }

        config
    }

    /// Applies `DEADENDS_DATA_DIR` and `DEADENDS_BASE_URL`.
    ///
    /// Logging and metrics variables are read by the observability layer.
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(dir) = non_empty("DEADENDS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_empty("DEADENDS_BASE_URL") {
            self.base_url = url;
        }
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Freshness thresholds, or `None` when freshness checks are off.
    #[must_use]
    pub const fn freshness_policy(&self) -> Option<FreshnessPolicy> {
        if self.validation.freshness_checks {
            Some(FreshnessPolicy {
                stale_after_days: self.validation.stale_after_days,
                aging_after_days: self.validation.aging_after_days,
            })
        } else {
            None
        }
    }

    /// A validator configured from this configuration.
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new()
            .with_base_url(self.base_url.clone())
            .with_freshness(self.freshness_policy())
    }

    /// Renders the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::operation("render_config", e))
    }
}
