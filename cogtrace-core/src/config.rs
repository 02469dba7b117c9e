//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/cogtrace/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/cogtrace/` (~/.config/cogtrace/)
//! - State/Logs: `$XDG_STATE_HOME/cogtrace/` (~/.local/state/cogtrace/)
//!
//! Every section is optional. A missing file means defaults throughout.

use crate::analytics::catalog::DEFAULT_RADIUS;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Log loading behaviour
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Report sizes
    #[serde(default)]
    pub report: ReportConfig,

    /// Timeline bucket widths
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// User pattern categories
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Log loading configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct IngestConfig {
    /// Skip malformed lines instead of failing the load
    #[serde(default)]
    pub lenient: bool,
}

/// Report configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Entries in top-N lists (tools, transitions, files)
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Example contexts shown per pattern category
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Learning moment contexts shown
    #[serde(default = "default_learning_samples")]
    pub learning_samples: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            sample_count: default_sample_count(),
            learning_samples: default_learning_samples(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_sample_count() -> usize {
    2
}

fn default_learning_samples() -> usize {
    3
}

/// Timeline bucket widths, in whole minutes
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    #[serde(default = "default_activity_bucket_minutes")]
    pub activity_bucket_minutes: u32,

    #[serde(default = "default_intensity_bucket_minutes")]
    pub intensity_bucket_minutes: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            activity_bucket_minutes: default_activity_bucket_minutes(),
            intensity_bucket_minutes: default_intensity_bucket_minutes(),
        }
    }
}

fn default_activity_bucket_minutes() -> u32 {
    2
}

fn default_intensity_bucket_minutes() -> u32 {
    1
}

/// `[patterns]` section
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatternsConfig {
    /// Appended to the built-in cognitive categories
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// One `[[patterns.categories]]` entry
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    pub name: String,

    /// Context radius in characters
    #[serde(default = "default_radius")]
    pub radius: usize,

    /// Case-insensitive literal indicators
    #[serde(default)]
    pub substrings: Vec<String>,

    /// Case-insensitive regular expression indicators
    #[serde(default)]
    pub regexes: Vec<String>,
}

fn default_radius() -> usize {
    DEFAULT_RADIUS
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate values serde cannot check on its own.
    ///
    /// Pattern syntax is checked later, when the catalog is compiled.
    pub fn validate(&self) -> Result<()> {
        if self.timeline.activity_bucket_minutes == 0 {
            return Err(Error::Config(
                "timeline.activity_bucket_minutes must be at least 1".to_string(),
            ));
        }
        if self.timeline.intensity_bucket_minutes == 0 {
            return Err(Error::Config(
                "timeline.intensity_bucket_minutes must be at least 1".to_string(),
            ));
        }
        if self.report.top_n == 0 {
            return Err(Error::Config("report.top_n must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for category in &self.patterns.categories {
            if category.substrings.is_empty() && category.regexes.is_empty() {
                return Err(Error::Config(format!(
                    "patterns category '{}' has no substrings or regexes",
                    category.name
                )));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(Error::Config(format!(
                    "patterns category '{}' is defined twice",
                    category.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/cogtrace/config.toml` (~/.config/cogtrace/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("cogtrace").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/cogtrace/` (~/.local/state/cogtrace/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("cogtrace")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/cogtrace/cogtrace.log` (~/.local/state/cogtrace/cogtrace.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("cogtrace.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// Called by the binaries before anything reads these variables.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
