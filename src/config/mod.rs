//! Configuration management for keypage
//!
//! This module handles loading, parsing, and validating configuration from:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments (applied by the CLI)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::ordering::OrderingSpec;
use crate::utils::number::parse_positive_int;

/// Environment variable overriding `pagination.page_size`
pub const ENV_PAGE_SIZE: &str = "KEYPAGE_PAGE_SIZE";
/// Environment variable overriding `pagination.offset_cutoff`
pub const ENV_OFFSET_CUTOFF: &str = "KEYPAGE_OFFSET_CUTOFF";
/// Environment variable overriding `connection.uri`
pub const ENV_URI: &str = "KEYPAGE_URI";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "KEYPAGE_LOG_LEVEL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pagination configuration
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paging behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Number of items per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound for the tie-skip offset a token may request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_cutoff: Option<u64>,

    /// Default ordering, e.g. `-created,_id`
    #[serde(default = "default_ordering")]
    pub ordering: String,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Default MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Application name reported to the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_page_size() -> usize {
    20
}

fn default_ordering() -> String {
    "-_id".to_string()
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            offset_cutoff: None,
            ordering: default_ordering(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            timeout: default_timeout(),
            app_name: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Explicit config path; `None` uses [`Config::default_path`]
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration. A missing default file
    ///   yields defaults; a missing explicit file is an error.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Render configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Apply `KEYPAGE_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, if set
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            self.pagination.page_size = parse_positive_int(&value, true, None)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid(ENV_PAGE_SIZE, &value))?;
        }

        if let Some(value) = lookup(ENV_OFFSET_CUTOFF) {
            self.pagination.offset_cutoff = Some(
                parse_positive_int(&value, true, None)
                    .ok_or_else(|| invalid(ENV_OFFSET_CUTOFF, &value))?,
            );
        }

        if let Some(value) = lookup(ENV_URI) {
            self.connection.uri = value;
        }

        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = LogLevel::parse(&value).ok_or_else(|| invalid(ENV_LOG_LEVEL, &value))?;
        }

        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.keypage/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".keypage")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_size == 0 {
            return Err(invalid("pagination.page_size", "0").into());
        }

        if self.pagination.offset_cutoff == Some(0) {
            return Err(invalid("pagination.offset_cutoff", "0").into());
        }

        self.pagination.ordering_spec()?;

        if !self.connection.uri.starts_with("mongodb://")
            && !self.connection.uri.starts_with("mongodb+srv://")
        {
            return Err(invalid("connection.uri", &self.connection.uri).into());
        }

        Ok(())
    }
}

impl ConnectionConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl PaginationConfig {
    /// Parse the configured ordering
    pub fn ordering_spec(&self) -> Result<OrderingSpec> {
        OrderingSpec::parse(&self.ordering).map_err(|e| {
            ConfigError::InvalidValue {
                field: "pagination.ordering".to_string(),
                value: format!("{} ({e})", self.ordering),
            }
            .into()
        })
    }
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pagination.page_size, 20);
        assert_eq!(config.pagination.offset_cutoff, None);
        assert_eq!(config.pagination.ordering, "-_id");
        assert_eq!(config.connection.uri, "mongodb://localhost:27017");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pagination]
            page_size = 10
            offset_cutoff = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.pagination.offset_cutoff, Some(500));
        assert_eq!(config.pagination.ordering, "-_id");
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Config::from_toml_str("[pagination\npage_size = ").is_err());
        assert!(Config::from_toml_str("[logging]\nlevel = \"loud\"").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.pagination.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pagination.offset_cutoff = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pagination.ordering = "score,score".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.connection.uri = "http://localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PAGE_SIZE, "15"),
            (ENV_OFFSET_CUTOFF, "100"),
            (ENV_LOG_LEVEL, "DEBUG"),
        ]);

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.pagination.page_size, 15);
        assert_eq!(config.pagination.offset_cutoff, Some(100));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == ENV_PAGE_SIZE).then(|| "0".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.pagination.offset_cutoff = Some(250);

        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.pagination.offset_cutoff, Some(250));
    }

    #[test]
    fn test_connection_timeout() {
        let config = Config::default();
        assert_eq!(config.connection.connect_timeout(), Duration::from_secs(30));
    }
}
