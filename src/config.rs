//! Service configuration
//!
//! Read once at process start. Everything has a default except the
//! backend choice, which follows whether a data directory is set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TABLE_NAME_ENV: &str = "TABLE_NAME";
/// Older deployments name the table with this variable instead
pub const LEGACY_TABLE_NAME_ENV: &str = "DYNAMODB_TABLE_NAME";
pub const BASE_PATH_ENV: &str = "BASE_PATH";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("Base path must start with '/': '{0}'")]
    InvalidBasePath(String),

    #[error("Unknown log format: '{0}' (expected 'pretty' or 'json')")]
    InvalidLogFormat(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Table holding user records (default: "users")
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Prefix stripped from request paths before routing (default: none)
    #[serde(default)]
    pub base_path: String,

    /// File-backed table directory; in-memory table when absent
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_table_name() -> String {
    "users".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            base_path: String::new(),
            data_dir: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(table_name) = get(TABLE_NAME_ENV).or_else(|| get(LEGACY_TABLE_NAME_ENV)) {
            config.table_name = table_name;
        }
        if let Some(base_path) = get(BASE_PATH_ENV) {
            config.base_path = base_path;
        }
        config.data_dir = get(DATA_DIR_ENV).map(PathBuf::from);
        if let Some(format) = get(LOG_FORMAT_ENV) {
            config.log_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_table = !self.table_name.is_empty()
            && self.table_name.len() <= 255
            && self
                .table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid_table {
            return Err(ConfigError::InvalidTableName(self.table_name.clone()));
        }

        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::InvalidBasePath(self.base_path.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.table_name, "users");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_env_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TABLE_NAME", "serverless-users"),
            ("BASE_PATH", "/prod"),
            ("DATA_DIR", "/tmp/users"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.table_name, "serverless-users");
        assert_eq!(config.base_path, "/prod");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/users")));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_legacy_table_variable() {
        let config =
            AppConfig::from_lookup(lookup(&[("DYNAMODB_TABLE_NAME", "legacy-users")])).unwrap();
        assert_eq!(config.table_name, "legacy-users");

        let config = AppConfig::from_lookup(lookup(&[
            ("DYNAMODB_TABLE_NAME", "legacy-users"),
            ("TABLE_NAME", "users-v2"),
        ]))
        .unwrap();
        assert_eq!(config.table_name, "users-v2");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("TABLE_NAME", "bad/name")])),
            Err(ConfigError::InvalidTableName(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("BASE_PATH", "prod")])),
            Err(ConfigError::InvalidBasePath(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("LOG_FORMAT", "xml")])),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_serde_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"base_path": "/v1"}"#).unwrap();
        assert_eq!(config.table_name, "users");
        assert_eq!(config.base_path, "/v1");
    }
}
