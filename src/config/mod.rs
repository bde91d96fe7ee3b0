//! Executor configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!     "max_placeholders": 999,
//!     "max_result_rows": 10000,
//!     "log_statements": false
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Event, Logger};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Read { path: String, error: std::io::Error },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "SQL_CONFIG_READ",
            ConfigError::Parse(_) => "SQL_CONFIG_PARSE",
            ConfigError::Invalid(_) => "SQL_CONFIG_INVALID",
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Statement executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Most placeholder values a single call may supply
    #[serde(default = "default_max_placeholders")]
    pub max_placeholders: usize,

    /// Most rows a SELECT may return (unlimited when absent)
    #[serde(default)]
    pub max_result_rows: Option<usize>,

    /// Log statement begin/complete at INFO instead of TRACE
    #[serde(default)]
    pub log_statements: bool,
}

fn default_max_placeholders() -> usize {
    999
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_placeholders: default_max_placeholders(),
            max_result_rows: None,
            log_statements: false,
        }
    }
}

impl ExecutorConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;

        let config = Self::from_json(&content)?;

        let source = path.display().to_string();
        Logger::event(Event::ConfigLoaded, &[("path", source.as_str())]);

        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ExecutorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate limits
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_placeholders == 0 {
            return Err(ConfigError::Invalid(
                "max_placeholders must be > 0".to_string(),
            ));
        }

        if self.max_result_rows == Some(0) {
            return Err(ConfigError::Invalid(
                "max_result_rows must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("aerosql.json");
        fs::write(&config_path, "{}").unwrap();

        let config = ExecutorConfig::load(&config_path).unwrap();
        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.max_placeholders, 999);
        assert_eq!(config.max_result_rows, None);
        assert!(!config.log_statements);
    }

    #[test]
    fn test_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("aerosql.json");
        let config = json!({
            "max_placeholders": 16,
            "max_result_rows": 100,
            "log_statements": true
        });
        fs::write(&config_path, config.to_string()).unwrap();

        let config = ExecutorConfig::load(&config_path).unwrap();
        assert_eq!(config.max_placeholders, 16);
        assert_eq!(config.max_result_rows, Some(100));
        assert!(config.log_statements);
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        let err = ExecutorConfig::from_json(r#"{"max_placeholders": 0}"#).unwrap_err();
        assert_eq!(err.code(), "SQL_CONFIG_INVALID");

        let err = ExecutorConfig::from_json(r#"{"max_result_rows": 0}"#).unwrap_err();
        assert_eq!(err.code(), "SQL_CONFIG_INVALID");
    }

    #[test]
    fn test_config_invalid_json() {
        let err = ExecutorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ExecutorConfig::load(&temp_dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code(), "SQL_CONFIG_READ");
    }
}
