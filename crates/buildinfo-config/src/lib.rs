#![deny(unsafe_code)]

//! Configuration loading and validation for buildinfo.
//!
//! Loads an optional TOML file (conventionally `buildinfo.toml`) that sets
//! defaults for the command-line tool. Every section is optional; command
//! line flags take precedence over whatever is configured here.
//!
//! ```toml
//! [record]
//! file_path = "./out/build-info.json"
//!
//! [labels]
//! namespace = "com.acme.api"
//!
//! [git]
//! bin = "/usr/bin/git"
//! repo_dir = "."
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "buildinfo.toml";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildInfoConfig {
    /// Where the record is persisted.
    #[serde(default)]
    pub record: RecordConfig,

    /// Label encoding options.
    #[serde(default)]
    pub labels: LabelsConfig,

    /// How git is invoked for derived fields.
    #[serde(default)]
    pub git: GitConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Path of the build info file.
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
        }
    }
}

fn default_file_path() -> String {
    buildinfo_core::DEFAULT_FILE_PATH.to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    /// Namespace placed in front of the fixed label segment, e.g. `com.acme`.
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    /// git executable, resolved via `PATH` when not absolute.
    #[serde(default = "default_git_bin")]
    pub bin: String,

    /// Repository working directory queried for derived fields.
    #[serde(default = "default_repo_dir")]
    pub repo_dir: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            bin: default_git_bin(),
            repo_dir: default_repo_dir(),
        }
    }
}

fn default_git_bin() -> String {
    "git".to_string()
}

fn default_repo_dir() -> String {
    ".".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "warn", "info", "debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl BuildInfoConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: BuildInfoConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record.file_path.is_empty() {
            return Err(ConfigError::Validation(
                "record.file_path must not be empty".to_string(),
            ));
        }
        if self.git.bin.is_empty() {
            return Err(ConfigError::Validation(
                "git.bin must not be empty".to_string(),
            ));
        }
        if self.git.repo_dir.is_empty() {
            return Err(ConfigError::Validation(
                "git.repo_dir must not be empty".to_string(),
            ));
        }
        if let Some(ns) = &self.labels.namespace {
            if ns.is_empty() || ns.starts_with('.') || ns.ends_with('.') {
                return Err(ConfigError::Validation(format!(
                    "labels.namespace must be non-empty without leading or trailing dots, got {ns:?}"
                )));
            }
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                VALID_LOG_LEVELS, self.logging.level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BuildInfoConfig::default();
        assert_eq!(config.record.file_path, buildinfo_core::DEFAULT_FILE_PATH);
        assert_eq!(config.labels.namespace, None);
        assert_eq!(config.git.bin, "git");
        assert_eq!(config.git.repo_dir, ".");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = BuildInfoConfig::parse("").unwrap();
        assert_eq!(config, BuildInfoConfig::default());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [record]
            file_path = "out/build-info.json"

            [labels]
            namespace = "com.acme"

            [git]
            bin = "/opt/git/bin/git"
            repo_dir = "../service"

            [logging]
            level = "debug"
        "#;
        let config = BuildInfoConfig::parse(toml).unwrap();
        assert_eq!(config.record.file_path, "out/build-info.json");
        assert_eq!(config.labels.namespace.as_deref(), Some("com.acme"));
        assert_eq!(config.git.bin, "/opt/git/bin/git");
        assert_eq!(config.git.repo_dir, "../service");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_empty_file_path() {
        let toml = r#"
            [record]
            file_path = ""
        "#;
        assert!(matches!(
            BuildInfoConfig::parse(toml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validation_rejects_dotted_namespace_edges() {
        for ns in ["", ".acme", "acme."] {
            let toml = format!("[labels]\nnamespace = {ns:?}\n");
            assert!(
                BuildInfoConfig::parse(&toml).is_err(),
                "namespace {ns:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validation_rejects_unknown_log_level() {
        let toml = r#"
            [logging]
            level = "loud"
        "#;
        assert!(BuildInfoConfig::parse(toml).is_err());
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            BuildInfoConfig::parse("[record"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test_log::test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[labels]\nnamespace = \"org.example\"\n").unwrap();

        let config = BuildInfoConfig::load(&path).unwrap();
        assert_eq!(config.labels.namespace.as_deref(), Some("org.example"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = BuildInfoConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
