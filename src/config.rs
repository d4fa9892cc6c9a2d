//! Configuration management for duststat hosts.
//!
//! Configuration is layered from:
//! 1. Built-in defaults
//! 2. An optional configuration file (TOML, JSON or YAML by extension)
//! 3. Environment variables prefixed with `DUSTSTAT__`
//!    (e.g. `DUSTSTAT__CODEC__FORMAT=yaml`, `DUSTSTAT__LOGGING__LEVEL=debug`)
//!
//! Later sources override earlier ones.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text format used when rendering cube documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

/// Document codec settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Output text format
    #[serde(default)]
    pub format: DocumentFormat,
    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    /// Refresh the checksum metadata before encoding
    #[serde(default)]
    pub stamp_checksum: bool,
    /// Reject documents whose stored checksum does not match their content
    #[serde(default = "default_verify_checksum")]
    pub verify_checksum: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format: DocumentFormat::default(),
            pretty: default_pretty(),
            stamp_checksum: false,
            verify_checksum: default_verify_checksum(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when no filter directive matches
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional `EnvFilter` directives, e.g. `duststat_core=trace`
    #[serde(default)]
    pub filter: Option<String>,
    /// Include source file and line in log lines
    #[serde(default)]
    pub with_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            filter: None,
            with_file: false,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DustConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub codec: CodecConfig,
}

impl DustConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("logging.level", default_log_level())?
            .set_default("codec.format", "json")?
            .set_default("codec.pretty", default_pretty())?
            .set_default("codec.stamp_checksum", false)?
            .set_default("codec.verify_checksum", default_verify_checksum())?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("DUSTSTAT")
                .prefix_separator("__")
                .separator("__"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

fn default_pretty() -> bool {
    true
}

fn default_verify_checksum() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = DustConfig::default();
        assert_eq!(config.codec.format, DocumentFormat::Json);
        assert!(config.codec.pretty);
        assert!(config.codec.verify_checksum);
        assert!(!config.codec.stamp_checksum);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[codec]\nformat = \"yaml\"\nstamp_checksum = true\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = DustConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.codec.format, DocumentFormat::Yaml);
        assert!(config.codec.stamp_checksum);
        assert!(config.codec.verify_checksum);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.filter, None);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[codec]\nformat = \"json\"\npretty = false").unwrap();

        std::env::set_var("DUSTSTAT__CODEC__FORMAT", "yaml");
        let loaded = DustConfig::load(Some(file.path()));
        std::env::remove_var("DUSTSTAT__CODEC__FORMAT");

        let config = loaded.unwrap();
        assert_eq!(config.codec.format, DocumentFormat::Yaml);
        assert!(!config.codec.pretty);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(DustConfig::load(Some(&missing)).is_err());
    }
}
