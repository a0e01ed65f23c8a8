use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dialect-level options, usually read from `config.toml`.
///
/// ```toml
/// raw_colnames = true
/// array_as_tuple = false
/// default_schema = "analytics"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Keep dotted result column names (`tbl.col`) verbatim instead of
    /// looking them up by their rightmost segment.
    pub raw_colnames: bool,
    /// Return reflected array results as tuples rather than lists.
    pub array_as_tuple: bool,
    /// Schema used for reflection when a table or listing names none.
    /// Empty leaves names unqualified, resolving against the session's
    /// current database.
    pub default_schema: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            raw_colnames: false,
            array_as_tuple: false,
            default_schema: String::from("default"),
        }
    }
}

impl DialectConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse dialect configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dialect config: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hive-dialect")
            .join("config.toml")
    }

    /// Load from [`config_path`](Self::config_path), falling back to defaults
    /// when no file exists.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize dialect configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DialectConfig::default();
        assert!(!config.raw_colnames);
        assert!(!config.array_as_tuple);
        assert_eq!(config.default_schema, "default");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DialectConfig::from_toml_str("raw_colnames = true").unwrap();
        assert!(config.raw_colnames);
        assert_eq!(config.default_schema, "default");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DialectConfig {
            raw_colnames: true,
            array_as_tuple: true,
            default_schema: "analytics".into(),
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(DialectConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(DialectConfig::from_toml_str("raw_colnames = \"yes\"").is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let path = std::env::temp_dir().join("hive-dialect-does-not-exist.toml");
        assert!(DialectConfig::load(&path).is_err());
    }
}
