//! Configuration file
//!
//! Optional TOML file with defaults for the command line:
//!
//! ```toml
//! schema_dir = "/srv/schemata"
//! service_version = "1.4.0"
//! log_level = "info"
//! output = "out/model.sql"
//! ```
//!
//! Flags given on the command line always win over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of `<model>/<version>.json` documents
    pub schema_dir: Option<PathBuf>,

    /// Recorded in audit rows when no `--service-version` is given
    pub service_version: Option<String>,

    /// Log filter used when neither `--log` nor `RUST_LOG` is set
    pub log_level: Option<String>,

    /// Default script destination
    pub output: Option<PathBuf>,
}

impl Config {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            schema_dir = "/srv/schemata"
            service_version = "1.4.0"
            log_level = "info"
            "#,
        )
        .unwrap();
        assert_eq!(config.schema_dir, Some(PathBuf::from("/srv/schemata")));
        assert_eq!(config.service_version.as_deref(), Some("1.4.0"));
        assert_eq!(config.output, None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("schema_directory = \"x\"").is_err());
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ddlgen.toml");
        std::fs::write(&path, "output = \"model.sql\"\n").unwrap();

        let config = Config::load_optional(Some(&path)).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("model.sql")));
        assert_eq!(Config::load_optional(None).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
