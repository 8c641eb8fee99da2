//! TOML configuration for the intake driver.
//!
//! Every key is optional:
//!
//! ```toml
//! log_level = "info"
//! log_file = "intake.log"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "admissions.db"
//!
//! [form]
//! validation = "strict"
//! revalidate_all_on_submit = true
//! submission_timeout_ms = 5000
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use admission_core::FormConfig;
use admission_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub form: FormConfig,
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                backend: "sqlite".to_string(),
                connection_string: "admissions.db".to_string(),
            },
            form: FormConfig::default(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use admission_core::ValidationPolicy;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn nested_tables_override_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [database]
            backend = "memory"

            [form]
            validation = "strict"
            submission_timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.database.backend, "memory");
        assert_eq!(cfg.database.connection_string, ":memory:");
        assert_eq!(cfg.form.validation, ValidationPolicy::Strict);
        assert_eq!(cfg.form.submission_timeout_ms, 2500);
        assert!(!cfg.form.revalidate_all_on_submit);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        assert!(AppConfig::from_toml("[form]\nvalidation = \"paranoid\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
