//! Behavioural switches for the application form.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How strictly field values are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Required fields must be non-blank; nothing else is checked.
    #[default]
    Lenient,
    /// Required checks plus format checks on emails, phones, ages and amounts.
    Strict,
}

/// Form-level configuration, usually read from the `[form]` table of the
/// application config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub validation: ValidationPolicy,
    /// Re-run every step's validator at final submission instead of only
    /// the last step's.
    pub revalidate_all_on_submit: bool,
    /// Upper bound on a single backend write, in milliseconds.
    pub submission_timeout_ms: u64,
}

impl FormConfig {
    pub fn submission_timeout(&self) -> Duration {
        Duration::from_millis(self.submission_timeout_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::Lenient,
            revalidate_all_on_submit: false,
            submission_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_preserves_permissive_behaviour() {
        let cfg = FormConfig::default();
        assert_eq!(cfg.validation, ValidationPolicy::Lenient);
        assert!(!cfg.revalidate_all_on_submit);
        assert_eq!(cfg.submission_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_table_fills_defaults() {
        let cfg: FormConfig = toml::from_str("validation = \"strict\"").unwrap();
        assert_eq!(
            cfg,
            FormConfig {
                validation: ValidationPolicy::Strict,
                ..FormConfig::default()
            }
        );
    }
}
