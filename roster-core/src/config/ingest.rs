//! Upload ingestion configuration

use crate::employee::validation::{default_rules, ColumnRule};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;

/// Extensions the reader can decode.
const READABLE_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx", "xlsm", "xlsb", "ods"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Env: ROSTER_ALLOWED_EXTENSIONS (comma-separated)
    pub allowed_extensions: Vec<String>,

    /// Read every worksheet instead of only the first
    /// Env: ROSTER_ALL_SHEETS
    pub all_sheets: bool,

    /// Validate every row against `rules` before writing anything
    /// Env: ROSTER_VALIDATE_ROWS
    pub validate_rows: bool,

    /// Column validation rules; `required` rules define the mandatory columns
    pub rules: Vec<ColumnRule>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["csv".to_string(), "xls".to_string(), "xlsx".to_string()],
            all_sheets: false,
            validate_rows: false,
            rules: default_rules(),
        }
    }
}

impl IngestConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(exts) = env::var("ROSTER_ALLOWED_EXTENSIONS") {
            self.allowed_extensions = exts
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(all) = env::var("ROSTER_ALL_SHEETS") {
            self.all_sheets = all.parse().unwrap_or(false);
        }
        if let Ok(validate) = env::var("ROSTER_VALIDATE_ROWS") {
            self.validate_rows = validate.parse().unwrap_or(false);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.allowed_extensions.is_empty() {
            bail!("Invalid allowed_extensions: at least one extension is required");
        }
        for ext in &self.allowed_extensions {
            if !READABLE_EXTENSIONS.contains(&ext.as_str()) {
                bail!(
                    "Unsupported extension '{}': readable types are {}",
                    ext,
                    READABLE_EXTENSIONS.join(", ")
                );
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.label.trim().is_empty() {
                bail!("Invalid rule: label cannot be empty");
            }
            if !seen.insert(rule.label.as_str()) {
                bail!("Duplicate rule for column '{}'", rule.label);
            }
            if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
                if min > max {
                    bail!("Rule '{}': min_length exceeds max_length", rule.label);
                }
            }
            if let (Some(min), Some(max)) = (rule.min_value, rule.max_value) {
                if min > max {
                    bail!("Rule '{}': min_value exceeds max_value", rule.label);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::validation::FieldType;

    #[test]
    fn test_default_validates() {
        assert!(IngestConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unreadable_extension_rejected() {
        let cfg = IngestConfig { allowed_extensions: vec!["pdf".into()], ..Default::default() };
        assert!(cfg.validate().unwrap_err().to_string().contains("pdf"));
    }

    #[test]
    fn test_rules_from_toml() {
        let cfg: IngestConfig = toml::from_str(
            r#"
allowed_extensions = ["csv"]

[[rules]]
label = "EMAIL_ADDRESS"
type = "email"
required = true

[[rules]]
label = "AGE"
type = "integer"
min_value = 18
"#,
        )
        .unwrap();
        assert_eq!(cfg.rules.len(), 2);
        assert_eq!(cfg.rules[1].field_type, FieldType::Integer);
        assert!(!cfg.rules[1].required);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut cfg = IngestConfig::default();
        let dup = cfg.rules[0].clone();
        cfg.rules.push(dup);
        assert!(cfg.validate().unwrap_err().to_string().contains("Duplicate"));
    }
}
