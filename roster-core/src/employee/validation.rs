//! Field-level validation rules for employee documents.

use crate::store::Document;
use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Email,
    Phone,
    /// One of `valid_values`, typically Yes/No
    BooleanString,
    Integer,
    Float,
    Choice,
}

/// Validation rule for one column, keyed by its engine name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,
}

impl ColumnRule {
    pub fn new(label: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            label: label.to_string(),
            field_type,
            required,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            valid_values: Vec::new(),
        }
    }

    fn yes_no(label: &str) -> Self {
        Self {
            valid_values: vec!["Yes".to_string(), "No".to_string()],
            ..Self::new(label, FieldType::BooleanString, true)
        }
    }
}

/// The stock roster contract.
pub fn default_rules() -> Vec<ColumnRule> {
    vec![
        ColumnRule {
            min_length: Some(2),
            max_length: Some(100),
            ..ColumnRule::new("NAME", FieldType::String, true)
        },
        ColumnRule::new("EMAIL_ADDRESS", FieldType::Email, true),
        ColumnRule::new("ROLE", FieldType::String, true),
        ColumnRule::new("DEPARTMENT", FieldType::String, true),
        ColumnRule::new("PHONE_NUMBER", FieldType::Phone, true),
        ColumnRule::yes_no("IS_PART_TIME"),
        ColumnRule::yes_no("END_OF_PROBATION"),
        ColumnRule { min_value: Some(0.0), ..ColumnRule::new("SALARY", FieldType::Float, false) },
        ColumnRule {
            min_value: Some(16.0),
            max_value: Some(100.0),
            ..ColumnRule::new("AGE", FieldType::Integer, false)
        },
    ]
}

/// Labels of the rules marked required, in rule order.
pub fn required_labels(rules: &[ColumnRule]) -> Vec<String> {
    rules.iter().filter(|r| r.required).map(|r| r.label.clone()).collect()
}

/// Check `doc` against every rule and return all violations.
pub fn validate_data(doc: &Document, rules: &[ColumnRule]) -> Vec<String> {
    let mut errors = Vec::new();

    for rule in rules {
        let label = &rule.label;
        let value = doc.get(label).unwrap_or(&Value::Null);

        if is_blank(value) {
            if rule.required {
                errors.push(format!("{} is required", label));
            }
            continue;
        }

        match rule.field_type {
            FieldType::String => match value.as_str().map(str::trim) {
                Some(s) if !s.is_empty() => check_length(rule, s, &mut errors),
                _ => errors.push(format!("{} must be a non-empty string", label)),
            },
            FieldType::Email => {
                if !value.as_str().is_some_and(|s| EMAIL_RE.is_match(s.trim())) {
                    errors.push(format!("Valid {} is required", label));
                }
            }
            FieldType::Phone => {
                let repr = scalar_repr(value);
                if repr.is_empty() || !repr.chars().all(|c| c.is_ascii_digit()) {
                    errors.push(format!("Valid {} is required", label));
                }
            }
            FieldType::BooleanString | FieldType::Choice => {
                if !value.as_str().is_some_and(|s| rule.valid_values.iter().any(|v| v == s)) {
                    let choices = rule.valid_values.join(", ");
                    errors.push(format!("{} must be one of: {}", label, choices));
                }
            }
            FieldType::Integer => match as_integer(value) {
                Some(n) => check_bounds(rule, n as f64, &mut errors),
                None => errors.push(format!("{} must be a valid integer", label)),
            },
            FieldType::Float => match as_float(value) {
                Some(n) => check_bounds(rule, n, &mut errors),
                None => errors.push(format!("{} must be a valid number", label)),
            },
        }
    }

    errors
}

/// Validate an employee document, failing with the full violation list.
pub fn validate_employee(doc: &Document, rules: &[ColumnRule]) -> Result<()> {
    let errors = validate_data(doc, rules);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::validation("Employee validation failed", errors))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn scalar_repr(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Integral numbers, floats truncated, or strings holding an integer.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn check_length(rule: &ColumnRule, s: &str, errors: &mut Vec<String>) {
    let len = s.chars().count();
    if let Some(min) = rule.min_length {
        if len < min {
            errors.push(format!("{} must be at least {} characters long", rule.label, min));
        }
    }
    if let Some(max) = rule.max_length {
        if len > max {
            errors.push(format!("{} must be no more than {} characters long", rule.label, max));
        }
    }
}

fn check_bounds(rule: &ColumnRule, n: f64, errors: &mut Vec<String>) {
    if let Some(min) = rule.min_value {
        if n < min {
            errors.push(format!("{} must be at least {}", rule.label, format_bound(min)));
        }
    }
    if let Some(max) = rule.max_value {
        if n > max {
            errors.push(format!("{} must be no more than {}", rule.label, format_bound(max)));
        }
    }
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn valid() -> Document {
        doc(json!({
            "NAME": "ADA LOVELACE",
            "EMAIL_ADDRESS": "ada@example.com",
            "ROLE": "Engineer",
            "DEPARTMENT": "Research",
            "PHONE_NUMBER": 5550100,
            "IS_PART_TIME": "No",
            "END_OF_PROBATION": "Yes"
        }))
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(validate_data(&valid(), &default_rules()).is_empty());
    }

    #[test]
    fn test_reports_every_violation() {
        let d = doc(json!({
            "NAME": "A",
            "EMAIL_ADDRESS": "not-an-email",
            "ROLE": "  ",
            "PHONE_NUMBER": "555-0100",
            "IS_PART_TIME": "maybe",
            "END_OF_PROBATION": "No",
            "AGE": 12,
            "SALARY": "lots"
        }));
        let errors = validate_data(&d, &default_rules());
        assert_eq!(
            errors,
            vec![
                "NAME must be at least 2 characters long",
                "Valid EMAIL_ADDRESS is required",
                "ROLE is required",
                "DEPARTMENT is required",
                "Valid PHONE_NUMBER is required",
                "IS_PART_TIME must be one of: Yes, No",
                "SALARY must be a valid number",
                "AGE must be at least 16",
            ]
        );
    }

    #[test]
    fn test_optional_fields_skipped_when_empty() {
        let mut d = valid();
        d.insert("SALARY".into(), json!(""));
        d.insert("AGE".into(), Value::Null);
        assert!(validate_data(&d, &default_rules()).is_empty());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut d = valid();
        d.insert("AGE".into(), json!("42"));
        d.insert("SALARY".into(), json!("52000.50"));
        d.insert("PHONE_NUMBER".into(), json!("0612345678"));
        assert!(validate_data(&d, &default_rules()).is_empty());

        d.insert("AGE".into(), json!("forty"));
        d.insert("SALARY".into(), json!(-1));
        assert_eq!(
            validate_data(&d, &default_rules()),
            vec!["SALARY must be at least 0", "AGE must be a valid integer"]
        );
    }

    #[test]
    fn test_upper_bounds() {
        let mut d = valid();
        d.insert("NAME".into(), json!("X".repeat(101)));
        d.insert("AGE".into(), json!(101));
        assert_eq!(
            validate_data(&d, &default_rules()),
            vec!["NAME must be no more than 100 characters long", "AGE must be no more than 100"]
        );
    }

    #[test]
    fn test_validate_employee_carries_errors() {
        let err = validate_employee(&Document::new(), &default_rules()).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.errors().len(), 7);
    }

    #[test]
    fn test_choice_rule() {
        let rule = ColumnRule {
            valid_values: vec!["Remote".into(), "Onsite".into()],
            ..ColumnRule::new("WORK_MODE", FieldType::Choice, false)
        };
        let errors = validate_data(&doc(json!({"WORK_MODE": "Hybrid"})), &[rule]);
        assert_eq!(errors, vec!["WORK_MODE must be one of: Remote, Onsite"]);
    }

    #[test]
    fn test_required_labels() {
        let labels = required_labels(&default_rules());
        assert_eq!(labels.len(), 7);
        assert!(!labels.contains(&"SALARY".to_string()));
    }
}
