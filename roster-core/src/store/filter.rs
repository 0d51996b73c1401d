//! Query filters evaluated against stored documents.

use super::{Document, ID_FIELD};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equals value; a missing field compares equal to null.
    Eq(String, Value),
    Ne(String, Value),
    /// Case-insensitive substring match on a string field.
    ContainsIgnoreCase(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::ContainsIgnoreCase(field.into(), needle.into())
    }

    pub fn by_id(id: &str) -> Self {
        Filter::eq(ID_FIELD, id)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => doc.get(field).unwrap_or(&Value::Null) == value,
            Filter::Ne(field, value) => doc.get(field).unwrap_or(&Value::Null) != value,
            Filter::ContainsIgnoreCase(field, needle) => match doc.get(field) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_treats_missing_as_null() {
        let d = doc(json!({"EMAIL_ADDRESS": "a@x.com"}));
        assert!(Filter::eq("EMAIL_ADDRESS", "a@x.com").matches(&d));
        assert!(Filter::Eq("PHONE_NUMBER".into(), Value::Null).matches(&d));
        assert!(!Filter::eq("PHONE_NUMBER", "123").matches(&d));
    }

    #[test]
    fn test_contains_ignore_case() {
        let d = doc(json!({"DEPARTMENT": "Research & Development", "AGE": 30}));
        assert!(Filter::contains("DEPARTMENT", "research").matches(&d));
        assert!(!Filter::contains("DEPARTMENT", "sales").matches(&d));
        assert!(!Filter::contains("AGE", "30").matches(&d));
    }

    #[test]
    fn test_and_or() {
        let d = doc(json!({"ROLE": "Engineer", "IS_PART_TIME": "No"}));
        let both =
            Filter::And(vec![Filter::contains("ROLE", "eng"), Filter::eq("IS_PART_TIME", "No")]);
        assert!(both.matches(&d));
        let either =
            Filter::Or(vec![Filter::contains("ROLE", "sales"), Filter::eq("IS_PART_TIME", "Yes")]);
        assert!(!either.matches(&d));
        assert!(Filter::And(vec![]).matches(&d));
    }
}
