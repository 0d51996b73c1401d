//! Dynamic record model: one ingested row with arbitrary, self-describing columns.

pub mod normalize;
pub mod value;

pub use normalize::{engine_name, normalize_field_name};
pub use value::Cell;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Index;

static NULL: Value = Value::Null;

/// A stored column value together with the name it arrived under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub original_name: String,
    pub value: Value,
    pub declared_type: String,
}

/// One row, keyed by normalized field name in insertion order.
///
/// Distinct original names that normalize to the same key collide; the last
/// write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicRecord {
    attributes: IndexMap<String, Attribute>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(original_name, cell)` pairs.
    pub fn from_fields<I, K, C>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<Cell>,
    {
        let mut record = Self::new();
        record.update(fields);
        record
    }

    pub fn set_attribute(&mut self, original_name: impl Into<String>, value: impl Into<Cell>) {
        let original_name = original_name.into();
        let cell = value.into();
        let declared_type = cell.declared_type().to_string();
        let key = normalize_field_name(&original_name);
        let attribute = Attribute { original_name, value: cell.into_value(), declared_type };
        self.attributes.insert(key, attribute);
    }

    /// Value stored under `name`, given in original or normalized form.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attribute(name).map(|a| &a.value)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(&normalize_field_name(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.attributes.contains_key(&normalize_field_name(name))
    }

    /// Flat field map keyed by original names, or by normalized names.
    pub fn to_dict(&self, use_original_names: bool) -> Map<String, Value> {
        self.attributes
            .iter()
            .map(|(key, attr)| {
                let name =
                    if use_original_names { attr.original_name.clone() } else { key.clone() };
                (name, attr.value.clone())
            })
            .collect()
    }

    /// Flat field map keyed by engine name, the shape employee documents are stored in.
    pub fn to_engine_document(&self) -> Map<String, Value> {
        self.attributes
            .values()
            .map(|attr| (engine_name(&attr.original_name), attr.value.clone()))
            .collect()
    }

    /// Original column names in insertion order.
    pub fn columns(&self) -> Vec<&str> {
        self.attributes.values().map(|a| a.original_name.as_str()).collect()
    }

    pub fn update<I, K, C>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<Cell>,
    {
        for (name, value) in fields {
            self.set_attribute(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(&self.to_dict(true))?)
    }
}

/// Field-style access: `record["email_address"]`, null when absent.
impl Index<&str> for DynamicRecord {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get_attribute(name).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DynamicRecord {
        DynamicRecord::from_fields([
            ("Name", Cell::from("Ada Lovelace")),
            ("Email Address", Cell::from("ada@example.com")),
            ("Phone Number", Cell::Int(5550100)),
            ("Salary", Cell::Float(f64::NAN)),
        ])
    }

    #[test]
    fn test_lookup_accepts_either_naming_form() {
        let record = sample();
        assert_eq!(record.get_attribute("Email Address"), Some(&json!("ada@example.com")));
        assert_eq!(record.get_attribute("email_address"), Some(&json!("ada@example.com")));
        assert_eq!(record.get_attribute("EMAIL_ADDRESS"), Some(&json!("ada@example.com")));
        assert!(record.has_column("phone number"));
        assert!(!record.has_column("Department"));
        assert_eq!(record.get_attribute("Department"), None);
    }

    #[test]
    fn test_index_returns_null_when_absent() {
        let record = sample();
        assert_eq!(record["name"], json!("Ada Lovelace"));
        assert_eq!(record["missing"], Value::Null);
        assert_eq!(record["salary"], Value::Null);
    }

    #[test]
    fn test_declared_type_is_recorded() {
        let record = sample();
        assert_eq!(record.attribute("Salary").unwrap().declared_type, "float");
        assert_eq!(record.attribute("Phone Number").unwrap().declared_type, "integer");
    }

    #[test]
    fn test_to_dict_round_trips_field_map() {
        let input = json!({
            "Name": "Grace",
            "Email Address": "grace@example.com",
            "Age": 44,
            "Is Part Time": "No",
            "Meta": {"team": "compilers"}
        });
        let map = input.as_object().unwrap().clone();
        let record = DynamicRecord::from_fields(map.clone());
        assert_eq!(record.to_dict(true), map);
    }

    #[test]
    fn test_to_dict_with_normalized_names() {
        let dict = sample().to_dict(false);
        let keys: Vec<&str> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "email_address", "phone_number", "salary"]);
    }

    #[test]
    fn test_engine_document_keys() {
        let doc = sample().to_engine_document();
        assert_eq!(doc["EMAIL_ADDRESS"], json!("ada@example.com"));
        assert_eq!(doc["PHONE_NUMBER"], json!(5550100));
    }

    #[test]
    fn test_colliding_names_last_write_wins() {
        let record =
            DynamicRecord::from_fields([("Email Address", "first"), ("email-address", "second")]);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get_attribute("email_address"), Some(&json!("second")));
        assert_eq!(record.columns(), vec!["email-address"]);
    }

    #[test]
    fn test_update_adds_columns() {
        let mut record = sample();
        record.update([("Department", "Research")]);
        assert_eq!(record.columns().last(), Some(&"Department"));
        assert!(record.to_json().unwrap().contains("\"Department\":\"Research\""));
    }
}
