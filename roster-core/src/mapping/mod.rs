//! Versioned column-mapping documents.
//!
//! A mapping document records, per upload shape, which columns are required
//! and which are optional, with user-editable labels and descriptions.

pub mod reconciler;

pub use reconciler::{MappingReconciler, ReconcileOutcome};

use crate::store::Document;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MAPPING_COLLECTION: &str = "employee_column_mapping";

/// Display metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub label: String,
    pub engine_name: String,
    #[serde(default)]
    pub description: String,
}

impl ColumnDescriptor {
    pub fn new(label: impl Into<String>, engine_name: impl Into<String>) -> Self {
        Self { label: label.into(), engine_name: engine_name.into(), description: String::new() }
    }
}

pub type ColumnSet = IndexMap<String, ColumnDescriptor>;

/// Which partition a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Required,
    NonRequired,
}

impl Bucket {
    pub fn other(self) -> Self {
        match self {
            Bucket::Required => Bucket::NonRequired,
            Bucket::NonRequired => Bucket::Required,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Bucket::Required => "required",
            Bucket::NonRequired => "non-required",
        }
    }
}

/// Classifier output: observed columns partitioned by engine name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedColumns {
    pub required_columns: ColumnSet,
    pub non_required_columns: ColumnSet,
}

impl ClassifiedColumns {
    pub fn bucket(&self, bucket: Bucket) -> &ColumnSet {
        match bucket {
            Bucket::Required => &self.required_columns,
            Bucket::NonRequired => &self.non_required_columns,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut ColumnSet {
        match bucket {
            Bucket::Required => &mut self.required_columns,
            Bucket::NonRequired => &mut self.non_required_columns,
        }
    }

    /// Bucket holding `engine_name`, if any.
    pub fn bucket_of(&self, engine_name: &str) -> Option<Bucket> {
        if self.required_columns.contains_key(engine_name) {
            Some(Bucket::Required)
        } else if self.non_required_columns.contains_key(engine_name) {
            Some(Bucket::NonRequired)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// Store identifier; equal to `uuid` for mappings created here.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub uuid: String,
    /// Integer-as-string, starting at "1".
    pub version: String,
    #[serde(flatten)]
    pub columns: ClassifiedColumns,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MappingDocument {
    pub fn new(columns: ClassifiedColumns) -> Self {
        let uuid = uuid::Uuid::new_v4().to_string();
        Self {
            id: Some(uuid.clone()),
            uuid,
            version: "1".to_string(),
            columns,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn next_version(&self) -> Result<String> {
        let current: u64 = self.version.trim().parse().map_err(|_| {
            Error::Persistence(format!(
                "mapping {} has non-numeric version {:?}",
                self.uuid, self.version
            ))
        })?;
        Ok((current + 1).to_string())
    }

    /// Advance the version and stamp `updated_at`.
    pub fn bump(&mut self) -> Result<()> {
        self.version = self.next_version()?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Persistence("mapping did not serialize to an object".to_string())),
        }
    }

    pub fn from_document(doc: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    /// Listing shape: each bucket as an array of descriptors.
    pub fn to_listing(&self) -> Value {
        json!({
            "_id": self.id,
            "uuid": self.uuid,
            "version": self.version,
            "required_columns": self.columns.required_columns.values().collect::<Vec<_>>(),
            "non_required_columns": self.columns.non_required_columns.values().collect::<Vec<_>>(),
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// One user edit to a column descriptor. Edits without `engine_name` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEdit {
    #[serde(default)]
    pub engine_name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ColumnEdit {
    pub fn new(engine_name: &str) -> Self {
        Self { engine_name: Some(engine_name.to_string()), ..Default::default() }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_round_trip_keeps_bucket_order() {
        let mut columns = ClassifiedColumns::default();
        columns.required_columns.insert("NAME".into(), ColumnDescriptor::new("Name", "NAME"));
        let office = ColumnDescriptor::new("Office", "OFFICE");
        columns.non_required_columns.insert("OFFICE".into(), office);
        let mapping = MappingDocument::new(columns);

        let doc = mapping.to_document().unwrap();
        assert!(doc.contains_key("required_columns"));
        assert_eq!(doc["version"], "1");
        assert!(!doc.contains_key("updated_at"));
        assert_eq!(doc["_id"], serde_json::json!(mapping.uuid));
        assert_eq!(MappingDocument::from_document(doc).unwrap(), mapping);
    }

    #[test]
    fn test_bump_increments_version() {
        let mut mapping = MappingDocument::new(ClassifiedColumns::default());
        let created = mapping.created_at;
        mapping.bump().unwrap();
        mapping.bump().unwrap();
        assert_eq!(mapping.version, "3");
        assert_eq!(mapping.created_at, created);
        assert!(mapping.updated_at.is_some());
    }

    #[test]
    fn test_non_numeric_version_is_a_persistence_error() {
        let mut mapping = MappingDocument::new(ClassifiedColumns::default());
        mapping.version = "v2".into();
        assert!(matches!(mapping.bump(), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_listing_uses_arrays() {
        let mut columns = ClassifiedColumns::default();
        columns.required_columns.insert("ROLE".into(), ColumnDescriptor::new("Role", "ROLE"));
        let mapping = MappingDocument::new(columns);
        let listing = mapping.to_listing();
        assert_eq!(listing["_id"], serde_json::json!(mapping.uuid));
        assert_eq!(listing["required_columns"][0]["engine_name"], "ROLE");
        assert_eq!(listing["non_required_columns"], serde_json::json!([]));
    }
}
