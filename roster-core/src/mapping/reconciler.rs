//! Create, absorb and reconcile mapping documents against the store.
//!
//! Reconciliation is a fetch-modify-write on one document. Two concurrent
//! reconciliations of the same uuid can lose an update.

use super::{
    Bucket, ClassifiedColumns, ColumnDescriptor, ColumnEdit, MappingDocument, MAPPING_COLLECTION,
};
use crate::store::{Document, DocumentStore, Filter};
use crate::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Edits applied; carries the stored document at its new version.
    Applied(MappingDocument),
    /// Nothing to change; the document is untouched.
    NoChanges(MappingDocument),
}

pub struct MappingReconciler<S> {
    store: S,
}

impl<S: DocumentStore> MappingReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert a fresh mapping at version "1".
    pub async fn create(&self, columns: ClassifiedColumns) -> Result<MappingDocument> {
        let mapping = MappingDocument::new(columns);
        self.store.insert_one(MAPPING_COLLECTION, mapping.to_document()?).await?;
        log::info!(
            "Created column mapping {} ({} required, {} optional)",
            mapping.uuid,
            mapping.columns.required_columns.len(),
            mapping.columns.non_required_columns.len()
        );
        Ok(mapping)
    }

    pub async fn find(&self, uuid: &str) -> Result<Option<MappingDocument>> {
        match self.store.find_one(MAPPING_COLLECTION, &Filter::eq("uuid", uuid)).await? {
            Some(doc) => Ok(Some(MappingDocument::from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<MappingDocument>> {
        self.store
            .find(MAPPING_COLLECTION, &Filter::All, Default::default())
            .await?
            .into_iter()
            .map(MappingDocument::from_document)
            .collect()
    }

    /// Apply user edits to the mapping `uuid`.
    ///
    /// An edit updates label and description of an existing descriptor in its
    /// bucket, or inserts a new one there. Absent fields keep their stored
    /// value. An edit naming a column held by the other bucket is rejected.
    pub async fn reconcile(
        &self,
        uuid: &str,
        required_edits: &[ColumnEdit],
        non_required_edits: &[ColumnEdit],
    ) -> Result<ReconcileOutcome> {
        let mut mapping = self.load(uuid).await?;

        let mut changed = false;
        let buckets = [
            (Bucket::Required, required_edits),
            (Bucket::NonRequired, non_required_edits),
        ];
        for (bucket, edits) in buckets {
            for edit in edits {
                changed |= apply_edit(&mut mapping.columns, bucket, edit)?;
            }
        }
        if !changed {
            return Ok(ReconcileOutcome::NoChanges(mapping));
        }

        mapping.bump()?;
        if !self.write(&mapping).await? {
            return Ok(ReconcileOutcome::NoChanges(mapping));
        }
        log::info!("Reconciled column mapping {} to version {}", mapping.uuid, mapping.version);
        Ok(ReconcileOutcome::Applied(mapping))
    }

    /// Fold a newly classified upload into an existing mapping.
    ///
    /// Engine names not yet known are added to the bucket the classifier put
    /// them in; known ones keep their bucket, label and description. The
    /// version always advances.
    pub async fn absorb(
        &self,
        uuid: &str,
        classified: &ClassifiedColumns,
    ) -> Result<MappingDocument> {
        let mut mapping = self.load(uuid).await?;

        let mut added = 0;
        for bucket in [Bucket::Required, Bucket::NonRequired] {
            for (engine_name, descriptor) in classified.bucket(bucket) {
                if mapping.columns.bucket_of(engine_name).is_none() {
                    mapping
                        .columns
                        .bucket_mut(bucket)
                        .insert(engine_name.clone(), descriptor.clone());
                    added += 1;
                }
            }
        }

        mapping.bump()?;
        self.write(&mapping).await?;
        log::info!(
            "Absorbed upload into mapping {}: {} new columns, version {}",
            uuid,
            added,
            mapping.version
        );
        Ok(mapping)
    }

    async fn load(&self, uuid: &str) -> Result<MappingDocument> {
        self.find(uuid)
            .await?
            .ok_or_else(|| Error::NotFound("Profile mapping not found".to_string()))
    }

    /// Write the mutable fields back; `created_at` and `uuid` are never rewritten.
    async fn write(&self, mapping: &MappingDocument) -> Result<bool> {
        let mut fields = Document::new();
        let columns = &mapping.columns;
        fields.insert("required_columns".into(), serde_json::to_value(&columns.required_columns)?);
        fields.insert(
            "non_required_columns".into(),
            serde_json::to_value(&columns.non_required_columns)?,
        );
        fields.insert("version".into(), Value::String(mapping.version.clone()));
        fields.insert("updated_at".into(), serde_json::to_value(mapping.updated_at)?);

        let filter = Filter::eq("uuid", mapping.uuid.as_str());
        let result = self.store.update_one(MAPPING_COLLECTION, &filter, fields).await?;
        if result.matched == 0 {
            return Err(Error::NotFound("Profile mapping not found".to_string()));
        }
        Ok(result.modified > 0)
    }
}

/// Apply one edit in place; returns whether the columns changed.
fn apply_edit(
    columns: &mut ClassifiedColumns,
    bucket: Bucket,
    edit: &ColumnEdit,
) -> Result<bool> {
    let Some(engine_name) = edit.engine_name.as_deref().filter(|n| !n.is_empty()) else {
        return Ok(false);
    };

    if columns.bucket(bucket.other()).contains_key(engine_name) {
        return Err(Error::invalid(format!(
            "Column {} is already classified as {}",
            engine_name,
            bucket.other().name()
        )));
    }

    let set = columns.bucket_mut(bucket);
    match set.get_mut(engine_name) {
        Some(existing) => {
            let before = existing.clone();
            if let Some(label) = &edit.label {
                existing.label = label.clone();
            }
            if let Some(description) = &edit.description {
                existing.description = description.clone();
            }
            Ok(*existing != before)
        }
        None => {
            let descriptor = ColumnDescriptor {
                label: edit.label.clone().unwrap_or_default(),
                engine_name: engine_name.to_string(),
                description: edit.description.clone().unwrap_or_default(),
            };
            set.insert(engine_name.to_string(), descriptor);
            Ok(true)
        }
    }
}
