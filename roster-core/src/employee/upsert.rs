//! Upload-time persistence of ingested rows.
//!
//! Rows are matched on the compound (EMAIL_ADDRESS, PHONE_NUMBER) key and
//! replaced in place or inserted. This is not the email-only uniqueness
//! check that [`super::EmployeeService::create`] applies.

use super::{EMAIL_ADDRESS, EMPLOYEE_COLLECTION, PHONE_NUMBER};
use crate::record::DynamicRecord;
use crate::store::{DocumentStore, Filter, ReplaceOutcome};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-batch counts reported back to the uploader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Matched an existing record with identical content.
    pub unchanged: usize,
    /// Rows without an email address.
    pub skipped: usize,
}

impl BatchSummary {
    pub fn record(&mut self, decision: &UpsertDecision) {
        match decision {
            UpsertDecision::Inserted(_) => self.inserted += 1,
            UpsertDecision::Updated => self.updated += 1,
            UpsertDecision::Unchanged => self.unchanged += 1,
            UpsertDecision::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertDecision {
    Inserted(String),
    Updated,
    Unchanged,
    Skipped,
}

pub struct UpsertReconciler<S> {
    store: S,
}

impl<S: DocumentStore> UpsertReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn upsert_record(&self, record: &DynamicRecord) -> Result<UpsertDecision> {
        let doc = record.to_engine_document();

        let email = doc.get(EMAIL_ADDRESS).cloned().unwrap_or(Value::Null);
        let has_email = match &email {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        };
        if !has_email {
            log::warn!("Skipping row without {}: {:?}", EMAIL_ADDRESS, record.columns());
            return Ok(UpsertDecision::Skipped);
        }
        let phone = doc.get(PHONE_NUMBER).cloned().unwrap_or(Value::Null);

        let key = Filter::And(vec![
            Filter::Eq(EMAIL_ADDRESS.into(), email),
            Filter::Eq(PHONE_NUMBER.into(), phone),
        ]);
        let decision = match self.store.replace_one(EMPLOYEE_COLLECTION, &key, doc, true).await? {
            ReplaceOutcome::Inserted(id) => UpsertDecision::Inserted(id),
            ReplaceOutcome::Replaced { modified: true } => UpsertDecision::Updated,
            ReplaceOutcome::Replaced { modified: false } | ReplaceOutcome::NotMatched => {
                UpsertDecision::Unchanged
            }
        };
        Ok(decision)
    }

    /// Upsert every record in order. A store failure aborts the remainder.
    pub async fn upsert_batch(&self, records: &[DynamicRecord]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for record in records {
            let decision = self.upsert_record(record).await?;
            summary.record(&decision);
        }
        log::info!(
            "Upserted batch: {} inserted, {} updated, {} unchanged, {} skipped",
            summary.inserted,
            summary.updated,
            summary.unchanged,
            summary.skipped
        );
        Ok(summary)
    }
}
