//! The upload pipeline: read, build, classify, map and upsert.
//!
//! Every check that can reject an upload runs before the first store write,
//! so a failing batch leaves both collections untouched.

use super::reader::{self, FileKind};
use super::table::TabularSource;
use super::{classifier, factory};
use crate::config::IngestConfig;
use crate::employee::validation::{required_labels, validate_data};
use crate::employee::{BatchSummary, UpsertReconciler};
use crate::mapping::{MappingDocument, MappingReconciler};
use crate::record::DynamicRecord;
use crate::store::DocumentStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRef {
    pub uuid: String,
    pub version: String,
}

impl From<&MappingDocument> for MappingRef {
    fn from(mapping: &MappingDocument) -> Self {
        Self { uuid: mapping.uuid.clone(), version: mapping.version.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub file_info: FileInfo,
    pub summary: BatchSummary,
    pub mapping: MappingRef,
}

pub struct IngestPipeline<S> {
    config: IngestConfig,
    upload_dir: Option<PathBuf>,
    mappings: MappingReconciler<S>,
    upserts: UpsertReconciler<S>,
}

impl<S: DocumentStore + Clone> IngestPipeline<S> {
    pub fn new(store: S, config: IngestConfig) -> Self {
        Self {
            config,
            upload_dir: None,
            mappings: MappingReconciler::new(store.clone()),
            upserts: UpsertReconciler::new(store),
        }
    }

    /// Keep a copy of every accepted upload under `dir`.
    pub fn with_upload_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.upload_dir = dir;
        self
    }

    /// Ingest raw file bytes; `mapping_uuid` names an existing mapping to fold into.
    pub async fn ingest_file(
        &self,
        filename: &str,
        bytes: &[u8],
        mapping_uuid: Option<&str>,
    ) -> Result<IngestReport> {
        let kind = FileKind::from_filename(filename, &self.config.allowed_extensions)?;
        if let Some(dir) = &self.upload_dir {
            let path = dir.join(secure_filename(filename));
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, bytes).await?;
            log::info!("Saved upload to {}", path.display());
        }
        let source = reader::read_source(kind, bytes, self.config.all_sheets)?;
        self.ingest_source(filename, &source, mapping_uuid).await
    }

    pub async fn ingest_source(
        &self,
        filename: &str,
        source: &TabularSource,
        mapping_uuid: Option<&str>,
    ) -> Result<IngestReport> {
        let records = factory::build(source)?;
        self.ingest_records(filename, &records, mapping_uuid).await
    }

    pub async fn ingest_records(
        &self,
        filename: &str,
        records: &[DynamicRecord],
        mapping_uuid: Option<&str>,
    ) -> Result<IngestReport> {
        let required = required_labels(&self.config.rules);
        factory::validate_mandatory(records, &required)?;

        let column_names: Vec<String> =
            records[0].columns().into_iter().map(str::to_string).collect();
        let classified = classifier::classify(&required, &column_names)?;

        if self.config.validate_rows {
            self.validate_rows(records)?;
        }

        let mapping = match mapping_uuid {
            Some(uuid) => {
                if self.mappings.find(uuid).await?.is_none() {
                    return Err(Error::NotFound("Profile mapping not found".to_string()));
                }
                self.mappings.absorb(uuid, &classified).await?
            }
            None => self.mappings.create(classified).await?,
        };

        let summary = self.upserts.upsert_batch(records).await?;
        log::info!(
            "Ingested '{}': {} rows, mapping {} at version {}",
            filename,
            records.len(),
            mapping.uuid,
            mapping.version
        );

        Ok(IngestReport {
            file_info: FileInfo {
                filename: filename.to_string(),
                rows: records.len(),
                columns: column_names.len(),
                column_names,
            },
            summary,
            mapping: MappingRef::from(&mapping),
        })
    }

    fn validate_rows(&self, records: &[DynamicRecord]) -> Result<()> {
        let errors: Vec<String> = records
            .iter()
            .enumerate()
            .flat_map(|(index, record)| {
                validate_data(&record.to_engine_document(), &self.config.rules)
                    .into_iter()
                    .map(move |message| format!("row {}: {}", index + 1, message))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(format!("{} row violations in upload", errors.len()), errors))
        }
    }
}

/// Reduce an uploaded filename to a safe basename.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
