use cucumber::World as CucumberWorld;
use roster_core::config::IngestConfig;
use roster_core::employee::{BatchSummary, UpsertReconciler, EMPLOYEE_COLLECTION};
use roster_core::ingest::{IngestPipeline, IngestReport};
use roster_core::mapping::{MappingDocument, MappingReconciler};
use roster_core::store::{Document, DocumentStore, Filter, FindOptions, MemoryStore};
use roster_core::Error;
use std::sync::Arc;

/// Scenario state: one in-memory store per scenario, plus the last outcome.
#[derive(Debug, CucumberWorld)]
pub struct RosterWorld {
    pub store: Arc<MemoryStore>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub last_report: Option<IngestReport>,
    pub last_error: Option<Error>,
    pub summary: BatchSummary,
}

impl Default for RosterWorld {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            headers: Vec::new(),
            rows: Vec::new(),
            last_report: None,
            last_error: None,
            summary: BatchSummary::default(),
        }
    }
}

impl RosterWorld {
    pub fn pipeline(&self) -> IngestPipeline<Arc<MemoryStore>> {
        IngestPipeline::new(self.store.clone(), IngestConfig::default())
    }

    pub fn mappings(&self) -> MappingReconciler<Arc<MemoryStore>> {
        MappingReconciler::new(self.store.clone())
    }

    pub fn upserts(&self) -> UpsertReconciler<Arc<MemoryStore>> {
        UpsertReconciler::new(self.store.clone())
    }

    /// Render the pending table as CSV bytes.
    pub fn csv(&self) -> Vec<u8> {
        let mut out = self.headers.join(",");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out.into_bytes()
    }

    pub async fn upload(&mut self, mapping_uuid: Option<String>) {
        let csv = self.csv();
        match self.pipeline().ingest_file("roster.csv", &csv, mapping_uuid.as_deref()).await {
            Ok(report) => {
                self.last_report = Some(report);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err),
        }
    }

    pub fn report(&self) -> &IngestReport {
        match &self.last_report {
            Some(report) => report,
            None => panic!("no successful upload; last error: {:?}", self.last_error),
        }
    }

    pub async fn mapping(&self) -> MappingDocument {
        let uuid = &self.report().mapping.uuid;
        self.mappings().find(uuid).await.expect("mapping lookup").expect("mapping exists")
    }

    pub async fn employees(&self) -> Vec<Document> {
        self.store
            .find(EMPLOYEE_COLLECTION, &Filter::All, FindOptions::default())
            .await
            .expect("employee lookup")
    }
}
