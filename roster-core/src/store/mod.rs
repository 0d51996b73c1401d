//! Document store seam.
//!
//! Two collections are used: employee records and column-mapping documents.
//! Every write touches a single document and is atomic under the store lock;
//! multi-step fetch-modify-write sequences built on top are not.

mod collection;
pub mod file;
pub mod filter;
pub mod memory;

pub use file::FileStore;
pub use filter::Filter;
pub use memory::MemoryStore;

use crate::config::StorageConfig;
use crate::Result;
use std::sync::Arc;

/// A stored document: flat JSON object, identified by [`ID_FIELD`].
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Store handle shared across request handlers.
pub type SharedStore = Arc<dyn DocumentStore>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn limit(limit: usize) -> Self {
        Self { skip: 0, limit: Some(limit) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// Result of a replace-with-upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced { modified: bool },
    Inserted(String),
    /// No match and upsert disabled.
    NotMatched,
}

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(collection, filter, FindOptions::limit(1)).await?.into_iter().next())
    }

    /// Insert and return the document's `_id`.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String>;

    /// Set the given fields on the first matching document.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateResult>;

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome>;

    /// Remove the first matching document and return it.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;
}

#[async_trait::async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        (**self).find(collection, filter, options).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String> {
        (**self).insert_one(collection, doc).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateResult> {
        (**self).update_one(collection, filter, fields).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome> {
        (**self).replace_one(collection, filter, doc, upsert).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        (**self).delete_one(collection, filter).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        (**self).count(collection, filter).await
    }
}

/// Open the backend selected by configuration.
pub fn open_store(config: &StorageConfig) -> Result<SharedStore> {
    match config.backend.as_str() {
        "memory" => {
            log::info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        _ => {
            let store = FileStore::open(&config.data_dir)?.with_fsync(config.fsync_on_write);
            Ok(Arc::new(store))
        }
    }
}
