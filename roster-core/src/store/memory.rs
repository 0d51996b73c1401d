//! In-memory document store.

use super::collection::Collection;
use super::{Document, DocumentStore, Filter, FindOptions, ReplaceOutcome, UpdateResult};
use crate::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile store; everything is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map(|c| c.find(filter, options)).unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String> {
        let mut collections = self.collections.write().await;
        Ok(collections.entry(collection.to_string()).or_default().insert(doc))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateResult> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(UpdateResult::default());
        };
        match coll.position(filter) {
            Some(index) => {
                let modified = coll.set_fields(index, fields);
                Ok(UpdateResult { matched: 1, modified: modified as u64 })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        match coll.position(filter) {
            Some(index) => Ok(ReplaceOutcome::Replaced { modified: coll.replace(index, doc) }),
            None if upsert => Ok(ReplaceOutcome::Inserted(coll.insert(doc))),
            None => Ok(ReplaceOutcome::NotMatched),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(coll.position(filter).map(|index| coll.remove(index)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map(|c| c.count(filter)).unwrap_or(0))
    }
}
