//! In-memory document collection shared by both store backends.

use super::{Document, Filter, FindOptions, ID_FIELD};
use serde_json::Value;

/// Documents in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    docs: Vec<Document>,
}

impl Collection {
    pub(crate) fn find(&self, filter: &Filter, options: FindOptions) -> Vec<Document> {
        let matching = self.docs.iter().filter(|d| filter.matches(d)).skip(options.skip);
        match options.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        }
    }

    pub(crate) fn position(&self, filter: &Filter) -> Option<usize> {
        self.docs.iter().position(|d| filter.matches(d))
    }

    pub(crate) fn count(&self, filter: &Filter) -> u64 {
        self.docs.iter().filter(|d| filter.matches(d)).count() as u64
    }

    pub(crate) fn get(&self, index: usize) -> &Document {
        &self.docs[index]
    }

    /// Insert, assigning a fresh `_id` when the document has none.
    pub(crate) fn insert(&mut self, doc: Document) -> String {
        let (id, doc) = Self::with_id(doc);
        self.docs.push(doc);
        id
    }

    /// The document as it would be inserted, with its `_id`.
    pub(crate) fn with_id(mut doc: Document) -> (String, Document) {
        let id = match doc.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };
        (id, doc)
    }

    /// Set fields on the document at `index`; returns whether anything changed.
    pub(crate) fn set_fields(&mut self, index: usize, fields: Document) -> bool {
        match self.with_fields(index, fields) {
            Some(doc) => {
                self.docs[index] = doc;
                true
            }
            None => false,
        }
    }

    /// Copy of the document at `index` with `fields` set, or `None` when nothing changes.
    pub(crate) fn with_fields(&self, index: usize, fields: Document) -> Option<Document> {
        let mut doc = self.docs[index].clone();
        let mut modified = false;
        for (key, value) in fields {
            if key == ID_FIELD {
                continue;
            }
            if doc.get(&key) != Some(&value) {
                doc.insert(key, value);
                modified = true;
            }
        }
        modified.then_some(doc)
    }

    /// Replace the document at `index`, keeping its `_id`.
    pub(crate) fn replace(&mut self, index: usize, doc: Document) -> bool {
        match self.replacement(index, doc) {
            Some(doc) => {
                self.docs[index] = doc;
                true
            }
            None => false,
        }
    }

    /// `doc` carrying the `_id` of the document at `index`, or `None` when identical.
    pub(crate) fn replacement(&self, index: usize, mut doc: Document) -> Option<Document> {
        let current = &self.docs[index];
        if let Some(id) = current.get(ID_FIELD).cloned() {
            doc.insert(ID_FIELD.to_string(), id);
        }
        (*current != doc).then_some(doc)
    }

    pub(crate) fn set(&mut self, index: usize, doc: Document) {
        self.docs[index] = doc;
    }

    pub(crate) fn push(&mut self, doc: Document) {
        self.docs.push(doc);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Document {
        self.docs.remove(index)
    }

    /// Apply a replayed write: replace by `_id`, or append.
    pub(crate) fn put(&mut self, doc: Document) {
        let id = doc.get(ID_FIELD).cloned();
        match id.and_then(|id| self.docs.iter().position(|d| d.get(ID_FIELD) == Some(&id))) {
            Some(index) => self.docs[index] = doc,
            None => self.docs.push(doc),
        }
    }

    /// Apply a replayed delete.
    pub(crate) fn delete_id(&mut self, id: &str) {
        self.docs.retain(|d| d.get(ID_FIELD).and_then(Value::as_str) != Some(id));
    }

    pub(crate) fn len(&self) -> usize {
        self.docs.len()
    }
}
