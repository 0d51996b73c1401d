//! Append-only file-backed document store.
//!
//! Each collection is one `<collection>.log` file under the data directory.
//! Every line is `<crc32-hex>:<json op>`; opening the store replays all
//! lines into memory and refuses to start on a checksum mismatch.

use super::collection::Collection;
use super::{Document, DocumentStore, Filter, FindOptions, ReplaceOutcome, UpdateResult, ID_FIELD};
use crate::{Error, Result};
use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const LOG_EXTENSION: &str = "log";

/// One persisted write.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum LogOp {
    Put { doc: Document },
    Delete { id: String },
}

#[inline]
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// `"<crc32_hex>:<json>"`
#[inline]
pub fn format_line_with_crc32(json: &str) -> String {
    format!("{:08x}:{}", calculate_crc32(json.as_bytes()), json)
}

/// Split a log line and verify its checksum, returning the JSON payload.
pub fn parse_and_validate_line(line: &str) -> std::result::Result<&str, String> {
    if line.len() <= 9 || line.as_bytes()[8] != b':' {
        return Err("missing CRC32 prefix".to_string());
    }
    let (crc_hex, json) = (&line[..8], &line[9..]);
    let expected =
        u32::from_str_radix(crc_hex, 16).map_err(|_| format!("invalid CRC32 hex: {}", crc_hex))?;
    let actual = calculate_crc32(json.as_bytes());
    if expected != actual {
        return Err(format!("CRC32 mismatch: expected {:08x}, got {:08x}", expected, actual));
    }
    Ok(json)
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    logs: HashMap<String, File>,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    fsync: bool,
    inner: RwLock<Inner>,
}

impl FileStore {
    /// Open (or create) a store rooted at `dir`, replaying every collection log.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut inner = Inner::default();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let collection = replay(&path)?;
            log::info!("Replayed {} documents into collection '{}'", collection.len(), name);
            inner.collections.insert(name.to_string(), collection);
        }

        Ok(Self { dir, fsync: false, inner: RwLock::new(inner) })
    }

    /// Sync every appended line to disk before acknowledging the write.
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Write `op` to the collection log. Callers apply the change in memory
    /// only after this succeeds.
    fn append(&self, logs: &mut HashMap<String, File>, collection: &str, op: &LogOp) -> Result<()> {
        if !logs.contains_key(collection) {
            let path = self.dir.join(format!("{}.{}", collection, LOG_EXTENSION));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            logs.insert(collection.to_string(), file);
        }
        let file = logs
            .get_mut(collection)
            .ok_or_else(|| Error::Persistence(format!("log for '{}' not open", collection)))?;

        let line = format_line_with_crc32(&serde_json::to_string(op)?);
        writeln!(file, "{}", line)?;
        if self.fsync {
            file.sync_data()?;
        }
        Ok(())
    }
}

fn check_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Persistence(format!("invalid collection name: {:?}", name)))
    }
}

fn replay(path: &Path) -> Result<Collection> {
    let reader = BufReader::new(File::open(path)?);
    let mut collection = Collection::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let json = parse_and_validate_line(&line).map_err(|e| {
            Error::Persistence(format!("{} line {}: {}", path.display(), number + 1, e))
        })?;
        match serde_json::from_str::<LogOp>(json)? {
            LogOp::Put { doc } => collection.put(doc),
            LogOp::Delete { id } => collection.delete_id(&id),
        }
    }
    Ok(collection)
}

#[async_trait::async_trait]
impl DocumentStore for FileStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        Ok(inner.collections.get(collection).map(|c| c.find(filter, options)).unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String> {
        check_collection_name(collection)?;
        let mut inner = self.inner.write().await;
        let Inner { collections, logs } = &mut *inner;
        let (id, doc) = Collection::with_id(doc);
        self.append(logs, collection, &LogOp::Put { doc: doc.clone() })?;
        collections.entry(collection.to_string()).or_default().push(doc);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        fields: Document,
    ) -> Result<UpdateResult> {
        let mut inner = self.inner.write().await;
        let Inner { collections, logs } = &mut *inner;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(UpdateResult::default());
        };
        let Some(index) = coll.position(filter) else {
            return Ok(UpdateResult::default());
        };
        let Some(updated) = coll.with_fields(index, fields) else {
            return Ok(UpdateResult { matched: 1, modified: 0 });
        };
        self.append(logs, collection, &LogOp::Put { doc: updated.clone() })?;
        coll.set(index, updated);
        Ok(UpdateResult { matched: 1, modified: 1 })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        doc: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome> {
        check_collection_name(collection)?;
        let mut inner = self.inner.write().await;
        let Inner { collections, logs } = &mut *inner;
        let coll = collections.entry(collection.to_string()).or_default();
        match coll.position(filter) {
            Some(index) => {
                let Some(replacement) = coll.replacement(index, doc) else {
                    return Ok(ReplaceOutcome::Replaced { modified: false });
                };
                self.append(logs, collection, &LogOp::Put { doc: replacement.clone() })?;
                coll.set(index, replacement);
                Ok(ReplaceOutcome::Replaced { modified: true })
            }
            None if upsert => {
                let (id, doc) = Collection::with_id(doc);
                self.append(logs, collection, &LogOp::Put { doc: doc.clone() })?;
                coll.push(doc);
                Ok(ReplaceOutcome::Inserted(id))
            }
            None => Ok(ReplaceOutcome::NotMatched),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let mut inner = self.inner.write().await;
        let Inner { collections, logs } = &mut *inner;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = coll.position(filter) else {
            return Ok(None);
        };
        let id = coll
            .get(index)
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.append(logs, collection, &LogOp::Delete { id })?;
        Ok(Some(coll.remove(index)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner.collections.get(collection).map(|c| c.count(filter)).unwrap_or(0))
    }
}
