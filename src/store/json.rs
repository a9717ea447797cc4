//! JSON-file document store.
//!
//! # Layout
//!
//! ```text
//! store_dir/
//! ├── bharat/
//! │   ├── 15-9-2024_bharat.json
//! │   └── 15-9-2024_bharat.json.lock
//! └── cricket/
//!     ├── 15-9-2024_cricket.json
//!     └── 15-9-2024_cricket.json.lock
//! ```
//!
//! A merge holds an exclusive advisory lock on the document's `.lock` file
//! for the whole read, insert and replace, so writers in other processes (or
//! other handles in this one) wait for each other. The new document is
//! written to a uniquely named temporary file in the same directory and
//! renamed into place, so readers never observe a half-written document and
//! take no lock.

use fd_lock::RwLock;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use super::{Document, DocumentStore, StoreError, WriteOutcome};

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, doc_id: &str) -> Result<PathBuf, StoreError> {
        for part in [collection, doc_id] {
            if part.is_empty() || part.contains(['/', '\\']) || part.starts_with('.') {
                return Err(StoreError::InvalidKey(part.to_string()));
            }
        }
        Ok(self.root.join(collection).join(format!("{doc_id}.json")))
    }
}

fn read_document(
    path: &Path,
    collection: &str,
    doc_id: &str,
) -> Result<Option<Document>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(doc) => Ok(Some(doc)),
        _ => Err(StoreError::Corrupt {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
        }),
    }
}

/// Locked read, insert and atomic replace. Blocks while another writer
/// holds the document's lock.
fn merge_locked(
    path: &Path,
    collection: &str,
    doc_id: &str,
    field: &str,
    value: Value,
) -> Result<WriteOutcome, StoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::InvalidKey(doc_id.to_string()))?;
    fs::create_dir_all(dir)?;

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path.with_extension("json.lock"))?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock.write()?;

    let (mut doc, outcome) = match read_document(path, collection, doc_id)? {
        Some(doc) => (doc, WriteOutcome::Merged),
        None => (Document::new(), WriteOutcome::Created),
    };
    doc.insert(field.to_string(), value);

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&serde_json::to_vec_pretty(&Value::Object(doc))?)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(outcome)
}

impl DocumentStore for JsonDirStore {
    #[instrument(level = "debug", skip(self, value))]
    async fn merge_or_create(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: Value,
    ) -> Result<WriteOutcome, StoreError> {
        let path = self.document_path(collection, doc_id)?;
        let (collection, doc_id, field) =
            (collection.to_string(), doc_id.to_string(), field.to_string());

        let target = path.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            merge_locked(&target, &collection, &doc_id, &field, value)
        })
        .await
        .map_err(io::Error::other)??;

        debug!(path = %path.display(), ?outcome, "Wrote document");
        Ok(outcome)
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, StoreError> {
        let path = self.document_path(collection, doc_id)?;
        let (collection, doc_id) = (collection.to_string(), doc_id.to_string());
        tokio::task::spawn_blocking(move || read_document(&path, &collection, &doc_id))
            .await
            .map_err(io::Error::other)?
    }
}
