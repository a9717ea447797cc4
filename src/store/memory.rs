//! In-process document store.
//!
//! Documents live in a [`DashMap`] keyed by `(collection, doc_id)`. The entry
//! API holds the shard lock for the whole merge, so a field write is atomic
//! with respect to writers of sibling fields on the same document.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use super::{Document, DocumentStore, StoreError, WriteOutcome};

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<(String, String), Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    async fn merge_or_create(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: Value,
    ) -> Result<WriteOutcome, StoreError> {
        let key = (collection.to_string(), doc_id.to_string());
        match self.documents.entry(key) {
            Entry::Occupied(mut doc) => {
                doc.get_mut().insert(field.to_string(), value);
                Ok(WriteOutcome::Merged)
            }
            Entry::Vacant(slot) => {
                let mut doc = Document::new();
                doc.insert(field.to_string(), value);
                slot.insert(doc);
                Ok(WriteOutcome::Created)
            }
        }
    }

    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, StoreError> {
        let key = (collection.to_string(), doc_id.to_string());
        Ok(self.documents.get(&key).map(|doc| doc.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_holds_only_the_field() {
        let store = MemoryStore::new();
        let outcome = store
            .merge_or_create("tech", "1-1-2024_tech", "fp", json!([1]))
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Created);

        let doc = store.get("tech", "1-1-2024_tech").await.unwrap().unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc["fp"], json!([1]));
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let store = MemoryStore::new();
        store.merge_or_create("tech", "d", "fp", json!([])).await.unwrap();
        store.merge_or_create("cricket", "d", "fp", json!([])).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.get("usa", "d").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_keep_all_fields() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for outlet in ["fp", "ndtv", "hindu", "isn", "ys"] {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for round in 0..50 {
                    store
                        .merge_or_create("bharat", "15-9-2024_bharat", outlet, json!([round]))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.get("bharat", "15-9-2024_bharat").await.unwrap().unwrap();
        assert_eq!(doc.len(), 5);
        for outlet in ["fp", "ndtv", "hindu", "isn", "ys"] {
            assert_eq!(doc[outlet], json!([49]));
        }
    }
}
