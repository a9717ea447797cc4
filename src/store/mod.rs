//! Per-day, per-category aggregation of canonical articles.
//!
//! One document exists per `(date, category)`. Its id is derived from the
//! coordinates alone (`"{day}-{month}-{year}_{category}"`) and each outlet owns
//! exactly one field of it:
//!
//! ```text
//! cricket/15-9-2024_cricket
//! ├── ndtv: [ {title, timestamp, author, sub_heading, body, tags, src}, ... ]
//! └── fp:   [ ... ]
//! ```
//!
//! Every write goes through [`DocumentStore::merge_or_create`], which sets one
//! field atomically and creates the document when it does not exist yet. A
//! write for one outlet never reads, rewrites or removes another outlet's
//! field, and re-running a write replaces only that outlet's slice.
//!
//! # Backends
//!
//! - [`memory::MemoryStore`]: in-process map, per-document locking
//! - [`json::JsonDirStore`]: one JSON file per document under a root directory

pub mod json;
pub mod memory;

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{CanonicalArticle, Category, OutletCode};

/// A stored document: field name to JSON value.
pub type Document = Map<String, Value>;

/// Errors raised by a [`DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document {collection}/{doc_id} is not a JSON object")]
    Corrupt { collection: String, doc_id: String },

    #[error("Invalid document path component: {0}")]
    InvalidKey(String),
}

/// Which branch of a merge-or-create write was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The document existed; only the field was replaced.
    Merged,
    /// The document was created holding just the field.
    Created,
}

/// Key/value document store with an atomic field-merge primitive.
pub trait DocumentStore: Send + Sync {
    /// Set `field` to `value` on `collection/doc_id`, creating the document
    /// with only that field if it is absent. Other fields are untouched.
    async fn merge_or_create(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        value: Value,
    ) -> Result<WriteOutcome, StoreError>;

    /// Read a whole document.
    async fn get(&self, collection: &str, doc_id: &str) -> Result<Option<Document>, StoreError>;
}

/// Document id for a `(date, category)` coordinate, e.g. `"5-9-2024_cricket"`.
pub fn document_id(date: NaiveDate, category: Category) -> String {
    format!("{}-{}-{}_{}", date.day(), date.month(), date.year(), category)
}

/// Writes outlet batches into the shared daily documents.
///
/// The backend handle is injected once per process and shared by every
/// outlet run.
#[derive(Debug)]
pub struct AggregationStore<S> {
    store: Arc<S>,
}

impl<S> Clone for AggregationStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> AggregationStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Replace `outlet`'s slice of the `(date, category)` document with `records`.
    ///
    /// A failed write is logged and returned; nothing is retried.
    #[instrument(
        level = "info",
        skip_all,
        fields(%date, %category, %outlet, count = records.len())
    )]
    pub async fn upsert(
        &self,
        date: NaiveDate,
        category: Category,
        outlet: OutletCode,
        records: &[CanonicalArticle],
    ) -> Result<WriteOutcome, StoreError> {
        let doc_id = document_id(date, category);
        let value = Value::Array(records.iter().map(CanonicalArticle::to_document_value).collect());

        match self
            .store
            .merge_or_create(category.as_str(), &doc_id, outlet.as_str(), value)
            .await
        {
            Ok(WriteOutcome::Merged) => {
                info!(%doc_id, "Updated {} news", records.len());
                Ok(WriteOutcome::Merged)
            }
            Ok(WriteOutcome::Created) => {
                warn!(%doc_id, "Document absent; new entry created");
                info!(%doc_id, "Uploaded {} news", records.len());
                Ok(WriteOutcome::Created)
            }
            Err(e) => {
                error!(%doc_id, error = %e, "Unable to store outlet batch; lost for this run");
                Err(e)
            }
        }
    }

    /// Read back one outlet's slice.
    pub async fn outlet_slice(
        &self,
        date: NaiveDate,
        category: Category,
        outlet: OutletCode,
    ) -> Result<Option<Vec<CanonicalArticle>>, StoreError> {
        let doc_id = document_id(date, category);
        let Some(mut doc) = self.store.get(category.as_str(), &doc_id).await? else {
            return Ok(None);
        };
        match doc.remove(outlet.as_str()) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::DateTime;

    fn article(title: &str) -> CanonicalArticle {
        CanonicalArticle {
            title: title.to_string(),
            timestamp: DateTime::parse_from_rfc3339("2024-09-15T10:00:00+05:30").unwrap(),
            authors: vec![],
            subheading: String::new(),
            body: String::new(),
            tags: vec![],
            source_url: format!("https://example.com/{title}"),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 5).unwrap()
    }

    #[test]
    fn test_document_id_is_unpadded() {
        assert_eq!(document_id(day(), Category::Cricket), "5-9-2024_cricket");
        let d = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(document_id(d, Category::Bharat), "25-12-2024_bharat");
    }

    #[tokio::test]
    async fn test_first_write_creates_then_merges() {
        let agg = AggregationStore::new(Arc::new(MemoryStore::new()));
        let first = agg
            .upsert(day(), Category::Tech, OutletCode::Fp, &[article("a")])
            .await
            .unwrap();
        assert_eq!(first, WriteOutcome::Created);

        let second = agg
            .upsert(day(), Category::Tech, OutletCode::Ndtv, &[article("b")])
            .await
            .unwrap();
        assert_eq!(second, WriteOutcome::Merged);
    }

    #[tokio::test]
    async fn test_sibling_outlets_survive_in_any_order() {
        for order in [[OutletCode::Fp, OutletCode::Ndtv], [OutletCode::Ndtv, OutletCode::Fp]] {
            let agg = AggregationStore::new(Arc::new(MemoryStore::new()));
            for outlet in order {
                agg.upsert(day(), Category::Bharat, outlet, &[article(outlet.as_str())])
                    .await
                    .unwrap();
            }
            for outlet in order {
                let slice = agg
                    .outlet_slice(day(), Category::Bharat, outlet)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(slice, vec![article(outlet.as_str())]);
            }
        }
    }

    #[tokio::test]
    async fn test_rerun_replaces_only_own_slice() {
        let agg = AggregationStore::new(Arc::new(MemoryStore::new()));
        agg.upsert(day(), Category::Business, OutletCode::Isn, &[article("old1"), article("old2")])
            .await
            .unwrap();
        agg.upsert(day(), Category::Business, OutletCode::Fp, &[article("fp")])
            .await
            .unwrap();
        agg.upsert(day(), Category::Business, OutletCode::Isn, &[article("new")])
            .await
            .unwrap();

        let isn = agg.outlet_slice(day(), Category::Business, OutletCode::Isn).await.unwrap();
        assert_eq!(isn, Some(vec![article("new")]));
        let fp = agg.outlet_slice(day(), Category::Business, OutletCode::Fp).await.unwrap();
        assert_eq!(fp, Some(vec![article("fp")]));
    }

    #[tokio::test]
    async fn test_missing_slice_reads_as_none() {
        let agg = AggregationStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(agg.outlet_slice(day(), Category::Usa, OutletCode::Ys).await.unwrap(), None);
        agg.upsert(day(), Category::Usa, OutletCode::Fp, &[]).await.unwrap();
        assert_eq!(agg.outlet_slice(day(), Category::Usa, OutletCode::Ys).await.unwrap(), None);
        assert_eq!(
            agg.outlet_slice(day(), Category::Usa, OutletCode::Fp).await.unwrap(),
            Some(vec![])
        );
    }
}
