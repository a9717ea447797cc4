//! Source adapters: where article drafts come from.
//!
//! Page-specific extraction lives outside this crate. An adapter only has to
//! say which outlet and category it feeds, how that outlet prints dates, and
//! hand over its drafts.

use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

use crate::dates::DateFormat;
use crate::models::{ArticleDraft, Category, OutletCode};

/// The outlet's drafts could not be obtained, or belong to another run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed draft list in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Adapter for {adapter} cannot feed the run for {run}")]
    Mismatch { adapter: String, run: String },
}

/// Yields the raw drafts of one outlet for one run.
pub trait SourceAdapter: Send + Sync {
    fn outlet(&self) -> OutletCode;

    fn category(&self) -> Category;

    fn date_format(&self) -> &DateFormat;

    /// Every draft currently published by the outlet.
    async fn drafts(&self) -> Result<Vec<ArticleDraft>, SourceError>;
}

/// Reads drafts from a JSON array written by an external extractor.
#[derive(Debug, Clone)]
pub struct JsonDraftSource {
    path: PathBuf,
    outlet: OutletCode,
    category: Category,
    date_format: DateFormat,
}

impl JsonDraftSource {
    pub fn new(
        path: impl Into<PathBuf>,
        outlet: OutletCode,
        category: Category,
        date_format: DateFormat,
    ) -> Self {
        Self {
            path: path.into(),
            outlet,
            category,
            date_format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceAdapter for JsonDraftSource {
    fn outlet(&self) -> OutletCode {
        self.outlet
    }

    fn category(&self) -> Category {
        self.category
    }

    fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    #[instrument(
        level = "info",
        skip(self),
        fields(outlet = %self.outlet, path = %self.path.display())
    )]
    async fn drafts(&self) -> Result<Vec<ArticleDraft>, SourceError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|source| {
            error!(error = %source, "Source unavailable");
            SourceError::Io { path: path.clone(), source }
        })?;
        let drafts: Vec<ArticleDraft> = serde_json::from_str(&raw).map_err(|source| {
            error!(error = %source, "Source returned malformed drafts");
            SourceError::Parse { path, source }
        })?;
        info!(count = drafts.len(), "Fetched drafts");
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: impl Into<PathBuf>) -> JsonDraftSource {
        JsonDraftSource::new(path, OutletCode::Ndtv, Category::Cricket, DateFormat::Iso8601)
    }

    #[tokio::test]
    async fn test_reads_drafts_with_missing_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ndtv.json");
        std::fs::write(
            &path,
            r#"[
                {"title": "Toss delayed", "raw_date": "2024-09-15T10:00:00+05:30",
                 "raw_body": "Wet outfield.", "authors": ["Staff", null],
                 "source_url": "https://example.com/a"},
                {"source_url": "https://example.com/b"}
            ]"#,
        )
        .unwrap();

        let drafts = source(&path).drafts().await.unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].authors, vec![Some("Staff".to_string()), None]);
        assert_eq!(drafts[1].title, None);
        assert_eq!(drafts[1].raw_body, "");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = source(tmp.path().join("nope.json")).drafts().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
        let err = source(&path).drafts().await.unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn test_adapter_metadata() {
        let s = source("x.json");
        assert_eq!(s.outlet(), OutletCode::Ndtv);
        assert_eq!(s.category(), Category::Cricket);
        assert_eq!(s.date_format(), &DateFormat::Iso8601);
        assert_eq!(s.path(), Path::new("x.json"));
    }
}
