//! Assembly of canonical articles from drafts.
//!
//! Field rules:
//!
//! | Field        | Rule                                                        |
//! |--------------|-------------------------------------------------------------|
//! | `title`      | missing or blank becomes [`MISSING_TITLE`]                  |
//! | `timestamp`  | missing or unparseable rejects the whole draft             |
//! | `subheading` | summarized, unless empty (then stays empty)                 |
//! | `body`       | always summarized, then encoded                             |
//! | `authors`    | holes and blanks dropped, duplicates removed, order kept    |
//! | `tags`       | blanks dropped, duplicates removed, order kept              |
//!
//! Assembly is a pure function of the draft, the normalized timestamp and the
//! configured budgets.

use chrono::{DateTime, FixedOffset};
use itertools::Itertools;

use crate::encode::encode;
use crate::models::{ArticleDraft, CanonicalArticle, MISSING_TITLE};
use crate::summarizer::{Summarizer, SummaryBudget};

/// Why a draft was not promoted to a [`CanonicalArticle`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("publication date '{raw}' could not be parsed")]
    UnparseableDate { raw: String },
}

/// Turns drafts into canonical articles.
#[derive(Debug, Clone, Copy)]
pub struct ArticleAssembler {
    summarizer: Summarizer,
    body_budget: SummaryBudget,
    subheading_budget: SummaryBudget,
}

impl ArticleAssembler {
    pub fn new(
        summarizer: Summarizer,
        body_budget: SummaryBudget,
        subheading_budget: SummaryBudget,
    ) -> Self {
        Self {
            summarizer,
            body_budget,
            subheading_budget,
        }
    }

    /// Build the canonical record for `draft`, published at `timestamp`.
    pub fn assemble(
        &self,
        draft: ArticleDraft,
        timestamp: Option<DateTime<FixedOffset>>,
    ) -> Result<CanonicalArticle, Rejection> {
        let Some(timestamp) = timestamp else {
            return Err(Rejection::UnparseableDate { raw: draft.raw_date });
        };
        Ok(self.assemble_dated(draft, timestamp))
    }

    /// Build the record for a draft whose timestamp is already known.
    pub fn assemble_dated(
        &self,
        draft: ArticleDraft,
        timestamp: DateTime<FixedOffset>,
    ) -> CanonicalArticle {
        let title = draft
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(MISSING_TITLE)
            .to_string();

        let subheading = if draft.raw_subheading.trim().is_empty() {
            String::new()
        } else {
            self.summarizer
                .summarize_with(&draft.raw_subheading, self.subheading_budget)
        };

        let body = encode(&self.summarizer.summarize_with(&draft.raw_body, self.body_budget));

        CanonicalArticle {
            title,
            timestamp,
            authors: normalize_authors(draft.authors),
            subheading,
            body,
            tags: normalize_list(draft.tags),
            source_url: draft.source_url,
        }
    }
}

fn normalize_authors(authors: Vec<Option<String>>) -> Vec<String> {
    normalize_list(authors.into_iter().flatten().collect())
}

fn normalize_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unique()
        .collect()
}
