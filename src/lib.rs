//! # histral_news
//!
//! Normalization and summarization pipeline for short-lived news articles.
//!
//! Raw drafts handed over by per-outlet extractors are turned into canonical
//! records and merged into one document per `(date, category)`:
//!
//! ```text
//! ArticleDraft
//!   → dates::DateNormalizer        (timezone-aware timestamp or reject)
//!   → window::TimeWindow           (trailing 24h, inclusive)
//!   → summarizer::Summarizer       (extractive LSA summary, char budget)
//!   → encode::encode               (zlib + base64 body)
//!   → assembler::ArticleAssembler  (CanonicalArticle)
//!   → store::AggregationStore      (merge-or-create per outlet field)
//! ```
//!
//! [`pipeline::run_outlet`] wires the stages together for one outlet.

pub mod assembler;
pub mod config;
pub mod dates;
pub mod encode;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod summarizer;
pub mod utils;
pub mod window;
