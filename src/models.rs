//! Data models for article drafts and their canonical, storable form.
//!
//! - [`ArticleDraft`]: raw article data handed over by a source adapter
//! - [`CanonicalArticle`]: normalized, summarized and encoded record
//! - [`Category`] / [`OutletCode`]: the coordinates of an aggregation document
//!
//! Canonical articles serialize with the fixed store keys
//! `title, timestamp, author, sub_heading, body, tags, src`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Title used when a source page carries no headline.
pub const MISSING_TITLE: &str = "Title not found";

/// Canonical timestamp layout: seconds precision with an explicit offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A raw article as extracted by a source adapter.
///
/// Nothing here is trusted: the date is whatever the page printed, bodies may
/// be empty and author lists may contain holes where a byline was missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ArticleDraft {
    /// Headline, if the page had one.
    #[serde(default)]
    pub title: Option<String>,
    /// Publication date exactly as printed by the source.
    #[serde(default)]
    pub raw_date: String,
    /// Article text, paragraphs already joined.
    #[serde(default)]
    pub raw_body: String,
    /// Standfirst / sub-heading, empty when absent.
    #[serde(default)]
    pub raw_subheading: String,
    /// Bylines in page order. `None` marks a byline slot with no name.
    #[serde(default)]
    pub authors: Vec<Option<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Canonical article URL, the natural identity of a story.
    pub source_url: String,
}

/// A normalized article ready to be written to the aggregation store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalArticle {
    pub title: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "author")]
    pub authors: Vec<String>,
    #[serde(rename = "sub_heading")]
    pub subheading: String,
    /// Extractive summary, compressed and base64 encoded.
    pub body: String,
    pub tags: Vec<String>,
    #[serde(rename = "src")]
    pub source_url: String,
}

impl CanonicalArticle {
    /// The timestamp rendered the way it is stored.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Plain mapping with the fixed store keys.
    pub fn to_document_value(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "timestamp": self.timestamp_string(),
            "author": self.authors,
            "sub_heading": self.subheading,
            "body": self.body,
            "tags": self.tags,
            "src": self.source_url,
        })
    }
}

fn serialize_timestamp<S>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Topic collection an outlet's articles are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bharat,
    Cricket,
    Tech,
    Usa,
    Business,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bharat => "bharat",
            Category::Cricket => "cricket",
            Category::Tech => "tech",
            Category::Usa => "usa",
            Category::Business => "business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bharat" => Ok(Category::Bharat),
            "cricket" => Ok(Category::Cricket),
            "tech" | "technology" => Ok(Category::Tech),
            "usa" => Ok(Category::Usa),
            "business" => Ok(Category::Business),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Short code identifying an outlet inside an aggregation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutletCode {
    /// Firstpost
    Fp,
    Ndtv,
    Hindu,
    Isn,
    Ys,
}

impl OutletCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutletCode::Fp => "fp",
            OutletCode::Ndtv => "ndtv",
            OutletCode::Hindu => "hindu",
            OutletCode::Isn => "isn",
            OutletCode::Ys => "ys",
        }
    }
}

impl fmt::Display for OutletCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutletCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fp" | "firstpost" => Ok(OutletCode::Fp),
            "ndtv" => Ok(OutletCode::Ndtv),
            "hindu" => Ok(OutletCode::Hindu),
            "isn" => Ok(OutletCode::Isn),
            "ys" => Ok(OutletCode::Ys),
            other => Err(format!("unknown outlet code '{other}'")),
        }
    }
}
