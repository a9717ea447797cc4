//! Extractive summarization with a hard character budget.
//!
//! A summary is always a subsequence of the source sentences, in source
//! order. The pipeline is:
//!
//! 1. [`sentences`]: split the text into English sentences
//! 2. [`lsa`]: score each sentence by latent semantic salience
//! 3. [`select`]: take the top `k` sentences, shrinking `k` until the joined
//!    extract fits the budget
//!
//! Failure never surfaces to callers. If ranking fails the original text is
//! truncated to the budget, and a single remaining sentence that is still too
//! long is clamped. The returned string never exceeds `min(budget, cap)`
//! characters.

pub mod lsa;
pub mod select;
pub mod sentences;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::{char_len, truncate_chars, truncate_for_log};
use select::{RankedSentence, select_within_budget};
use sentences::split_sentences;

/// Upper bound on any summary, whatever the budget.
pub const DEFAULT_CAP: usize = 1200;
/// Sentence count the shrinking selection starts from.
pub const DEFAULT_SENTENCES: usize = 6;
/// Only the leading sentences of a body are ranked. The decomposition is
/// cubic in the sentence count and a summary never needs the tail of a
/// long-form piece.
pub const MAX_RANKED_SENTENCES: usize = 100;

/// Internal reasons a summary could not be ranked.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("text contains no sentences")]
    NoSentences,
    #[error("text contains no rankable terms")]
    NoTerms,
    #[error("salience scores are not finite")]
    Degenerate,
}

/// How large a summary may be, before the cap applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryBudget {
    /// Share of the source length in characters, e.g. `0.34`.
    Fraction(f64),
    /// Fixed number of characters.
    Chars(usize),
}

impl SummaryBudget {
    /// Character budget for `text`, at least 1 and at most `cap`.
    pub fn resolve(&self, text: &str, cap: usize) -> usize {
        let raw = match *self {
            SummaryBudget::Fraction(share) => {
                let share = if share.is_finite() { share.max(0.0) } else { 0.0 };
                (char_len(text) as f64 * share).floor() as usize
            }
            SummaryBudget::Chars(n) => n,
        };
        raw.max(1).min(cap.max(1))
    }
}

/// Configured extractive summarizer.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    cap: usize,
    initial_sentences: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(DEFAULT_CAP, DEFAULT_SENTENCES)
    }
}

impl Summarizer {
    pub fn new(cap: usize, initial_sentences: usize) -> Self {
        Self {
            cap: cap.max(1),
            initial_sentences: initial_sentences.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Summarize `text` into at most `min(budget, cap)` characters.
    pub fn summarize(&self, text: &str, budget: usize) -> String {
        let limit = budget.min(self.cap);
        if text.trim().is_empty() {
            return truncate_chars(text, limit);
        }

        match self.extract(text, limit) {
            Ok(extract) if char_len(&extract) <= limit => extract,
            Ok(extract) => {
                debug!(limit, len = char_len(&extract), "Top sentence exceeds budget; clamping");
                truncate_chars(&extract, limit)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    limit,
                    text = %truncate_for_log(text, 80),
                    "Summarization failed; truncating source text"
                );
                truncate_chars(text, limit)
            }
        }
    }

    /// Summarize with a [`SummaryBudget`] resolved against `text`.
    pub fn summarize_with(&self, text: &str, budget: SummaryBudget) -> String {
        self.summarize(text, budget.resolve(text, self.cap))
    }

    fn extract(&self, text: &str, limit: usize) -> Result<String, SummaryError> {
        let mut sentences = split_sentences(text);
        if sentences.len() > MAX_RANKED_SENTENCES {
            debug!(
                total = sentences.len(),
                ranked = MAX_RANKED_SENTENCES,
                "Ranking leading sentences only"
            );
            sentences.truncate(MAX_RANKED_SENTENCES);
        }
        let scores = lsa::salience(&sentences)?;
        let ranked: Vec<RankedSentence> = sentences
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(position, (text, salience))| RankedSentence {
                position,
                text,
                salience,
            })
            .collect();
        Ok(select_within_budget(&ranked, self.initial_sentences, limit).text)
    }
}

/// Summarize with the default sentence count.
pub fn summarize(text: &str, budget: usize, cap: usize) -> String {
    Summarizer::new(cap, DEFAULT_SENTENCES).summarize(text, budget)
}
