//! Budgeted sentence selection.
//!
//! Given already-scored sentences, pick the `k` most salient ones, put them
//! back in document order and join them. `k` shrinks one step at a time until
//! the joined text fits the character budget or only one sentence is left.
//! The top-`k` sets are nested, so a smaller `k` never selects a sentence a
//! larger `k` would have dropped.

use crate::utils::char_len;

/// A sentence with its position in the source text and its salience.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSentence {
    pub position: usize,
    pub text: String,
    pub salience: f64,
}

/// The outcome of a selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    /// Positions of the chosen sentences, ascending.
    pub positions: Vec<usize>,
    /// Chosen sentences joined by single spaces.
    pub text: String,
}

impl Extract {
    pub fn fits(&self, budget: usize) -> bool {
        char_len(&self.text) <= budget
    }
}

/// Shrink from `start_k` sentences until the extract fits `budget`.
///
/// Ties in salience go to the earlier sentence. An empty input yields an
/// empty extract; a single over-long top sentence is returned as is and left
/// for the caller to clamp.
pub fn select_within_budget(ranked: &[RankedSentence], start_k: usize, budget: usize) -> Extract {
    let mut by_salience: Vec<&RankedSentence> = ranked.iter().collect();
    by_salience.sort_by(|a, b| {
        b.salience
            .total_cmp(&a.salience)
            .then(a.position.cmp(&b.position))
    });

    let mut k = start_k.min(by_salience.len());
    loop {
        let extract = take_top(&by_salience, k);
        if k <= 1 || extract.fits(budget) {
            return extract;
        }
        k -= 1;
    }
}

fn take_top(by_salience: &[&RankedSentence], k: usize) -> Extract {
    let mut chosen: Vec<&RankedSentence> = by_salience.iter().take(k).copied().collect();
    chosen.sort_by_key(|s| s.position);
    Extract {
        positions: chosen.iter().map(|s| s.position).collect(),
        text: chosen
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    }
}
