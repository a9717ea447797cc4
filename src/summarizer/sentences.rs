//! English sentence segmentation.
//!
//! Unicode sentence boundaries (UAX #29) do the heavy lifting; fragments that
//! end in a known abbreviation or a bare initial are glued back onto the
//! following fragment so that "Dr. Rao" or "Rs. 500 crore" stay in one
//! sentence.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "vs", "etc", "inc", "ltd",
        "co", "corp", "pvt", "govt", "dept", "gen", "col", "lt", "maj", "sgt", "capt", "cmdr",
        "gov", "sen", "rep", "rev", "hon", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
        "sept", "oct", "nov", "dec", "no", "nos", "fig", "approx", "est", "rs", "e.g", "i.e",
        "u.s", "u.k", "u.n", "a.m", "p.m",
    ]
    .into_iter()
    .collect()
});

/// Split `text` into trimmed sentences with internal whitespace collapsed.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut pending = String::new();

    // Line breaks are paragraph separators under UAX #29; bodies arrive with
    // paragraphs already joined, so treat them as plain spaces.
    let text = collapse_whitespace(text);
    for fragment in text.split_sentence_bounds() {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(fragment);

        if !ends_with_abbreviation(&pending) {
            sentences.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        sentences.push(pending);
    }
    sentences
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    let Some(last) = fragment.split_whitespace().last() else {
        return false;
    };
    let Some(word) = last.strip_suffix('.') else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_alphabetic(),
        (Some(_), Some(_)) => ABBREVIATIONS.contains(word.to_lowercase().as_str()),
        _ => false,
    }
}
