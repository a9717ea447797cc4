//! Latent semantic salience scores for sentences.
//!
//! Builds a term-by-sentence matrix `A` of smoothed term frequencies and
//! decomposes it. Rather than computing the thin SVD of `A` directly, the
//! symmetric Gram matrix `AᵀA = V Σ² Vᵀ` is diagonalized with cyclic Jacobi
//! rotations: its eigenvalues are the squared singular values and its
//! eigenvectors are the right singular vectors. A sentence's salience is the
//! length of its projection onto the strongest topics:
//!
//! ```text
//! salience(i) = sqrt( Σ_k σ_k² · v_ik² )   for the top `dimensions` topics
//! ```
//!
//! Everything is deterministic: vocabulary order is sorted, rotations sweep in
//! a fixed order and ties between topics break on column index.

use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

use super::SummaryError;

/// Never keep fewer topics than this.
const MIN_DIMENSIONS: usize = 3;
/// Share of topics kept relative to the sentence count.
const REDUCTION_RATIO: f64 = 0.5;
/// Floor weight of a term that occurs in a sentence.
const TF_SMOOTHING: f64 = 0.4;
const JACOBI_MAX_SWEEPS: usize = 64;
const JACOBI_TOLERANCE: f64 = 1e-12;

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had",
        "has", "have", "he", "her", "his", "i", "in", "is", "it", "its", "of", "on", "or", "our",
        "she", "so", "that", "the", "their", "them", "there", "they", "this", "to", "was", "we",
        "were", "which", "who", "will", "with", "would", "you",
    ]
    .into_iter()
    .collect()
});

/// One salience score per sentence, in sentence order.
pub fn salience(sentences: &[String]) -> Result<Vec<f64>, SummaryError> {
    if sentences.is_empty() {
        return Err(SummaryError::NoSentences);
    }
    let matrix = term_matrix(sentences)?;
    let gram = gram_matrix(&matrix, sentences.len());
    let (eigenvalues, eigenvectors) = jacobi_eigen(gram);

    let n = sentences.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]).then(a.cmp(&b)));

    let dimensions = ((n as f64 * REDUCTION_RATIO).ceil() as usize)
        .max(MIN_DIMENSIONS)
        .min(n);
    let topics = &order[..dimensions];

    let scores: Vec<f64> = (0..n)
        .map(|i| {
            topics
                .iter()
                .map(|&k| eigenvalues[k].max(0.0) * eigenvectors[i][k].powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect();

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(SummaryError::Degenerate);
    }
    Ok(scores)
}

/// Stemmed, lowercased content words of a sentence.
fn terms(sentence: &str) -> Vec<String> {
    sentence
        .unicode_words()
        .map(str::to_lowercase)
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .map(|w| STEMMER.stem(&w).into_owned())
        .collect()
}

/// Rows are terms (sorted), columns are sentences.
fn term_matrix(sentences: &[String]) -> Result<Vec<Vec<f64>>, SummaryError> {
    let per_sentence: Vec<Vec<String>> = sentences.iter().map(|s| terms(s)).collect();

    let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
    for word in per_sentence.iter().flatten() {
        vocabulary.entry(word.as_str()).or_insert(0);
    }
    if vocabulary.is_empty() {
        return Err(SummaryError::NoTerms);
    }
    for (row, index) in vocabulary.values_mut().enumerate() {
        *index = row;
    }

    let mut matrix = vec![vec![0.0; sentences.len()]; vocabulary.len()];
    for (col, words) in per_sentence.iter().enumerate() {
        for word in words {
            matrix[vocabulary[word.as_str()]][col] += 1.0;
        }
    }

    for col in 0..sentences.len() {
        let max = matrix.iter().map(|row| row[col]).fold(0.0, f64::max);
        if max == 0.0 {
            continue;
        }
        for row in matrix.iter_mut().filter(|row| row[col] > 0.0) {
            row[col] = TF_SMOOTHING + (1.0 - TF_SMOOTHING) * row[col] / max;
        }
    }
    Ok(matrix)
}

/// `AᵀA` for an `m x n` matrix given as rows.
fn gram_matrix(matrix: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    let mut gram = vec![vec![0.0; n]; n];
    for row in matrix {
        for i in 0..n {
            if row[i] == 0.0 {
                continue;
            }
            for j in i..n {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }
    gram
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a matrix whose column `k` is the eigenvector
/// for eigenvalue `k`.
fn jacobi_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v = vec![vec![0.0; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= JACOBI_TOLERANCE * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}
