//! Bounded similarity scoring
//!
//! A normalized Levenshtein ratio on the 0-100 scale. Inputs are run
//! through [`normalize`] before the distance is taken, so the score is
//! invariant under case changes, punctuation and surrounding whitespace.

use crate::normalize::normalize;
use strsim::levenshtein;

/// Similarity between two strings in [0, 100].
///
/// Equal strings (after normalization) score exactly 100; empty vs empty
/// is 100, empty vs non-empty is 0. Symmetric in its arguments.
pub fn score(a: &str, b: &str) -> f64 {
    let na = normalize(a);
    let nb = normalize(b);
    score_normalized(&na, &nb)
}

/// Same as [`score`] but assumes both inputs are already normalized.
/// Used on hot paths where the query is normalized once per entry.
pub fn score_normalized(na: &str, nb: &str) -> f64 {
    let max_len = na.chars().count().max(nb.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    let dist = levenshtein(na, nb);
    let ratio = 100.0 * (1.0 - dist as f64 / max_len as f64);
    ratio.clamp(0.0, 100.0)
}

/// Harmonic mean of two scores: `2xy / (x + y)`.
///
/// Penalizes a match that scores well on one field but poorly on the
/// other more than a plain average would. Defined as 0 when both inputs
/// are 0.
pub fn harmonic_mean(x: f64, y: f64) -> f64 {
    if x + y == 0.0 {
        return 0.0;
    }
    2.0 * x * y / (x + y)
}
