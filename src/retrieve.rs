//! Top-K candidate retrieval
//!
//! Scores a query against a reference corpus and returns the best K
//! candidates. Ordering is deterministic: descending score, ties broken by
//! ascending corpus position (first seen wins).

use crate::error::{BallotError, Result};
use crate::normalize::normalize;
use crate::scoring::score_normalized;

/// A scored reference string, transient within one matching call.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub reference_text: String,
    pub score: f64,
    pub reference_id: usize,
}

/// Return the top `k` candidates for `query` from `corpus`, each item a
/// `(reference_id, reference_text)` pair in corpus order.
///
/// `k` larger than the corpus returns the whole corpus sorted. An empty
/// corpus is an [`BallotError::EmptyCorpus`] error the caller recovers
/// from (tier fallthrough).
pub fn top_k<'a, I>(query: &str, corpus: I, k: usize) -> Result<Vec<MatchCandidate>>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let query_norm = normalize(query);

    let mut scored: Vec<(usize, MatchCandidate)> = corpus
        .into_iter()
        .enumerate()
        .map(|(position, (reference_id, text))| {
            let candidate = MatchCandidate {
                reference_text: text.to_string(),
                score: score_normalized(&query_norm, &normalize(text)),
                reference_id,
            };
            (position, candidate)
        })
        .collect();

    if scored.is_empty() {
        return Err(BallotError::EmptyCorpus);
    }

    scored.sort_by(|(pos_a, a), (pos_b, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(pos_a.cmp(pos_b))
    });
    scored.truncate(k);

    Ok(scored.into_iter().map(|(_, c)| c).collect())
}

/// The single best candidate for `query`.
pub fn best_match<'a, I>(query: &str, corpus: I) -> Result<MatchCandidate>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut top = top_k(query, corpus, 1)?;
    Ok(top.remove(0))
}
