//! Batch orchestration
//!
//! Applies the tiered matcher across a whole OCR dataset. Entries are
//! independent, so the batch runs on a rayon worker pool sharing read-only
//! access to the roll; output rows keep the input order. Cancellation is
//! cooperative, checked between entries.

use super::{MatchOutcome, MatchTier, TieredMatcher};
use crate::ocr::OcrEntry;
use crate::roll::VoterRoll;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress side channel: `(processed, total)` per completed entry.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// One row of the result table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRecord {
    pub ocr_name: String,
    pub ocr_address: String,
    pub matched_name: String,
    pub matched_address: String,
    pub date: String,
    pub match_score: f64,
    pub valid: bool,
    pub page_number: u32,
    pub row_number: u32,
    pub filename: String,

    /// Tier that produced the match; shown in verbose output, not part
    /// of the exported table.
    #[serde(skip)]
    pub tier: MatchTier,
    /// Harmonic name/address diagnostic on name-only matches.
    #[serde(skip)]
    pub combined_score: Option<f64>,
}

impl MatchRecord {
    fn from_outcome(entry: &OcrEntry, outcome: &MatchOutcome, threshold: f64) -> Self {
        Self {
            ocr_name: entry.name.clone(),
            ocr_address: entry.address.clone(),
            matched_name: outcome.matched_name.clone(),
            matched_address: outcome.matched_address.clone(),
            date: entry.date.clone(),
            match_score: outcome.score,
            valid: outcome.score >= threshold,
            page_number: entry.page_number,
            row_number: entry.row_number,
            filename: entry.filename.clone(),
            tier: outcome.tier,
            combined_score: outcome.combined_score,
        }
    }

    /// Re-derive validity under a new threshold from the stored score.
    pub fn revalidate(&mut self, threshold: f64) {
        self.valid = self.match_score >= threshold;
    }
}

/// Summary statistics over a result table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSummary {
    pub total_count: usize,
    pub valid_count: usize,
    /// Entries excluded from the table (empty name).
    pub skipped_count: usize,
}

impl MatchSummary {
    pub fn from_results(results: &[MatchRecord], skipped_count: usize) -> Self {
        Self {
            total_count: results.len(),
            valid_count: results.iter().filter(|r| r.valid).count(),
            skipped_count,
        }
    }

    /// `100 * valid / total`; 0 for an empty table (never divides by zero).
    pub fn valid_percentage(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        100.0 * self.valid_count as f64 / self.total_count as f64
    }
}

/// Match every OCR entry against the roll.
///
/// Output order matches input order. Entries with an empty name are
/// skipped (counted in the summary, not in the table). When `cancel` is
/// set mid-run, remaining entries are dropped and the partial table is
/// returned with fewer rows.
pub fn match_all(
    entries: &[OcrEntry],
    roll: &VoterRoll,
    threshold: f64,
    cancel: Option<&AtomicBool>,
    progress: Option<ProgressFn<'_>>,
) -> (Vec<MatchRecord>, MatchSummary) {
    let matcher = TieredMatcher::new(roll, threshold);
    let total = entries.len();
    let processed = AtomicUsize::new(0);

    let rows: Vec<Option<MatchRecord>> = entries
        .par_iter()
        .map(|entry| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return None;
            }

            let outcome = matcher.match_entry(entry);

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(report) = progress {
                report(done, total);
            }

            if outcome.tier == MatchTier::NoMatch && !entry.has_name() {
                return None;
            }
            Some(MatchRecord::from_outcome(entry, &outcome, threshold))
        })
        .collect();

    let results: Vec<MatchRecord> = rows.into_iter().flatten().collect();
    let skipped = entries.iter().filter(|e| !e.has_name()).count();
    let summary = MatchSummary::from_results(&results, skipped);
    (results, summary)
}
