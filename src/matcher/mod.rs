//! Tiered matcher
//!
//! Resolves one OCR entry against the voter roll in successively broader
//! scopes:
//! 1. ward-scoped combined name+address match (short-circuits on accept)
//! 2. global combined match over the full roll
//! 3. name-only fallback, address reconstructed from the matched record
//!
//! Whichever tiers ran, the single highest-scoring result wins; ties go to
//! the earlier, more specific tier. An empty OCR name or an empty roll
//! yields the sentinel no-match outcome rather than an error.

pub mod batch;

use crate::normalize::{join_components, normalize};
use crate::ocr::OcrEntry;
use crate::retrieve::{self, MatchCandidate};
use crate::roll::VoterRoll;
use crate::scoring::{harmonic_mean, score};

/// Default acceptance threshold on the 0-100 scale.
pub const DEFAULT_THRESHOLD: f64 = 92.5;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchTier {
    WardCombined,
    GlobalCombined,
    NameOnly,
    #[default]
    NoMatch,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::WardCombined => write!(f, "ward"),
            MatchTier::GlobalCombined => write!(f, "global"),
            MatchTier::NameOnly => write!(f, "name-only"),
            MatchTier::NoMatch => write!(f, "none"),
        }
    }
}

/// Resolved match for one OCR entry.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matched_name: String,
    pub matched_address: String,
    pub score: f64,
    pub reference_id: Option<usize>,
    pub tier: MatchTier,
    /// Harmonic mean of the name and address scores, carried on
    /// name-only outcomes as a diagnostic. The reported score stays the
    /// raw name score.
    pub combined_score: Option<f64>,
}

impl MatchOutcome {
    /// Sentinel for entries that cannot be matched (empty name, empty
    /// roll). Callers exclude these from the result table.
    pub fn no_match() -> Self {
        Self {
            matched_name: String::new(),
            matched_address: String::new(),
            score: 0.0,
            reference_id: None,
            tier: MatchTier::NoMatch,
            combined_score: None,
        }
    }
}

pub struct TieredMatcher<'a> {
    roll: &'a VoterRoll,
    threshold: f64,
}

impl<'a> TieredMatcher<'a> {
    pub fn new(roll: &'a VoterRoll, threshold: f64) -> Self {
        Self { roll, threshold }
    }

    /// Resolve one entry. Pure with respect to shared state; safe to call
    /// from parallel workers holding the same roll reference.
    pub fn match_entry(&self, entry: &OcrEntry) -> MatchOutcome {
        if !entry.has_name() || self.roll.is_empty() {
            return MatchOutcome::no_match();
        }

        let name_norm = normalize(&entry.name);
        let addr_norm = normalize(&entry.address);
        let combined_query = join_components([name_norm.as_str(), addr_norm.as_str()]);

        // Tier 1: ward-scoped combined match. An unknown or blank ward
        // means an empty corpus here; fall through without a result.
        let ward_ids = self.roll.ward_ids(&entry.ward);
        let tier1 = if ward_ids.is_empty() {
            None
        } else {
            let corpus = ward_ids.iter().map(|&id| (id, self.roll.combined_key(id)));
            retrieve::best_match(&combined_query, corpus).ok()
        };
        if let Some(candidate) = &tier1 {
            if candidate.score >= self.threshold {
                return self.combined_outcome(candidate, MatchTier::WardCombined);
            }
        }

        // Tier 2: same combined match against the full roll (ward
        // included; the corpus is a superset of Tier 1's).
        let tier2 = retrieve::best_match(&combined_query, self.roll.combined_corpus()).ok();
        if let Some(candidate) = &tier2 {
            if candidate.score >= self.threshold {
                return self.combined_outcome(candidate, MatchTier::GlobalCombined);
            }
        }

        // Tier 3: name-only fallback over the full roll.
        let tier3 = retrieve::best_match(&name_norm, self.roll.name_corpus()).ok();

        // Resolution: highest score wins; candidates are visited in tier
        // precedence order, so a strict comparison keeps the earlier tier
        // on ties.
        let mut best: Option<(MatchTier, &MatchCandidate)> = None;
        let ranked = [
            (MatchTier::WardCombined, tier1.as_ref()),
            (MatchTier::GlobalCombined, tier2.as_ref()),
            (MatchTier::NameOnly, tier3.as_ref()),
        ];
        for (tier, candidate) in ranked {
            if let Some(candidate) = candidate {
                if best.map_or(true, |(_, current)| candidate.score > current.score) {
                    best = Some((tier, candidate));
                }
            }
        }

        match best {
            Some((MatchTier::NameOnly, candidate)) => self.name_only_outcome(candidate, entry),
            Some((tier, candidate)) => self.combined_outcome(candidate, tier),
            None => MatchOutcome::no_match(),
        }
    }

    fn combined_outcome(&self, candidate: &MatchCandidate, tier: MatchTier) -> MatchOutcome {
        let Some(record) = self.roll.get(candidate.reference_id) else {
            return MatchOutcome::no_match();
        };
        MatchOutcome {
            matched_name: record.full_name.clone(),
            matched_address: record.full_address.clone(),
            score: candidate.score,
            reference_id: Some(record.id),
            tier,
            combined_score: None,
        }
    }

    fn name_only_outcome(&self, candidate: &MatchCandidate, entry: &OcrEntry) -> MatchOutcome {
        let Some(record) = self.roll.get(candidate.reference_id) else {
            return MatchOutcome::no_match();
        };
        let address_score = score(&entry.address, &record.full_address);
        MatchOutcome {
            matched_name: record.full_name.clone(),
            matched_address: record.full_address.clone(),
            score: candidate.score,
            reference_id: Some(record.id),
            tier: MatchTier::NameOnly,
            combined_score: Some(harmonic_mean(candidate.score, address_score)),
        }
    }
}
