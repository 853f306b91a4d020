//! Confidence Scorer
//!
//! Turns match statistics into a bounded score. The base weight comes from
//! the candidate (dictionary or rule), coverage adds up to 0.15, multiple hits
//! earn a bonus, and hits made only of generic part words are penalized.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Generic part words that say little about the system on their own
pub const AMBIGUOUS_TERMS: &[&str] = &[
    "valve", "seal", "filter", "sensor", "hose", "gasket", "bolt", "nut", "bracket", "clamp",
    "switch", "line", "kit", "cap", "fitting", "screw", "washer", "o-ring",
];

static AMBIGUOUS_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| AMBIGUOUS_TERMS.iter().copied().collect());

/// Confidence Scorer
pub struct ConfidenceScorer {
    /// Weight of matched/total keyword coverage (default 0.15)
    coverage_weight: f64,

    /// Bonus once two keywords match (default 0.05)
    multi_match_bonus: f64,

    /// Extra bonus once three keywords match (default 0.03)
    strong_match_bonus: f64,

    /// Penalty when every hit is ambiguous (default 0.15)
    ambiguous_penalty: f64,

    /// Floor for the coverage denominator (default 3)
    min_keyword_count: usize,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self {
            coverage_weight: 0.15,
            multi_match_bonus: 0.05,
            strong_match_bonus: 0.03,
            ambiguous_penalty: 0.15,
            min_keyword_count: 3,
        }
    }

    /// Score a match, clamped to [0.0, 1.0]
    ///
    /// # Arguments
    /// * `base_confidence` - Candidate's starting weight
    /// * `matched_keywords` - Keywords that hit
    /// * `total_keywords` - Size of the candidate's keyword set
    pub fn score(&self, base_confidence: f64, matched_keywords: &[String], total_keywords: usize) -> f64 {
        let matched = matched_keywords.len();
        let denominator = total_keywords.max(self.min_keyword_count) as f64;

        let mut confidence = base_confidence + (matched as f64 / denominator) * self.coverage_weight;

        if matched >= 2 {
            confidence += self.multi_match_bonus;
        }
        if matched >= 3 {
            confidence += self.strong_match_bonus;
        }
        if is_ambiguous_only(matched_keywords) {
            confidence -= self.ambiguous_penalty;
        }

        if confidence.is_nan() {
            return 0.0;
        }
        confidence.clamp(0.0, 1.0)
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// True when there is at least one hit and every hit is a generic term
pub fn is_ambiguous_only(matched_keywords: &[String]) -> bool {
    !matched_keywords.is_empty()
        && matched_keywords
            .iter()
            .all(|keyword| AMBIGUOUS_SET.contains(keyword.as_str()))
}
