//! Ranking and de-duplication of scored suggestions

use crate::types::{Suggestion, TaxonomyCode};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Sort by descending confidence, keep the first hit per full code, truncate
///
/// The sort is stable: equal scores keep emission order, so dictionary
/// suggestions stay ahead of static-rule ones.
pub fn rank(mut suggestions: Vec<Suggestion>, limit: usize) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut seen: HashSet<TaxonomyCode> = HashSet::new();
    suggestions
        .into_iter()
        .filter(|suggestion| seen.insert(suggestion.code.clone()))
        .take(limit)
        .collect()
}
