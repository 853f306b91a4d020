//! Keyword Matcher
//!
//! Scans dictionary entries and the static rule set for keyword hits against a
//! normalized token list. Both sources are lifted into one [`Candidate`] shape
//! first, so scoring and ranking never branch on where a candidate came from.

use crate::services::normalizer::{join_tokens, normalize};
use crate::taxonomy::{RuleSet, TaxonomyRule};
use crate::types::{DictionaryEntry, SuggestionSource, TaxonomyCode};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Origin of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Dictionary,
    StaticRule,
}

impl From<CandidateSource> for SuggestionSource {
    fn from(source: CandidateSource) -> Self {
        match source {
            CandidateSource::Dictionary => SuggestionSource::Dictionary,
            CandidateSource::StaticRule => SuggestionSource::StaticRule,
        }
    }
}

/// Code with its searchable keyword set
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: CandidateSource,
    pub code: TaxonomyCode,
    pub title: String,
    /// Lowercased, de-duplicated; includes the title's normalized tokens
    pub keywords: Vec<String>,
    pub base_confidence: f64,
    pub dictionary_entry_id: Option<Uuid>,
}

impl Candidate {
    pub fn from_dictionary(entry: &DictionaryEntry, base_confidence: f64) -> Self {
        Self {
            source: CandidateSource::Dictionary,
            code: entry.code.clone(),
            title: entry.title.clone(),
            keywords: keyword_set(entry.keywords.iter().map(String::as_str), &entry.title),
            base_confidence,
            dictionary_entry_id: Some(entry.id),
        }
    }

    pub fn from_rule(rule: &TaxonomyRule) -> Self {
        Self {
            source: CandidateSource::StaticRule,
            code: TaxonomyCode::system(rule.system_code),
            title: rule.title.to_string(),
            keywords: keyword_set(rule.keywords.iter().copied(), rule.title),
            base_confidence: rule.base_confidence,
            dictionary_entry_id: None,
        }
    }
}

/// Candidate with at least one keyword hit
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub candidate: Candidate,
    /// Hits in keyword-set order
    pub matched_keywords: Vec<String>,
}

impl RawMatch {
    pub fn total_keywords(&self) -> usize {
        self.candidate.keywords.len()
    }
}

/// Build a candidate's keyword set: own keywords, then title tokens
fn keyword_set<'a>(keywords: impl Iterator<Item = &'a str>, title: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut set = Vec::new();

    let own = keywords.map(|keyword| {
        keyword
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    });

    for keyword in own.chain(normalize(title)) {
        if !keyword.is_empty() && seen.insert(keyword.clone()) {
            set.push(keyword);
        }
    }
    set
}

/// Keywords of `candidate` found in the input
///
/// Single tokens need exact membership; phrases must appear as a substring of
/// the space-joined token sequence, so word order and adjacency matter.
fn matched_keywords(candidate: &Candidate, tokens: &HashSet<&str>, joined: &str) -> Vec<String> {
    candidate
        .keywords
        .iter()
        .filter(|keyword| {
            if keyword.contains(' ') {
                joined.contains(keyword.as_str())
            } else {
                tokens.contains(keyword.as_str())
            }
        })
        .cloned()
        .collect()
}

/// Matches token lists against dictionary entries and static rules
pub struct Matcher {
    rules: &'static RuleSet,
    dictionary_base_confidence: f64,
}

impl Matcher {
    pub fn new(rules: &'static RuleSet, dictionary_base_confidence: f64) -> Self {
        Self {
            rules,
            dictionary_base_confidence,
        }
    }

    /// All candidates, dictionary entries first (inactive entries skipped)
    pub fn candidates(&self, entries: &[DictionaryEntry]) -> Vec<Candidate> {
        entries
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| Candidate::from_dictionary(entry, self.dictionary_base_confidence))
            .chain(self.rules.iter().map(Candidate::from_rule))
            .collect()
    }

    /// Raw matches in emission order: dictionary hits, then rule hits
    ///
    /// A rule is dropped when a system-level dictionary entry for the same
    /// system code already matched. Assembly and component level entries do not
    /// suppress the rule.
    pub fn find_matches(&self, tokens: &[String], entries: &[DictionaryEntry]) -> Vec<RawMatch> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let joined = join_tokens(tokens);

        let mut matches = Vec::new();
        let mut covered_systems: HashSet<String> = HashSet::new();

        for candidate in self.candidates(entries) {
            if candidate.source == CandidateSource::StaticRule
                && covered_systems.contains(&candidate.code.system)
            {
                debug!(
                    system_code = %candidate.code.system,
                    "Static rule suppressed by system-level dictionary match"
                );
                continue;
            }

            let hits = matched_keywords(&candidate, &token_set, &joined);
            if hits.is_empty() {
                continue;
            }

            debug!(
                code = %candidate.code,
                source = ?candidate.source,
                matched = hits.len(),
                total = candidate.keywords.len(),
                "Candidate matched"
            );

            if candidate.source == CandidateSource::Dictionary && candidate.code.is_system_level() {
                covered_systems.insert(candidate.code.system.clone());
            }

            matches.push(RawMatch {
                candidate,
                matched_keywords: hits,
            });
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DictionaryScope, Provenance};

    fn entry(code: TaxonomyCode, title: &str, keywords: &[&str]) -> DictionaryEntry {
        DictionaryEntry::new(
            DictionaryScope::Global,
            code,
            title,
            keywords.iter().map(|k| k.to_string()).collect(),
            Provenance::User,
        )
    }

    fn matcher() -> Matcher {
        Matcher::new(RuleSet::builtin(), 0.75)
    }

    #[test]
    fn test_keyword_set_dedupes_and_adds_title_tokens() {
        let e = entry(
            TaxonomyCode::system("013"),
            "Brakes",
            &["  Brake   Chamber ", "brake chamber", "Slack"],
        );
        let candidate = Candidate::from_dictionary(&e, 0.75);
        assert_eq!(candidate.keywords, vec!["brake chamber", "slack", "brakes"]);
        assert_eq!(candidate.dictionary_entry_id, Some(e.id));
    }

    #[test]
    fn test_brake_chamber_matches_brakes_rule() {
        let tokens = normalize("brk chmbr leaking");
        let matches = matcher().find_matches(&tokens, &[]);

        let brakes = matches
            .iter()
            .find(|m| m.candidate.code.system == "013")
            .expect("brakes should match");
        assert!(brakes.matched_keywords.contains(&"brake".to_string()));
        assert!(brakes.matched_keywords.contains(&"chamber".to_string()));
        assert!(brakes.matched_keywords.contains(&"brake chamber".to_string()));
    }

    #[test]
    fn test_multi_word_keyword_is_order_sensitive() {
        let forward = normalize("water pump");
        let reversed = normalize("pump water");

        let hits = |tokens: &[String]| {
            matcher()
                .find_matches(tokens, &[])
                .into_iter()
                .find(|m| m.candidate.code.system == "042")
                .map(|m| m.matched_keywords)
                .unwrap_or_default()
        };

        assert!(hits(&forward).contains(&"water pump".to_string()));
        assert!(!hits(&reversed).contains(&"water pump".to_string()));
    }

    #[test]
    fn test_dictionary_candidates_come_first() {
        let e = entry(TaxonomyCode::system("027"), "Driveline", &["driveshaft"]);
        let tokens = normalize("driveshaft brake");
        let matches = matcher().find_matches(&tokens, &[e]);

        assert_eq!(matches[0].candidate.source, CandidateSource::Dictionary);
        assert!(matches[1..]
            .iter()
            .all(|m| m.candidate.source == CandidateSource::StaticRule));
    }

    #[test]
    fn test_system_level_dictionary_match_suppresses_rule() {
        let e = entry(TaxonomyCode::system("013"), "Brakes", &["brake"]);
        let matches = matcher().find_matches(&normalize("brake chamber"), &[e]);

        let brake_sources: Vec<_> = matches
            .iter()
            .filter(|m| m.candidate.code.system == "013")
            .map(|m| m.candidate.source)
            .collect();
        assert_eq!(brake_sources, vec![CandidateSource::Dictionary]);
    }

    #[test]
    fn test_component_level_match_does_not_suppress_rule() {
        let e = entry(
            TaxonomyCode::new("013", Some("001".into()), Some("004".into())),
            "Brake Chamber",
            &["brake chamber"],
        );
        let matches = matcher().find_matches(&normalize("brake chamber"), &[e]);

        let brake_sources: Vec<_> = matches
            .iter()
            .filter(|m| m.candidate.code.system == "013")
            .map(|m| m.candidate.source)
            .collect();
        assert_eq!(
            brake_sources,
            vec![CandidateSource::Dictionary, CandidateSource::StaticRule]
        );
    }

    #[test]
    fn test_unmatched_dictionary_entry_does_not_suppress_rule() {
        let e = entry(TaxonomyCode::system("013"), "Stopping", &["retarder"]);
        let matches = matcher().find_matches(&normalize("brake pad"), &[e]);

        assert!(matches
            .iter()
            .any(|m| m.candidate.source == CandidateSource::StaticRule
                && m.candidate.code.system == "013"));
    }

    #[test]
    fn test_inactive_entries_ignored() {
        let mut e = entry(TaxonomyCode::system("071"), "Body", &["widget"]);
        e.active = false;
        let matches = matcher().find_matches(&normalize("widget"), &[e]);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_no_tokens_no_matches() {
        assert!(matcher().find_matches(&[], &[]).is_empty());
    }
}
