//! Suggestion Orchestrator
//!
//! Entry points for catalog items, batches of uncoded items and free text.
//! Runs normalizer, matcher, scorer and ranker in sequence, then (free text
//! only) the optional AI escalation stage. Only the single-item path writes,
//! and it only touches the item's suggestion cache.

use crate::db::{CatalogStore, DictionaryStore, EngineParameters};
use crate::error::{SuggestError, SuggestResult};
use crate::services::ai_escalation::{needs_escalation, EscalationAdapter, SuggestionTier};
use crate::services::classifier_client::TaxonomyClassifier;
use crate::services::confidence_scorer::ConfidenceScorer;
use crate::services::matcher::{CandidateSource, Matcher, RawMatch};
use crate::services::normalizer::normalize;
use crate::services::ranker::rank;
use crate::taxonomy::{RuleSet, SafetySystem};
use crate::types::{DictionaryEntry, Suggestion};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Ranked suggestions for one catalog item
#[derive(Debug, Clone, Serialize)]
pub struct ItemSuggestions {
    pub item_id: Uuid,
    pub suggestions: Vec<Suggestion>,
    pub top: Option<Suggestion>,
}

/// Aggregate of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSuggestions {
    pub results: Vec<ItemSuggestions>,
    /// Items suggested successfully
    pub processed: usize,
    /// Items skipped after an error
    pub failed: usize,
    /// Top picks above the high-confidence threshold
    pub high_confidence_count: usize,
}

/// Ranked suggestions for free text
#[derive(Debug, Clone, Serialize)]
pub struct TextSuggestions {
    pub suggestions: Vec<Suggestion>,
    pub top: Option<Suggestion>,
    pub needs_user_confirmation: bool,
    pub tier: SuggestionTier,
}

/// Suggestion engine over injected stores
pub struct SuggestionEngine {
    catalog: Arc<dyn CatalogStore>,
    dictionary: Arc<dyn DictionaryStore>,
    escalation: Option<EscalationAdapter>,
    rules: &'static RuleSet,
    matcher: Matcher,
    scorer: ConfidenceScorer,
    params: EngineParameters,
}

impl SuggestionEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        dictionary: Arc<dyn DictionaryStore>,
        rules: &'static RuleSet,
        params: EngineParameters,
    ) -> Self {
        Self {
            catalog,
            dictionary,
            escalation: None,
            rules,
            matcher: Matcher::new(rules, params.dictionary_base_confidence),
            scorer: ConfidenceScorer::new(),
            params,
        }
    }

    /// Enable the AI escalation stage for free text
    pub fn with_classifier(mut self, classifier: Arc<dyn TaxonomyClassifier>) -> Self {
        self.escalation = Some(EscalationAdapter::new(classifier, self.rules));
        self
    }

    /// Suggest codes for one catalog item and cache the top pick on it
    pub async fn suggest_for_item(&self, item_id: Uuid) -> SuggestResult<ItemSuggestions> {
        let item = self
            .catalog
            .load_item(item_id)
            .await?
            .ok_or(SuggestError::ItemNotFound(item_id))?;

        let entries = self.dictionary_entries(item.organization_id).await?;
        let suggestions = self.keyword_suggestions(&item.search_text(), &entries, self.params.item_limit);
        let top = suggestions.first().cloned();

        self.catalog
            .update_suggestion_cache(
                item.id,
                top.as_ref(),
                top.as_ref().map(|s| s.confidence),
                Utc::now(),
            )
            .await?;

        match &top {
            Some(best) => info!(
                item_id = %item.id,
                code = %best.code,
                confidence = best.confidence,
                candidates = suggestions.len(),
                "Suggestion cached"
            ),
            None => info!(item_id = %item.id, "No suggestion matched, cache cleared"),
        }

        Ok(ItemSuggestions {
            item_id: item.id,
            suggestions,
            top,
        })
    }

    /// Suggest for up to `limit` uncoded items of an organization
    ///
    /// Items are processed one after another. A failing item is logged and
    /// counted; only a failing selection query fails the batch.
    pub async fn suggest_batch(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> SuggestResult<BatchSuggestions> {
        let items = self.catalog.uncoded_items(organization_id, limit).await?;

        info!(
            organization_id = %organization_id,
            items = items.len(),
            "Starting batch suggestion"
        );

        let mut batch = BatchSuggestions {
            results: Vec::with_capacity(items.len()),
            processed: 0,
            failed: 0,
            high_confidence_count: 0,
        };

        for item in items {
            match self.suggest_for_item(item.id).await {
                Ok(result) => {
                    if result
                        .top
                        .as_ref()
                        .is_some_and(|top| top.confidence > self.params.high_confidence_threshold)
                    {
                        batch.high_confidence_count += 1;
                    }
                    batch.processed += 1;
                    batch.results.push(result);
                }
                Err(e) => {
                    warn!(item_id = %item.id, error = %e, "Skipping item after suggestion failure");
                    batch.failed += 1;
                }
            }
        }

        info!(
            processed = batch.processed,
            failed = batch.failed,
            high_confidence = batch.high_confidence_count,
            "Batch suggestion complete"
        );

        Ok(batch)
    }

    /// Suggest codes for free text such as an inspection finding
    ///
    /// Nothing is persisted. Escalates to the classifier when one is attached,
    /// escalation is enabled, and the keyword top is missing or weak.
    pub async fn suggest_for_text(
        &self,
        organization_id: Uuid,
        text: &str,
        notes: Option<&str>,
    ) -> SuggestResult<TextSuggestions> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());

        let search_text = match notes {
            Some(notes) => format!("{} {}", text, notes),
            None => text.to_string(),
        };

        let entries = self.dictionary_entries(organization_id).await?;
        let mut suggestions = self.keyword_suggestions(&search_text, &entries, self.params.text_limit);
        let mut tier = SuggestionTier::Keyword;

        if let Some(adapter) = &self.escalation {
            if self.params.ai_escalation_enabled
                && needs_escalation(suggestions.first(), self.params.escalation_threshold)
            {
                let (merged, escalated_tier) = adapter
                    .escalate(text, notes, suggestions, self.params.text_limit)
                    .await;
                suggestions = merged;
                tier = escalated_tier;
            }
        }

        let top = suggestions.first().cloned();
        let needs_user_confirmation = top
            .as_ref()
            .map_or(true, |t| t.confidence < self.params.confirmation_threshold);

        debug!(
            organization_id = %organization_id,
            suggestions = suggestions.len(),
            needs_user_confirmation,
            tier = ?tier,
            "Free-text suggestion complete"
        );

        Ok(TextSuggestions {
            suggestions,
            top,
            needs_user_confirmation,
            tier,
        })
    }

    /// Organization entries first, then global ones
    async fn dictionary_entries(&self, organization_id: Uuid) -> SuggestResult<Vec<DictionaryEntry>> {
        let mut entries = self.dictionary.organization_entries(organization_id).await?;
        entries.extend(self.dictionary.global_entries().await?);
        Ok(entries)
    }

    /// Keyword stage: normalize, match, score, rank
    pub fn keyword_suggestions(
        &self,
        text: &str,
        entries: &[DictionaryEntry],
        limit: usize,
    ) -> Vec<Suggestion> {
        let tokens = normalize(text);
        let scored = self
            .matcher
            .find_matches(&tokens, entries)
            .into_iter()
            .map(|raw| self.to_suggestion(raw))
            .collect();

        rank(scored, limit)
    }

    fn to_suggestion(&self, raw: RawMatch) -> Suggestion {
        let total = raw.total_keywords();
        let confidence = self
            .scorer
            .score(raw.candidate.base_confidence, &raw.matched_keywords, total);

        let origin = match raw.candidate.source {
            CandidateSource::Dictionary => "dictionary entry",
            CandidateSource::StaticRule => "built-in rule",
        };
        let explanation = format!(
            "Matched {} of {} keywords for {} {} ({}): {}.",
            raw.matched_keywords.len(),
            total,
            origin,
            raw.candidate.code,
            raw.candidate.title,
            raw.matched_keywords.join(", ")
        );

        Suggestion {
            safety_system: SafetySystem::for_system_code(&raw.candidate.code.system),
            code: raw.candidate.code,
            title: raw.candidate.title,
            confidence,
            explanation,
            matched_keywords: raw.matched_keywords,
            source: raw.candidate.source.into(),
            dictionary_entry_id: raw.candidate.dictionary_entry_id,
            ai_enhanced: false,
        }
    }
}
