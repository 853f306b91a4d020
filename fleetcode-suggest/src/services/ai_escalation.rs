//! AI Escalation Adapter
//!
//! Second stage of the free-text pipeline. When the keyword stage is not
//! confident enough, the classifier is asked to pick one system code and its
//! answer is merged into the keyword list. Any classifier failure leaves the
//! keyword list untouched; the failure kind is recorded on the tier.

use crate::services::classifier_client::{
    ClassificationRequest, ClassifierError, ClassifierVerdict, CodeOption, EscalationErrorKind,
    TaxonomyClassifier,
};
use crate::services::ranker::rank;
use crate::taxonomy::{RuleSet, SafetySystem};
use crate::types::{Suggestion, SuggestionSource, TaxonomyCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Which pipeline stages produced a free-text result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SuggestionTier {
    /// Keyword stage only; escalation was not needed or not available
    #[serde(rename = "keyword")]
    Keyword,
    /// Escalation was attempted; `ai_error` is set when it failed
    #[serde(rename = "keyword+ai")]
    KeywordWithAi { ai_error: Option<EscalationErrorKind> },
}

/// True when the keyword top pick is missing or below `threshold`
pub fn needs_escalation(top: Option<&Suggestion>, threshold: f64) -> bool {
    top.map_or(true, |s| s.confidence < threshold)
}

/// Wraps a classifier with the closed code set and merge rules
pub struct EscalationAdapter {
    classifier: Arc<dyn TaxonomyClassifier>,
    rules: &'static RuleSet,
}

impl EscalationAdapter {
    pub fn new(classifier: Arc<dyn TaxonomyClassifier>, rules: &'static RuleSet) -> Self {
        Self { classifier, rules }
    }

    /// Ask the classifier and merge its answer into `suggestions`
    ///
    /// Returns the keyword list unchanged on failure.
    pub async fn escalate(
        &self,
        text: &str,
        notes: Option<&str>,
        suggestions: Vec<Suggestion>,
        limit: usize,
    ) -> (Vec<Suggestion>, SuggestionTier) {
        match self.query(text, notes).await {
            Ok(verdict) => {
                info!(
                    code = %verdict.code,
                    confidence = verdict.confidence,
                    "AI escalation succeeded"
                );
                let merged = merge_verdict(suggestions, &verdict, self.rules, limit);
                (merged, SuggestionTier::KeywordWithAi { ai_error: None })
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "AI escalation failed, keeping keyword result");
                (
                    suggestions,
                    SuggestionTier::KeywordWithAi {
                        ai_error: Some(e.kind()),
                    },
                )
            }
        }
    }

    async fn query(&self, text: &str, notes: Option<&str>) -> Result<ClassifierVerdict, ClassifierError> {
        let request = ClassificationRequest {
            text: text.to_string(),
            notes: notes.map(str::to_string),
            codes: self
                .rules
                .iter()
                .map(|rule| CodeOption {
                    code: rule.system_code.to_string(),
                    title: rule.title.to_string(),
                })
                .collect(),
        };

        let mut verdict = self.classifier.classify(&request).await?;

        let code = verdict.code.trim().to_string();
        if self.rules.get(&code).is_none() {
            return Err(ClassifierError::UnknownCode(code));
        }
        if verdict.confidence.is_nan() {
            return Err(ClassifierError::Parse("Confidence is not a number".to_string()));
        }

        verdict.code = code;
        verdict.confidence = verdict.confidence.clamp(0.0, 1.0);
        Ok(verdict)
    }
}

/// Fold a validated verdict into a ranked list
///
/// The first suggestion (in ranked order) sharing the verdict's system code
/// takes the higher of both confidences and is flagged AI-enhanced. Without
/// such a suggestion the verdict is prepended as a new system-level entry.
/// The list is then re-ranked and re-truncated.
pub fn merge_verdict(
    mut suggestions: Vec<Suggestion>,
    verdict: &ClassifierVerdict,
    rules: &RuleSet,
    limit: usize,
) -> Vec<Suggestion> {
    let existing = suggestions
        .iter_mut()
        .find(|s| s.code.system == verdict.code);

    match existing {
        Some(suggestion) => {
            suggestion.confidence = suggestion.confidence.max(verdict.confidence);
            suggestion.ai_enhanced = true;
            suggestion.explanation = format!(
                "{} AI agrees: {}",
                suggestion.explanation, verdict.rationale
            );
        }
        None => {
            let title = rules
                .title(&verdict.code)
                .map(str::to_string)
                .unwrap_or_else(|| verdict.code.clone());
            suggestions.insert(
                0,
                Suggestion {
                    code: TaxonomyCode::system(verdict.code.clone()),
                    title,
                    safety_system: SafetySystem::for_system_code(&verdict.code),
                    confidence: verdict.confidence,
                    explanation: format!("AI classification: {}", verdict.rationale),
                    matched_keywords: Vec::new(),
                    source: SuggestionSource::Ai,
                    dictionary_entry_id: None,
                    ai_enhanced: true,
                },
            );
        }
    }

    rank(suggestions, limit)
}
