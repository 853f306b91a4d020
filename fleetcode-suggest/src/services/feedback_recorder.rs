//! Feedback Recorder
//!
//! Records human accept/reject decisions. Every call appends exactly one
//! feedback record; accepting a catalog item suggestion also writes the
//! final code onto the item.

use crate::db::{CatalogStore, FeedbackStore};
use crate::error::{SuggestError, SuggestResult};
use crate::taxonomy::SafetySystem;
use crate::types::{CatalogItem, FeedbackRecord, Suggestion, TaxonomyCode};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Who decided, and why
#[derive(Debug, Clone, Default)]
pub struct DecisionContext {
    pub user_id: Option<String>,
    pub notes: Option<String>,
}

/// Accept or reject a free-text finding suggestion
#[derive(Debug, Clone)]
pub enum FindingDecision {
    Accept { override_code: Option<TaxonomyCode> },
    Reject,
}

pub struct FeedbackRecorder {
    catalog: Arc<dyn CatalogStore>,
    feedback: Arc<dyn FeedbackStore>,
}

impl FeedbackRecorder {
    pub fn new(catalog: Arc<dyn CatalogStore>, feedback: Arc<dyn FeedbackStore>) -> Self {
        Self { catalog, feedback }
    }

    /// Accept a suggestion for a catalog item
    ///
    /// `override_code` replaces the suggested code as the final code.
    pub async fn accept(
        &self,
        item_id: Uuid,
        suggestion: &Suggestion,
        override_code: Option<TaxonomyCode>,
        context: DecisionContext,
    ) -> SuggestResult<FeedbackRecord> {
        let item = self.load_item(item_id).await?;
        let final_code = resolve_final_code(suggestion, override_code)?;
        let safety_system = SafetySystem::for_system_code(&final_code.system);
        let now = Utc::now();

        self.catalog
            .assign_code(item.id, &final_code, safety_system, suggestion, now)
            .await?;

        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            organization_id: item.organization_id,
            catalog_item_id: Some(item.id),
            source_text: None,
            suggested_code: suggestion.code.clone(),
            suggested_confidence: suggestion.confidence,
            accepted: true,
            final_code: Some(final_code),
            user_id: context.user_id,
            notes: context.notes,
            created_at: now,
        };
        self.feedback.append(&record).await?;

        info!(
            item_id = %item.id,
            suggested = %record.suggested_code,
            final_code = ?record.final_code.as_ref().map(|c| c.to_string()),
            "Suggestion accepted"
        );

        Ok(record)
    }

    /// Reject a suggestion for a catalog item; the item is left unchanged
    pub async fn reject(
        &self,
        item_id: Uuid,
        suggestion: &Suggestion,
        context: DecisionContext,
    ) -> SuggestResult<FeedbackRecord> {
        let item = self.load_item(item_id).await?;

        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            organization_id: item.organization_id,
            catalog_item_id: Some(item.id),
            source_text: None,
            suggested_code: suggestion.code.clone(),
            suggested_confidence: suggestion.confidence,
            accepted: false,
            final_code: None,
            user_id: context.user_id,
            notes: context.notes,
            created_at: Utc::now(),
        };
        self.feedback.append(&record).await?;

        info!(item_id = %item.id, suggested = %record.suggested_code, "Suggestion rejected");

        Ok(record)
    }

    /// Record a decision on a free-text finding suggestion
    pub async fn record_finding_decision(
        &self,
        organization_id: Uuid,
        source_text: &str,
        suggestion: &Suggestion,
        decision: FindingDecision,
        context: DecisionContext,
    ) -> SuggestResult<FeedbackRecord> {
        let (accepted, final_code) = match decision {
            FindingDecision::Accept { override_code } => {
                (true, Some(resolve_final_code(suggestion, override_code)?))
            }
            FindingDecision::Reject => (false, None),
        };

        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            organization_id,
            catalog_item_id: None,
            source_text: Some(source_text.to_string()),
            suggested_code: suggestion.code.clone(),
            suggested_confidence: suggestion.confidence,
            accepted,
            final_code,
            user_id: context.user_id,
            notes: context.notes,
            created_at: Utc::now(),
        };
        self.feedback.append(&record).await?;

        info!(
            organization_id = %organization_id,
            suggested = %record.suggested_code,
            accepted,
            "Finding decision recorded"
        );

        Ok(record)
    }

    async fn load_item(&self, item_id: Uuid) -> SuggestResult<CatalogItem> {
        self.catalog
            .load_item(item_id)
            .await?
            .ok_or(SuggestError::ItemNotFound(item_id))
    }
}

fn resolve_final_code(
    suggestion: &Suggestion,
    override_code: Option<TaxonomyCode>,
) -> SuggestResult<TaxonomyCode> {
    let code = override_code.unwrap_or_else(|| suggestion.code.clone());
    if code.system.trim().is_empty() {
        return Err(SuggestError::InvalidInput(
            "Final code requires a system code".to_string(),
        ));
    }
    Ok(code)
}
