//! Core domain types shared by the suggestion pipeline, stores and feedback log

use crate::taxonomy::SafetySystem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Taxonomy codes
// ============================================================================

/// Hierarchical taxonomy code: system, optionally narrowed to assembly and component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyCode {
    pub system: String,
    pub assembly: Option<String>,
    pub component: Option<String>,
}

impl TaxonomyCode {
    /// System-level code (no assembly/component)
    pub fn system(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            assembly: None,
            component: None,
        }
    }

    pub fn new(
        system: impl Into<String>,
        assembly: Option<String>,
        component: Option<String>,
    ) -> Self {
        Self {
            system: system.into(),
            assembly,
            component,
        }
    }

    pub fn is_system_level(&self) -> bool {
        self.assembly.is_none() && self.component.is_none()
    }
}

impl fmt::Display for TaxonomyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.system)?;
        if let Some(assembly) = &self.assembly {
            write!(f, "-{}", assembly)?;
        }
        if let Some(component) = &self.component {
            write!(f, "-{}", component)?;
        }
        Ok(())
    }
}

// ============================================================================
// Catalog items
// ============================================================================

/// Stocked part (or any catalog row) that can carry a taxonomy code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Assigned code; None means the item is still uncoded
    pub code: Option<TaxonomyCode>,
    pub safety_system: Option<SafetySystem>,
    pub last_suggestion: Option<Suggestion>,
    pub last_confidence: Option<f64>,
    pub last_suggested_at: Option<DateTime<Utc>>,
}

impl CatalogItem {
    pub fn new(organization_id: Uuid, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            name: name.into(),
            description,
            code: None,
            safety_system: None,
            last_suggestion: None,
            last_confidence: None,
            last_suggested_at: None,
        }
    }

    /// Text fed to the normalizer: name followed by description
    pub fn search_text(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => {
                format!("{} {}", self.name, description)
            }
            _ => self.name.clone(),
        }
    }
}

// ============================================================================
// Dictionary
// ============================================================================

/// Visibility of a dictionary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum DictionaryScope {
    /// Shared by every organization
    Global,
    Organization(Uuid),
}

impl DictionaryScope {
    pub fn organization_id(&self) -> Option<Uuid> {
        match self {
            DictionaryScope::Global => None,
            DictionaryScope::Organization(id) => Some(*id),
        }
    }
}

impl fmt::Display for DictionaryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryScope::Global => write!(f, "global"),
            DictionaryScope::Organization(id) => write!(f, "organization:{}", id),
        }
    }
}

/// Where a dictionary entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Generated from the built-in rule set
    Seed,
    /// Curated by a user
    User,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Seed => "seed",
            Provenance::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "seed" => Some(Provenance::Seed),
            "user" => Some(Provenance::User),
            _ => None,
        }
    }
}

/// Keyword-to-code mapping layered over the static rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: Uuid,
    pub scope: DictionaryScope,
    pub code: TaxonomyCode,
    pub title: String,
    /// Free-form phrases, matched case-insensitively
    pub keywords: Vec<String>,
    pub active: bool,
    pub provenance: Provenance,
}

impl DictionaryEntry {
    pub fn new(
        scope: DictionaryScope,
        code: TaxonomyCode,
        title: impl Into<String>,
        keywords: Vec<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            code,
            title: title.into(),
            keywords,
            active: true,
            provenance,
        }
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// Which tier produced a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Dictionary,
    StaticRule,
    Ai,
}

/// Proposed taxonomy code with confidence and justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub code: TaxonomyCode,
    pub title: String,
    pub safety_system: SafetySystem,
    /// Heuristic score in [0.0, 1.0]
    pub confidence: f64,
    pub explanation: String,
    pub matched_keywords: Vec<String>,
    pub source: SuggestionSource,
    pub dictionary_entry_id: Option<Uuid>,
    #[serde(default)]
    pub ai_enhanced: bool,
}

// ============================================================================
// Feedback
// ============================================================================

/// Immutable record of a human accept/reject decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// None for free-text findings not tied to a catalog item
    pub catalog_item_id: Option<Uuid>,
    /// Finding text, recorded only when there is no catalog item
    pub source_text: Option<String>,
    pub suggested_code: TaxonomyCode,
    pub suggested_confidence: f64,
    pub accepted: bool,
    /// Code finally applied; may differ from the suggestion on manual override
    pub final_code: Option<TaxonomyCode>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
