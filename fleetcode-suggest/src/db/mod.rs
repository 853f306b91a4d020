//! Store access for the suggestion engine
//!
//! The engine talks to persistence only through the traits below, so tests
//! can substitute failing or in-memory doubles. [`SqliteRepository`] is the
//! production implementation over the shared `fleetcode.db`.

pub mod catalog;
pub mod dictionary;
pub mod feedback;
pub mod parameters;
pub mod repository;

pub use parameters::EngineParameters;
pub use repository::SqliteRepository;

use crate::taxonomy::SafetySystem;
use crate::types::{CatalogItem, DictionaryEntry, DictionaryScope, FeedbackRecord, Suggestion, TaxonomyCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetcode_common::Result;
use uuid::Uuid;

/// Catalog item reads and the two permitted writes
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn load_item(&self, id: Uuid) -> Result<Option<CatalogItem>>;

    /// Items of `organization_id` with no assigned system code
    async fn uncoded_items(&self, organization_id: Uuid, limit: usize) -> Result<Vec<CatalogItem>>;

    /// Overwrite the suggestion cache; `None` clears it
    async fn update_suggestion_cache(
        &self,
        id: Uuid,
        suggestion: Option<&Suggestion>,
        confidence: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Write the final code and safety category, refreshing the cache
    async fn assign_code(
        &self,
        id: Uuid,
        code: &TaxonomyCode,
        safety_system: SafetySystem,
        suggestion: &Suggestion,
        at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Dictionary reads plus the seeder's insert path
#[async_trait]
pub trait DictionaryStore: Send + Sync {
    /// Active entries owned by one organization
    async fn organization_entries(&self, organization_id: Uuid) -> Result<Vec<DictionaryEntry>>;

    /// Active entries shared by all organizations
    async fn global_entries(&self) -> Result<Vec<DictionaryEntry>>;

    async fn has_active_system_entry(&self, scope: DictionaryScope, system_code: &str) -> Result<bool>;

    async fn insert_entry(&self, entry: &DictionaryEntry) -> Result<()>;
}

/// Append-only feedback log
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append(&self, record: &FeedbackRecord) -> Result<()>;
}
