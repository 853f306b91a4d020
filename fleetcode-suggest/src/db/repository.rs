//! SQLite implementation of the store traits

use crate::db::{catalog, dictionary, feedback, CatalogStore, DictionaryStore, FeedbackStore};
use crate::taxonomy::SafetySystem;
use crate::types::{CatalogItem, DictionaryEntry, DictionaryScope, FeedbackRecord, Suggestion, TaxonomyCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetcode_common::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository over the shared database pool
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for SqliteRepository {
    async fn load_item(&self, id: Uuid) -> Result<Option<CatalogItem>> {
        catalog::load_catalog_item(&self.pool, id).await
    }

    async fn uncoded_items(&self, organization_id: Uuid, limit: usize) -> Result<Vec<CatalogItem>> {
        catalog::load_uncoded_items(&self.pool, organization_id, limit).await
    }

    async fn update_suggestion_cache(
        &self,
        id: Uuid,
        suggestion: Option<&Suggestion>,
        confidence: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        catalog::update_suggestion_cache(&self.pool, id, suggestion, confidence, at).await
    }

    async fn assign_code(
        &self,
        id: Uuid,
        code: &TaxonomyCode,
        safety_system: SafetySystem,
        suggestion: &Suggestion,
        at: DateTime<Utc>,
    ) -> Result<()> {
        catalog::assign_code(&self.pool, id, code, safety_system, suggestion, at).await
    }
}

#[async_trait]
impl DictionaryStore for SqliteRepository {
    async fn organization_entries(&self, organization_id: Uuid) -> Result<Vec<DictionaryEntry>> {
        dictionary::load_organization_entries(&self.pool, organization_id).await
    }

    async fn global_entries(&self) -> Result<Vec<DictionaryEntry>> {
        dictionary::load_global_entries(&self.pool).await
    }

    async fn has_active_system_entry(&self, scope: DictionaryScope, system_code: &str) -> Result<bool> {
        dictionary::has_active_system_entry(&self.pool, scope, system_code).await
    }

    async fn insert_entry(&self, entry: &DictionaryEntry) -> Result<()> {
        dictionary::save_entry(&self.pool, entry).await
    }
}

#[async_trait]
impl FeedbackStore for SqliteRepository {
    async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        feedback::save_feedback(&self.pool, record).await
    }
}
