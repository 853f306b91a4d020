//! Test Helper Utilities
//!
//! Shared utilities for testing fleetcode-suggest: in-memory database,
//! catalog fixtures and store/classifier doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetcode_common::{Error, Result};
use fleetcode_suggest::db::{catalog, CatalogStore, EngineParameters, SqliteRepository};
use fleetcode_suggest::services::{
    ClassificationRequest, ClassifierError, ClassifierVerdict, EscalationErrorKind,
    TaxonomyClassifier,
};
use fleetcode_suggest::taxonomy::SafetySystem;
use fleetcode_suggest::types::{CatalogItem, Suggestion, TaxonomyCode};
use fleetcode_suggest::{RuleSet, SuggestionEngine};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory database with the full schema and default settings
///
/// One connection only: every connection to `sqlite::memory:` is a separate database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    fleetcode_common::db::init_schema(&pool).await.unwrap();
    pool
}

pub async fn create_test_repository() -> Arc<SqliteRepository> {
    Arc::new(SqliteRepository::new(create_test_pool().await))
}

/// Insert an uncoded catalog item
pub async fn insert_item(
    repo: &SqliteRepository,
    organization_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> CatalogItem {
    let item = CatalogItem::new(organization_id, name, description.map(str::to_string));
    catalog::save_catalog_item(repo.pool(), &item).await.unwrap();
    item
}

/// Insert a catalog item that already carries a code
pub async fn insert_coded_item(repo: &SqliteRepository, organization_id: Uuid, name: &str, system: &str) -> CatalogItem {
    let mut item = CatalogItem::new(organization_id, name, None);
    item.code = Some(TaxonomyCode::system(system));
    item.safety_system = Some(SafetySystem::for_system_code(system));
    catalog::save_catalog_item(repo.pool(), &item).await.unwrap();
    item
}

/// Engine over the repository with default parameters and no classifier
pub fn create_engine(repo: &Arc<SqliteRepository>) -> SuggestionEngine {
    create_engine_with(repo, EngineParameters::default())
}

pub fn create_engine_with(repo: &Arc<SqliteRepository>, params: EngineParameters) -> SuggestionEngine {
    SuggestionEngine::new(repo.clone(), repo.clone(), RuleSet::builtin(), params)
}

/// Classifier double with a fixed answer and a call counter
pub struct MockClassifier {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Answer(ClassifierVerdict),
    Fail(EscalationErrorKind),
}

impl MockClassifier {
    pub fn answering(code: &str, confidence: f64) -> Arc<Self> {
        Arc::new(Self {
            outcome: MockOutcome::Answer(ClassifierVerdict {
                code: code.to_string(),
                confidence,
                rationale: "mock rationale".to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(kind: EscalationErrorKind) -> Arc<Self> {
        Arc::new(Self {
            outcome: MockOutcome::Fail(kind),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaxonomyClassifier for MockClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> std::result::Result<ClassifierVerdict, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.codes.len(), RuleSet::builtin().len());

        match &self.outcome {
            MockOutcome::Answer(verdict) => Ok(verdict.clone()),
            MockOutcome::Fail(kind) => Err(match kind {
                EscalationErrorKind::NotConfigured => ClassifierError::NotConfigured("mock".into()),
                EscalationErrorKind::Network => ClassifierError::Network("connection refused".into()),
                EscalationErrorKind::Api => ClassifierError::Api(503, "unavailable".into()),
                EscalationErrorKind::MalformedResponse => ClassifierError::Parse("garbage".into()),
                EscalationErrorKind::UnknownCode => ClassifierError::UnknownCode("999".into()),
            }),
        }
    }
}

/// Catalog store that delegates to SQLite but fails on demand
pub struct FailingCatalogStore {
    inner: Arc<SqliteRepository>,
    /// Cache writes for this item fail
    pub fail_item: Option<Uuid>,
    /// The uncoded-item selection fails
    pub fail_selection: bool,
}

impl FailingCatalogStore {
    pub fn new(inner: Arc<SqliteRepository>) -> Self {
        Self {
            inner,
            fail_item: None,
            fail_selection: false,
        }
    }
}

#[async_trait]
impl CatalogStore for FailingCatalogStore {
    async fn load_item(&self, id: Uuid) -> Result<Option<CatalogItem>> {
        self.inner.load_item(id).await
    }

    async fn uncoded_items(&self, organization_id: Uuid, limit: usize) -> Result<Vec<CatalogItem>> {
        if self.fail_selection {
            return Err(Error::Internal("selection failed".into()));
        }
        self.inner.uncoded_items(organization_id, limit).await
    }

    async fn update_suggestion_cache(
        &self,
        id: Uuid,
        suggestion: Option<&Suggestion>,
        confidence: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.fail_item == Some(id) {
            return Err(Error::Internal("disk full".into()));
        }
        self.inner.update_suggestion_cache(id, suggestion, confidence, at).await
    }

    async fn assign_code(
        &self,
        id: Uuid,
        code: &TaxonomyCode,
        safety_system: SafetySystem,
        suggestion: &Suggestion,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.assign_code(id, code, safety_system, suggestion, at).await
    }
}
