//! SQLite repository tests
//!
//! Round trips through the store traits and the row mappers behind them.

mod helpers;

use chrono::Utc;
use fleetcode_common::Error;
use fleetcode_suggest::db::feedback::load_feedback_for_item;
use fleetcode_suggest::db::{CatalogStore, DictionaryStore, FeedbackStore};
use fleetcode_suggest::taxonomy::SafetySystem;
use fleetcode_suggest::types::{
    DictionaryEntry, DictionaryScope, FeedbackRecord, Provenance, Suggestion, SuggestionSource,
    TaxonomyCode,
};
use helpers::*;
use uuid::Uuid;

fn brake_suggestion() -> Suggestion {
    Suggestion {
        code: TaxonomyCode::system("013"),
        title: "Brakes".to_string(),
        safety_system: SafetySystem::Brakes,
        confidence: 0.5,
        explanation: "Matched 1 of 27 keywords".to_string(),
        matched_keywords: vec!["brake".to_string()],
        source: SuggestionSource::StaticRule,
        dictionary_entry_id: None,
        ai_enhanced: false,
    }
}

#[tokio::test]
async fn test_uncoded_items_filtered_by_organization_and_code() {
    let repo = create_test_repository().await;
    let org = Uuid::new_v4();

    let first = insert_item(&repo, org, "Brake pad", Some("front axle")).await;
    let second = insert_item(&repo, org, "Tail light", None).await;
    insert_coded_item(&repo, org, "Tire", "017").await;
    insert_item(&repo, Uuid::new_v4(), "Brake drum", None).await;

    let items = repo.uncoded_items(org, 10).await.unwrap();
    let ids: Vec<_> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(items[0].description.as_deref(), Some("front axle"));

    assert_eq!(repo.uncoded_items(org, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cache_update_and_clear() {
    let repo = create_test_repository().await;
    let item = insert_item(&repo, Uuid::new_v4(), "Brake pad", None).await;
    let suggestion = brake_suggestion();

    repo.update_suggestion_cache(item.id, Some(&suggestion), Some(0.5), Utc::now())
        .await
        .unwrap();
    let loaded = repo.load_item(item.id).await.unwrap().unwrap();
    assert_eq!(loaded.last_suggestion, Some(suggestion));
    assert_eq!(loaded.last_confidence, Some(0.5));

    repo.update_suggestion_cache(item.id, None, None, Utc::now())
        .await
        .unwrap();
    let loaded = repo.load_item(item.id).await.unwrap().unwrap();
    assert!(loaded.last_suggestion.is_none());
    assert!(loaded.last_confidence.is_none());
}

#[tokio::test]
async fn test_cache_update_missing_item() {
    let repo = create_test_repository().await;
    let result = repo
        .update_suggestion_cache(Uuid::new_v4(), None, None, Utc::now())
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_assign_code_round_trip() {
    let repo = create_test_repository().await;
    let item = insert_item(&repo, Uuid::new_v4(), "Brake pad", None).await;
    let code = TaxonomyCode::new("013", Some("001".into()), Some("007".into()));

    repo.assign_code(item.id, &code, SafetySystem::Brakes, &brake_suggestion(), Utc::now())
        .await
        .unwrap();

    let loaded = repo.load_item(item.id).await.unwrap().unwrap();
    assert_eq!(loaded.code, Some(code));
    assert_eq!(loaded.safety_system, Some(SafetySystem::Brakes));
    assert!(loaded.last_suggested_at.is_some());
}

#[tokio::test]
async fn test_unreadable_cache_is_ignored() {
    let repo = create_test_repository().await;
    let item = insert_item(&repo, Uuid::new_v4(), "Brake pad", None).await;

    sqlx::query("UPDATE catalog_items SET last_suggestion = '{\"old\": true}' WHERE id = ?")
        .bind(item.id.to_string())
        .execute(repo.pool())
        .await
        .unwrap();

    let loaded = repo.load_item(item.id).await.unwrap().unwrap();
    assert!(loaded.last_suggestion.is_none());
}

#[tokio::test]
async fn test_dictionary_scopes() {
    let repo = create_test_repository().await;
    let org = Uuid::new_v4();

    let global = DictionaryEntry::new(
        DictionaryScope::Global,
        TaxonomyCode::system("044"),
        "Fuel",
        vec!["def tank".to_string()],
        Provenance::User,
    );
    let local = DictionaryEntry::new(
        DictionaryScope::Organization(org),
        TaxonomyCode::new("044", Some("003".into()), None),
        "Fuel Tanks",
        vec!["saddle tank".to_string()],
        Provenance::User,
    );
    repo.insert_entry(&global).await.unwrap();
    repo.insert_entry(&local).await.unwrap();

    let globals = repo.global_entries().await.unwrap();
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0].id, global.id);
    assert_eq!(globals[0].keywords, vec!["def tank".to_string()]);

    let locals = repo.organization_entries(org).await.unwrap();
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].scope, DictionaryScope::Organization(org));
    assert_eq!(locals[0].code.assembly.as_deref(), Some("003"));

    assert!(repo.organization_entries(Uuid::new_v4()).await.unwrap().is_empty());

    assert!(repo.has_active_system_entry(DictionaryScope::Global, "044").await.unwrap());
    assert!(!repo
        .has_active_system_entry(DictionaryScope::Organization(org), "044")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_feedback_round_trip() {
    let repo = create_test_repository().await;
    let org = Uuid::new_v4();
    let item = insert_item(&repo, org, "Brake pad", None).await;

    let record = FeedbackRecord {
        id: Uuid::new_v4(),
        organization_id: org,
        catalog_item_id: Some(item.id),
        source_text: None,
        suggested_code: TaxonomyCode::system("013"),
        suggested_confidence: 0.91,
        accepted: true,
        final_code: Some(TaxonomyCode::new("013", Some("002".into()), None)),
        user_id: Some("tech-3".to_string()),
        notes: None,
        created_at: Utc::now(),
    };
    repo.append(&record).await.unwrap();

    let loaded = load_feedback_for_item(repo.pool(), item.id).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
    assert_eq!(loaded[0].final_code, record.final_code);
    assert_eq!(loaded[0].suggested_confidence, 0.91);
    assert_eq!(loaded[0].created_at.timestamp(), record.created_at.timestamp());
}
