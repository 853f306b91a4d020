//! Integration tests for dictionary seeding

mod helpers;

use fleetcode_suggest::db::dictionary::{count_entries, load_global_entries, save_entry};
use fleetcode_suggest::services::{DictionarySeeder, SeedReport};
use fleetcode_suggest::types::{DictionaryEntry, DictionaryScope, Provenance, SuggestionSource, TaxonomyCode};
use fleetcode_suggest::RuleSet;
use helpers::*;
use uuid::Uuid;

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let repo = create_test_repository().await;
    let seeder = DictionarySeeder::new(repo.clone(), RuleSet::builtin());

    let first = seeder.seed(DictionaryScope::Global).await.unwrap();
    assert_eq!(first, SeedReport { inserted: 19, skipped: 0 });
    let after_first = count_entries(repo.pool(), DictionaryScope::Global).await.unwrap();

    let second = seeder.seed(DictionaryScope::Global).await.unwrap();
    assert_eq!(second, SeedReport { inserted: 0, skipped: 19 });
    let after_second = count_entries(repo.pool(), DictionaryScope::Global).await.unwrap();

    assert_eq!(after_first, 19);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_seed_entries_mirror_rules() {
    let repo = create_test_repository().await;
    DictionarySeeder::new(repo.clone(), RuleSet::builtin())
        .seed(DictionaryScope::Global)
        .await
        .unwrap();

    let entries = load_global_entries(repo.pool()).await.unwrap();
    let brakes = entries.iter().find(|e| e.code.system == "013").unwrap();
    let rule = RuleSet::builtin().get("013").unwrap();

    assert!(brakes.code.is_system_level());
    assert_eq!(brakes.title, rule.title);
    assert_eq!(brakes.keywords.len(), rule.keywords.len());
    assert_eq!(brakes.provenance, Provenance::Seed);
    assert!(brakes.active);
}

#[tokio::test]
async fn test_scopes_seed_independently() {
    let repo = create_test_repository().await;
    let seeder = DictionarySeeder::new(repo.clone(), RuleSet::builtin());
    let org = Uuid::new_v4();

    seeder.seed(DictionaryScope::Global).await.unwrap();
    let report = seeder.seed(DictionaryScope::Organization(org)).await.unwrap();

    assert_eq!(report.inserted, 19);
    assert_eq!(count_entries(repo.pool(), DictionaryScope::Organization(org)).await.unwrap(), 19);
}

#[tokio::test]
async fn test_existing_user_entry_skipped_inactive_ignored() {
    let repo = create_test_repository().await;
    let org = Uuid::new_v4();
    let scope = DictionaryScope::Organization(org);

    let curated = DictionaryEntry::new(
        scope,
        TaxonomyCode::system("013"),
        "Brakes",
        vec!["retarder".to_string()],
        Provenance::User,
    );
    save_entry(repo.pool(), &curated).await.unwrap();

    let mut retired = DictionaryEntry::new(
        scope,
        TaxonomyCode::system("017"),
        "Tires",
        vec!["rubber".to_string()],
        Provenance::User,
    );
    retired.active = false;
    save_entry(repo.pool(), &retired).await.unwrap();

    // Component-level entries do not count as system-level coverage
    let component = DictionaryEntry::new(
        scope,
        TaxonomyCode::new("034", Some("001".into()), Some("002".into())),
        "Headlamp",
        vec!["headlamp".to_string()],
        Provenance::User,
    );
    save_entry(repo.pool(), &component).await.unwrap();

    let report = DictionarySeeder::new(repo.clone(), RuleSet::builtin())
        .seed(scope)
        .await
        .unwrap();

    assert_eq!(report, SeedReport { inserted: 18, skipped: 1 });
}

#[tokio::test]
async fn test_seeded_entries_suppress_static_rules() {
    let repo = create_test_repository().await;
    DictionarySeeder::new(repo.clone(), RuleSet::builtin())
        .seed(DictionaryScope::Global)
        .await
        .unwrap();

    let result = create_engine(&repo)
        .suggest_for_text(Uuid::new_v4(), "brk chmbr leaking", None)
        .await
        .unwrap();

    let brakes: Vec<_> = result
        .suggestions
        .iter()
        .filter(|s| s.code.system == "013")
        .collect();
    assert_eq!(brakes.len(), 1);
    assert_eq!(brakes[0].source, SuggestionSource::Dictionary);
    assert!(brakes[0].dictionary_entry_id.is_some());
}
