//! Classifier configuration resolution tests
//!
//! Tests that touch FLEETCODE_CLASSIFIER_API_KEY are marked #[serial] so they
//! never observe each other's environment.

mod helpers;

use fleetcode_common::config::{ClassifierConfig, TomlConfig};
use fleetcode_suggest::config::{
    build_classifier, resolve_classifier_api_key, save_classifier_api_key, CLASSIFIER_API_KEY_ENV,
};
use helpers::create_test_pool;
use serial_test::serial;

fn toml_with_key(key: Option<&str>, enabled: bool) -> TomlConfig {
    TomlConfig {
        classifier: ClassifierConfig {
            enabled,
            api_key: key.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
#[serial]
async fn test_database_overrides_env_and_toml() {
    let pool = create_test_pool().await;
    save_classifier_api_key(&pool, "db-key").await.unwrap();
    std::env::set_var(CLASSIFIER_API_KEY_ENV, "env-key");

    let key = resolve_classifier_api_key(&pool, &toml_with_key(Some("toml-key"), true))
        .await
        .unwrap();
    assert_eq!(key.as_deref(), Some("db-key"));

    std::env::remove_var(CLASSIFIER_API_KEY_ENV);
}

#[tokio::test]
#[serial]
async fn test_env_fallback_when_database_empty() {
    let pool = create_test_pool().await;
    std::env::set_var(CLASSIFIER_API_KEY_ENV, "env-key");

    let key = resolve_classifier_api_key(&pool, &toml_with_key(Some("toml-key"), true))
        .await
        .unwrap();
    assert_eq!(key.as_deref(), Some("env-key"));

    std::env::remove_var(CLASSIFIER_API_KEY_ENV);
}

#[tokio::test]
#[serial]
async fn test_toml_fallback_and_blank_values_ignored() {
    let pool = create_test_pool().await;
    std::env::set_var(CLASSIFIER_API_KEY_ENV, "   ");

    let key = resolve_classifier_api_key(&pool, &toml_with_key(Some("toml-key"), true))
        .await
        .unwrap();
    assert_eq!(key.as_deref(), Some("toml-key"));

    std::env::remove_var(CLASSIFIER_API_KEY_ENV);
}

#[tokio::test]
#[serial]
async fn test_no_key_anywhere() {
    let pool = create_test_pool().await;
    std::env::remove_var(CLASSIFIER_API_KEY_ENV);

    let key = resolve_classifier_api_key(&pool, &toml_with_key(None, true))
        .await
        .unwrap();
    assert!(key.is_none());

    let classifier = build_classifier(&pool, &toml_with_key(None, true)).await.unwrap();
    assert!(classifier.is_none());
}

#[tokio::test]
#[serial]
async fn test_disabled_classifier_not_built() {
    let pool = create_test_pool().await;
    std::env::remove_var(CLASSIFIER_API_KEY_ENV);

    let classifier = build_classifier(&pool, &toml_with_key(Some("toml-key"), false))
        .await
        .unwrap();
    assert!(classifier.is_none());
}

#[tokio::test]
#[serial]
async fn test_enabled_classifier_with_key_is_built() {
    let pool = create_test_pool().await;
    std::env::remove_var(CLASSIFIER_API_KEY_ENV);

    let classifier = build_classifier(&pool, &toml_with_key(Some("toml-key"), true))
        .await
        .unwrap();
    assert!(classifier.is_some());
}

#[tokio::test]
async fn test_blank_key_not_saved() {
    let pool = create_test_pool().await;
    assert!(save_classifier_api_key(&pool, "  ").await.is_err());
}
