//! Configuration resolution for fleetcode-suggest
//!
//! Classifier credentials resolve with Database → ENV → TOML priority; the
//! remaining classifier settings come from the TOML `[classifier]` section.

use crate::services::classifier_client::{
    ClassifierSettings, HttpTaxonomyClassifier, TaxonomyClassifier,
};
use fleetcode_common::config::TomlConfig;
use fleetcode_common::db::settings::{get_setting, set_setting};
use fleetcode_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the classifier API key
pub const CLASSIFIER_API_KEY_ENV: &str = "FLEETCODE_CLASSIFIER_API_KEY";

/// Settings table key holding the classifier API key
pub const CLASSIFIER_API_KEY_SETTING: &str = "classifier_api_key";

/// Resolve the classifier API key from 3-tier configuration
///
/// **Priority:** Database → ENV → TOML
///
/// Returns `Ok(None)` when no source holds a usable key.
pub async fn resolve_classifier_api_key(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_key = get_setting(db, CLASSIFIER_API_KEY_SETTING)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = std::env::var(CLASSIFIER_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .classifier
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        (db_key.is_some(), "database"),
        (env_key.is_some(), "environment"),
        (toml_key.is_some(), "TOML"),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, name)| *name)
    .collect();

    if sources.len() > 1 {
        warn!(
            "Classifier API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = db_key {
        info!("Classifier API key loaded from database");
        return Ok(Some(key));
    }
    if let Some(key) = env_key {
        info!("Classifier API key loaded from environment variable");
        return Ok(Some(key));
    }
    if let Some(key) = toml_key {
        info!("Classifier API key loaded from TOML config");
        return Ok(Some(key));
    }

    Ok(None)
}

/// Store the classifier API key in the database (authoritative tier)
pub async fn save_classifier_api_key(db: &SqlitePool, key: &str) -> Result<()> {
    if !is_valid_key(key) {
        return Err(Error::InvalidInput("Classifier API key is empty".to_string()));
    }
    set_setting(db, CLASSIFIER_API_KEY_SETTING, key.trim()).await
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Build the HTTP classifier when enabled and a key is available
///
/// Returns `Ok(None)` when the classifier is disabled or has no key; the
/// engine then runs keyword-only.
pub async fn build_classifier(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<Option<Arc<dyn TaxonomyClassifier>>> {
    let section = &toml_config.classifier;
    if !section.enabled {
        info!("Classifier disabled in config, AI escalation unavailable");
        return Ok(None);
    }

    let Some(api_key) = resolve_classifier_api_key(db, toml_config).await? else {
        warn!(
            "Classifier enabled but no API key configured. Set one of:\n\
             1. Database setting '{}'\n\
             2. Environment: {}=your-key-here\n\
             3. TOML config: [classifier] api_key = \"your-key\"",
            CLASSIFIER_API_KEY_SETTING,
            CLASSIFIER_API_KEY_ENV
        );
        return Ok(None);
    };

    let classifier = HttpTaxonomyClassifier::new(ClassifierSettings {
        endpoint: section.endpoint.clone(),
        model: section.model.clone(),
        api_key,
        timeout: Duration::from_secs(section.timeout_secs),
    })
    .map_err(|e| Error::Config(format!("Classifier setup failed: {}", e)))?;

    info!(endpoint = %section.endpoint, model = %section.model, "Classifier configured");
    Ok(Some(Arc::new(classifier)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
