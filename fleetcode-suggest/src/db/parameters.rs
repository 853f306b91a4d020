//! Engine parameter management
//!
//! Load/save suggestion tuning parameters from the settings table

use fleetcode_common::db::settings::{get_parsed_setting, set_setting};
use fleetcode_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Tunable thresholds and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParameters {
    /// Suggestions kept per catalog item (default 3)
    pub item_limit: usize,

    /// Suggestions kept per free-text request (default 5)
    pub text_limit: usize,

    /// Batch top picks above this count as high confidence (default 0.9)
    pub high_confidence_threshold: f64,

    /// Free-text top below this needs user confirmation (default 0.8)
    pub confirmation_threshold: f64,

    /// Free-text top below this triggers AI escalation (default 0.85)
    pub escalation_threshold: f64,

    /// Base weight of dictionary candidates (default 0.75)
    pub dictionary_base_confidence: f64,

    /// Master switch for AI escalation (default true)
    pub ai_escalation_enabled: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            item_limit: 3,
            text_limit: 5,
            high_confidence_threshold: 0.9,
            confirmation_threshold: 0.8,
            escalation_threshold: 0.85,
            dictionary_base_confidence: 0.75,
            ai_escalation_enabled: true,
        }
    }
}

/// Load engine parameters from database
///
/// Returns default values for keys not set in database
pub async fn load_engine_parameters(pool: &SqlitePool) -> Result<EngineParameters> {
    let mut params = EngineParameters::default();
    let mut loaded_count = 0;

    if let Some(val) = get_parsed_setting::<usize>(pool, "suggest_item_limit").await? {
        params.item_limit = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<usize>(pool, "suggest_text_limit").await? {
        params.text_limit = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<f64>(pool, "suggest_high_confidence_threshold").await? {
        params.high_confidence_threshold = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<f64>(pool, "suggest_confirmation_threshold").await? {
        params.confirmation_threshold = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<f64>(pool, "suggest_escalation_threshold").await? {
        params.escalation_threshold = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<f64>(pool, "suggest_dictionary_base_confidence").await? {
        params.dictionary_base_confidence = val;
        loaded_count += 1;
    }
    if let Some(val) = get_parsed_setting::<bool>(pool, "suggest_ai_escalation_enabled").await? {
        params.ai_escalation_enabled = val;
        loaded_count += 1;
    }

    tracing::debug!("Loaded {} engine parameters from database (7 total)", loaded_count);
    Ok(params)
}

/// Save engine parameters to database
pub async fn save_engine_parameters(pool: &SqlitePool, params: &EngineParameters) -> Result<()> {
    tracing::info!("Saving engine parameters to database: {:?}", params);

    set_setting(pool, "suggest_item_limit", &params.item_limit.to_string()).await?;
    set_setting(pool, "suggest_text_limit", &params.text_limit.to_string()).await?;
    set_setting(
        pool,
        "suggest_high_confidence_threshold",
        &params.high_confidence_threshold.to_string(),
    )
    .await?;
    set_setting(
        pool,
        "suggest_confirmation_threshold",
        &params.confirmation_threshold.to_string(),
    )
    .await?;
    set_setting(
        pool,
        "suggest_escalation_threshold",
        &params.escalation_threshold.to_string(),
    )
    .await?;
    set_setting(
        pool,
        "suggest_dictionary_base_confidence",
        &params.dictionary_base_confidence.to_string(),
    )
    .await?;
    set_setting(
        pool,
        "suggest_ai_escalation_enabled",
        if params.ai_escalation_enabled { "true" } else { "false" },
    )
    .await?;

    Ok(())
}
