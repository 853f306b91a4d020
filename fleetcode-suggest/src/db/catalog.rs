//! Catalog item database operations

use crate::taxonomy::SafetySystem;
use crate::types::{CatalogItem, Suggestion, TaxonomyCode};
use chrono::{DateTime, Utc};
use fleetcode_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, organization_id, name, description, system_code, assembly_code, \
    component_code, safety_system, last_suggestion, last_confidence, last_suggested_at";

/// Insert a new catalog item
pub async fn save_catalog_item(pool: &SqlitePool, item: &CatalogItem) -> Result<()> {
    let suggestion_json = item
        .last_suggestion
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO catalog_items (
            id, organization_id, name, description,
            system_code, assembly_code, component_code, safety_system,
            last_suggestion, last_confidence, last_suggested_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id.to_string())
    .bind(item.organization_id.to_string())
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.code.as_ref().map(|c| c.system.clone()))
    .bind(item.code.as_ref().and_then(|c| c.assembly.clone()))
    .bind(item.code.as_ref().and_then(|c| c.component.clone()))
    .bind(item.safety_system.map(|s| s.as_str()))
    .bind(suggestion_json)
    .bind(item.last_confidence)
    .bind(item.last_suggested_at.map(|t| t.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a catalog item by id
pub async fn load_catalog_item(pool: &SqlitePool, id: Uuid) -> Result<Option<CatalogItem>> {
    let query = format!("SELECT {} FROM catalog_items WHERE id = ?", ITEM_COLUMNS);
    let row = sqlx::query(&query)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_item).transpose()
}

/// Uncoded items of an organization, oldest first
pub async fn load_uncoded_items(
    pool: &SqlitePool,
    organization_id: Uuid,
    limit: usize,
) -> Result<Vec<CatalogItem>> {
    let query = format!(
        "SELECT {} FROM catalog_items \
         WHERE organization_id = ? AND system_code IS NULL \
         ORDER BY created_at, rowid LIMIT ?",
        ITEM_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(organization_id.to_string())
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_item).collect()
}

/// Overwrite only the suggestion cache columns
pub async fn update_suggestion_cache(
    pool: &SqlitePool,
    id: Uuid,
    suggestion: Option<&Suggestion>,
    confidence: Option<f64>,
    at: DateTime<Utc>,
) -> Result<()> {
    let suggestion_json = suggestion.map(serde_json::to_string).transpose()?;

    let result = sqlx::query(
        r#"
        UPDATE catalog_items
        SET last_suggestion = ?, last_confidence = ?, last_suggested_at = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(suggestion_json)
    .bind(confidence)
    .bind(at.to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Catalog item {}", id)));
    }
    Ok(())
}

/// Write final code, safety category and the chosen suggestion
pub async fn assign_code(
    pool: &SqlitePool,
    id: Uuid,
    code: &TaxonomyCode,
    safety_system: SafetySystem,
    suggestion: &Suggestion,
    at: DateTime<Utc>,
) -> Result<()> {
    let suggestion_json = serde_json::to_string(suggestion)?;

    let result = sqlx::query(
        r#"
        UPDATE catalog_items
        SET system_code = ?, assembly_code = ?, component_code = ?, safety_system = ?,
            last_suggestion = ?, last_confidence = ?, last_suggested_at = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&code.system)
    .bind(&code.assembly)
    .bind(&code.component)
    .bind(safety_system.as_str())
    .bind(suggestion_json)
    .bind(suggestion.confidence)
    .bind(at.to_rfc3339())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Catalog item {}", id)));
    }
    Ok(())
}

fn row_to_item(row: &SqliteRow) -> Result<CatalogItem> {
    let id: String = row.get("id");
    let organization_id: String = row.get("organization_id");
    let system_code: Option<String> = row.get("system_code");
    let safety_system: Option<String> = row.get("safety_system");
    let last_suggestion: Option<String> = row.get("last_suggestion");
    let last_suggested_at: Option<String> = row.get("last_suggested_at");

    let id = parse_uuid(&id)?;

    // A stale cache from an older payload shape is dropped, not fatal
    let last_suggestion = last_suggestion.and_then(|json| {
        serde_json::from_str::<Suggestion>(&json)
            .map_err(|e| {
                tracing::warn!(item_id = %id, error = %e, "Ignoring unreadable suggestion cache");
            })
            .ok()
    });

    Ok(CatalogItem {
        id,
        organization_id: parse_uuid(&organization_id)?,
        name: row.get("name"),
        description: row.get("description"),
        code: system_code.map(|system| {
            TaxonomyCode::new(system, row.get("assembly_code"), row.get("component_code"))
        }),
        safety_system: safety_system.as_deref().and_then(SafetySystem::parse),
        last_suggestion,
        last_confidence: row.get("last_confidence"),
        last_suggested_at: last_suggested_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid UUID '{}': {}", value, e)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp '{}': {}", value, e)))
}
