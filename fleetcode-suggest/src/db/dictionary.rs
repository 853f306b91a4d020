//! Taxonomy dictionary database operations

use crate::db::catalog::parse_uuid;
use crate::types::{DictionaryEntry, DictionaryScope, Provenance, TaxonomyCode};
use fleetcode_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const ENTRY_COLUMNS: &str = "id, organization_id, system_code, assembly_code, component_code, \
    title, keywords, active, provenance";

/// Active entries of one organization, in insertion order
pub async fn load_organization_entries(
    pool: &SqlitePool,
    organization_id: Uuid,
) -> Result<Vec<DictionaryEntry>> {
    let query = format!(
        "SELECT {} FROM taxonomy_dictionary \
         WHERE organization_id = ? AND active = 1 ORDER BY rowid",
        ENTRY_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(organization_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_entry).collect()
}

/// Active global entries, in insertion order
pub async fn load_global_entries(pool: &SqlitePool) -> Result<Vec<DictionaryEntry>> {
    let query = format!(
        "SELECT {} FROM taxonomy_dictionary \
         WHERE organization_id IS NULL AND active = 1 ORDER BY rowid",
        ENTRY_COLUMNS
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    rows.iter().map(row_to_entry).collect()
}

/// True if an active system-level entry exists for (scope, system code)
pub async fn has_active_system_entry(
    pool: &SqlitePool,
    scope: DictionaryScope,
    system_code: &str,
) -> Result<bool> {
    // IS compares NULL to NULL, covering the global scope
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM taxonomy_dictionary
            WHERE organization_id IS ?
              AND system_code = ?
              AND assembly_code IS NULL
              AND component_code IS NULL
              AND active = 1
        )
        "#,
    )
    .bind(scope.organization_id().map(|id| id.to_string()))
    .bind(system_code)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert a dictionary entry
pub async fn save_entry(pool: &SqlitePool, entry: &DictionaryEntry) -> Result<()> {
    let keywords_json = serde_json::to_string(&entry.keywords)?;

    sqlx::query(
        r#"
        INSERT INTO taxonomy_dictionary (
            id, organization_id, system_code, assembly_code, component_code,
            title, keywords, active, provenance
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(entry.scope.organization_id().map(|id| id.to_string()))
    .bind(&entry.code.system)
    .bind(&entry.code.assembly)
    .bind(&entry.code.component)
    .bind(&entry.title)
    .bind(keywords_json)
    .bind(entry.active)
    .bind(entry.provenance.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Number of rows in a scope, active or not
pub async fn count_entries(pool: &SqlitePool, scope: DictionaryScope) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM taxonomy_dictionary WHERE organization_id IS ?",
    )
    .bind(scope.organization_id().map(|id| id.to_string()))
    .fetch_one(pool)
    .await?;

    Ok(count)
}

fn row_to_entry(row: &SqliteRow) -> Result<DictionaryEntry> {
    let id: String = row.get("id");
    let organization_id: Option<String> = row.get("organization_id");
    let keywords: String = row.get("keywords");
    let provenance: String = row.get("provenance");

    let scope = match organization_id {
        Some(org) => DictionaryScope::Organization(parse_uuid(&org)?),
        None => DictionaryScope::Global,
    };

    let provenance = Provenance::parse(&provenance)
        .ok_or_else(|| Error::Internal(format!("Unknown provenance '{}'", provenance)))?;

    Ok(DictionaryEntry {
        id: parse_uuid(&id)?,
        scope,
        code: TaxonomyCode::new(
            row.get::<String, _>("system_code"),
            row.get("assembly_code"),
            row.get("component_code"),
        ),
        title: row.get("title"),
        keywords: serde_json::from_str(&keywords)?,
        active: row.get("active"),
        provenance,
    })
}
