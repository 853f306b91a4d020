//! Feedback log database operations
//!
//! Rows are only ever inserted; there is no update or delete path.

use crate::db::catalog::{parse_timestamp, parse_uuid};
use crate::types::{FeedbackRecord, TaxonomyCode};
use fleetcode_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Append one feedback record
pub async fn save_feedback(pool: &SqlitePool, record: &FeedbackRecord) -> Result<()> {
    let final_code = record.final_code.as_ref();

    sqlx::query(
        r#"
        INSERT INTO taxonomy_feedback (
            id, organization_id, catalog_item_id, source_text,
            suggested_system_code, suggested_assembly_code, suggested_component_code,
            suggested_confidence, accepted,
            final_system_code, final_assembly_code, final_component_code,
            user_id, notes, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.organization_id.to_string())
    .bind(record.catalog_item_id.map(|id| id.to_string()))
    .bind(&record.source_text)
    .bind(&record.suggested_code.system)
    .bind(&record.suggested_code.assembly)
    .bind(&record.suggested_code.component)
    .bind(record.suggested_confidence)
    .bind(record.accepted)
    .bind(final_code.map(|c| c.system.clone()))
    .bind(final_code.and_then(|c| c.assembly.clone()))
    .bind(final_code.and_then(|c| c.component.clone()))
    .bind(&record.user_id)
    .bind(&record.notes)
    .bind(record.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Feedback for one catalog item, oldest first
pub async fn load_feedback_for_item(pool: &SqlitePool, item_id: Uuid) -> Result<Vec<FeedbackRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM taxonomy_feedback
        WHERE catalog_item_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(item_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

/// Feedback for an organization, oldest first
pub async fn load_feedback_for_organization(
    pool: &SqlitePool,
    organization_id: Uuid,
) -> Result<Vec<FeedbackRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM taxonomy_feedback
        WHERE organization_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(organization_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}

fn row_to_record(row: &SqliteRow) -> Result<FeedbackRecord> {
    let id: String = row.get("id");
    let organization_id: String = row.get("organization_id");
    let catalog_item_id: Option<String> = row.get("catalog_item_id");
    let final_system_code: Option<String> = row.get("final_system_code");
    let created_at: String = row.get("created_at");

    Ok(FeedbackRecord {
        id: parse_uuid(&id)?,
        organization_id: parse_uuid(&organization_id)?,
        catalog_item_id: catalog_item_id.as_deref().map(parse_uuid).transpose()?,
        source_text: row.get("source_text"),
        suggested_code: TaxonomyCode::new(
            row.get::<String, _>("suggested_system_code"),
            row.get("suggested_assembly_code"),
            row.get("suggested_component_code"),
        ),
        suggested_confidence: row.get("suggested_confidence"),
        accepted: row.get("accepted"),
        final_code: final_system_code.map(|system| {
            TaxonomyCode::new(
                system,
                row.get("final_assembly_code"),
                row.get("final_component_code"),
            )
        }),
        user_id: row.get("user_id"),
        notes: row.get("notes"),
        created_at: parse_timestamp(&created_at)?,
    })
}
