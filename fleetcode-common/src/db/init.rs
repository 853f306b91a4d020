//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings the schema up to date.
//! Every step is idempotent, so this runs on each startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout used until the `db_busy_timeout_ms` setting can be read
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
///
/// Foreign keys, WAL and the busy timeout are connection options, so every
/// pooled connection carries them. The schema is brought up on a single
/// bootstrap connection, then the pool is opened with the configured timeout.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));

    let bootstrap = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&bootstrap).await?;

    let timeout_ms: i64 = sqlx::query_scalar(
        "SELECT CAST(value AS INTEGER) FROM settings WHERE key = 'db_busy_timeout_ms'",
    )
    .fetch_optional(&bootstrap)
    .await?
    .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS as i64);
    bootstrap.close().await;

    let timeout_ms = u64::try_from(timeout_ms).unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect_with(options.busy_timeout(Duration::from_millis(timeout_ms)))
        .await?;

    info!("Database busy timeout set to {} ms", timeout_ms);

    Ok(pool)
}

/// Create tables, run migrations and seed default settings on an open pool
///
/// Split out from [`init_database`] so tests can run it against `sqlite::memory:`.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    // Memory pools in tests skip init_database's connect options
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;
    create_catalog_items_table(pool).await?;
    create_taxonomy_dictionary_table(pool).await?;
    create_taxonomy_feedback_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    init_default_settings(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores engine parameters and credentials as key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Catalog items (stocked parts) with assigned codes and the suggestion cache
pub async fn create_catalog_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_items (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            system_code TEXT,
            assembly_code TEXT,
            component_code TEXT,
            safety_system TEXT,
            last_suggestion TEXT,
            last_confidence REAL,
            last_suggested_at TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Keyword-to-code dictionary; NULL organization_id marks a global entry
pub async fn create_taxonomy_dictionary_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taxonomy_dictionary (
            id TEXT PRIMARY KEY,
            organization_id TEXT,
            system_code TEXT NOT NULL,
            assembly_code TEXT,
            component_code TEXT,
            title TEXT NOT NULL,
            keywords TEXT NOT NULL DEFAULT '[]',
            active INTEGER NOT NULL DEFAULT 1,
            provenance TEXT NOT NULL DEFAULT 'user',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only accept/reject log
pub async fn create_taxonomy_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS taxonomy_feedback (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            catalog_item_id TEXT REFERENCES catalog_items(id),
            source_text TEXT,
            suggested_system_code TEXT NOT NULL,
            suggested_assembly_code TEXT,
            suggested_component_code TEXT,
            suggested_confidence REAL NOT NULL,
            accepted INTEGER NOT NULL,
            final_system_code TEXT,
            final_assembly_code TEXT,
            final_component_code TEXT,
            user_id TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Ensure every engine setting exists, resetting NULL values to defaults
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "suggest_item_limit", "3").await?;
    ensure_setting(pool, "suggest_text_limit", "5").await?;
    ensure_setting(pool, "suggest_high_confidence_threshold", "0.9").await?;
    ensure_setting(pool, "suggest_confirmation_threshold", "0.8").await?;
    ensure_setting(pool, "suggest_escalation_threshold", "0.85").await?;
    ensure_setting(pool, "suggest_dictionary_base_confidence", "0.75").await?;
    ensure_setting(pool, "suggest_ai_escalation_enabled", "true").await?;
    ensure_setting(pool, "db_busy_timeout_ms", "5000").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with a default value
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // OR IGNORE: two processes may initialize the same file concurrently
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        tracing::warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}
