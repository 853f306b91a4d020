//! fleetcode-suggest - taxonomy code suggestion operator tool
//!
//! Seeds the dictionary and runs suggestions against the local SQLite
//! database, printing results as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetcode_common::config::{database_path, RootFolderResolver, TomlConfig};
use fleetcode_suggest::db::{parameters, SqliteRepository};
use fleetcode_suggest::types::DictionaryScope;
use fleetcode_suggest::{DictionarySeeder, RuleSet, SuggestionEngine};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "fleetcode-suggest", version, about = "Maintenance taxonomy code suggestions")]
struct Cli {
    /// Root folder holding fleetcode.db
    #[arg(long, global = true)]
    root_folder: Option<String>,

    /// TOML config file (defaults to ~/.config/fleetcode/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the dictionary from the built-in rules
    Seed {
        /// Organization scope; global when omitted
        #[arg(long)]
        org: Option<Uuid>,
    },
    /// Suggest codes for one catalog item and cache the top pick
    SuggestItem { item_id: Uuid },
    /// Suggest codes for uncoded catalog items of an organization
    SuggestBatch {
        #[arg(long)]
        org: Uuid,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Suggest codes for free text such as an inspection finding
    SuggestText {
        #[arg(long)]
        org: Uuid,
        text: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml_config = TomlConfig::load_or_default(cli.config.as_deref());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&toml_config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting fleetcode-suggest v{} ({} {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );

    let root_folder = RootFolderResolver::new(cli.root_folder.as_deref(), &toml_config)
        .resolve_and_create()
        .context("Failed to initialize root folder")?;
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = fleetcode_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;
    let repository = Arc::new(SqliteRepository::new(pool.clone()));
    let rules = RuleSet::builtin();

    match cli.command {
        Command::Seed { org } => {
            let scope = org.map_or(DictionaryScope::Global, DictionaryScope::Organization);
            let report = DictionarySeeder::new(repository, rules).seed(scope).await?;
            print_json(&report)?;
        }
        Command::SuggestItem { item_id } => {
            let engine = build_engine(&pool, repository, rules, &toml_config).await?;
            print_json(&engine.suggest_for_item(item_id).await?)?;
        }
        Command::SuggestBatch { org, limit } => {
            let engine = build_engine(&pool, repository, rules, &toml_config).await?;
            print_json(&engine.suggest_batch(org, limit).await?)?;
        }
        Command::SuggestText { org, text, notes } => {
            let engine = build_engine(&pool, repository, rules, &toml_config).await?;
            print_json(&engine.suggest_for_text(org, &text, notes.as_deref()).await?)?;
        }
    }

    Ok(())
}

/// Engine with parameters from the settings table and the optional classifier
async fn build_engine(
    pool: &SqlitePool,
    repository: Arc<SqliteRepository>,
    rules: &'static RuleSet,
    toml_config: &TomlConfig,
) -> Result<SuggestionEngine> {
    let params = parameters::load_engine_parameters(pool).await?;
    let mut engine = SuggestionEngine::new(repository.clone(), repository, rules, params);

    if let Some(classifier) = fleetcode_suggest::config::build_classifier(pool, toml_config).await? {
        engine = engine.with_classifier(classifier);
    }
    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
