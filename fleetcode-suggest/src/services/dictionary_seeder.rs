//! Dictionary Seeder
//!
//! Bootstraps a dictionary scope with one system-level entry per built-in
//! rule. Rules that already have an active system-level entry in the scope are
//! skipped, so re-running inserts nothing.

use crate::db::DictionaryStore;
use crate::error::SuggestResult;
use crate::taxonomy::RuleSet;
use crate::types::{DictionaryEntry, DictionaryScope, Provenance, TaxonomyCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

pub struct DictionarySeeder {
    dictionary: Arc<dyn DictionaryStore>,
    rules: &'static RuleSet,
}

impl DictionarySeeder {
    pub fn new(dictionary: Arc<dyn DictionaryStore>, rules: &'static RuleSet) -> Self {
        Self { dictionary, rules }
    }

    pub async fn seed(&self, scope: DictionaryScope) -> SuggestResult<SeedReport> {
        let mut report = SeedReport {
            inserted: 0,
            skipped: 0,
        };

        for rule in self.rules.iter() {
            if self
                .dictionary
                .has_active_system_entry(scope, rule.system_code)
                .await?
            {
                debug!(scope = %scope, system_code = rule.system_code, "Seed entry exists");
                report.skipped += 1;
                continue;
            }

            let entry = DictionaryEntry::new(
                scope,
                TaxonomyCode::system(rule.system_code),
                rule.title,
                rule.keywords.iter().map(|k| k.to_string()).collect(),
                Provenance::Seed,
            );
            self.dictionary.insert_entry(&entry).await?;
            report.inserted += 1;
        }

        info!(
            scope = %scope,
            inserted = report.inserted,
            skipped = report.skipped,
            "Dictionary seeding complete"
        );

        Ok(report)
    }
}
