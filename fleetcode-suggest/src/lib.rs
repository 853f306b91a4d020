//! fleetcode-suggest library interface
//!
//! Maintenance taxonomy code suggestion engine. Exposes the pipeline services,
//! store traits and their SQLite implementation for the operator binary and
//! integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod taxonomy;
pub mod types;

pub use crate::error::{SuggestError, SuggestResult};
pub use crate::services::{
    DictionarySeeder, FeedbackRecorder, SuggestionEngine, SuggestionTier,
};
pub use crate::taxonomy::RuleSet;
