//! Static taxonomy data: system rules and safety-system categories

pub mod rules;
pub mod safety;

pub use rules::{RuleSet, TaxonomyRule};
pub use safety::SafetySystem;
