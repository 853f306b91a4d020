//! Suggestion pipeline services
//!
//! Leaf-first: normalizer, matcher, scorer and ranker are pure; the
//! orchestrator, escalation adapter, feedback recorder and seeder sit on top
//! of the store traits in [`crate::db`].

pub mod ai_escalation;
pub mod classifier_client;
pub mod confidence_scorer;
pub mod dictionary_seeder;
pub mod feedback_recorder;
pub mod matcher;
pub mod normalizer;
pub mod ranker;
pub mod suggestion_orchestrator;

pub use ai_escalation::{EscalationAdapter, SuggestionTier};
pub use classifier_client::{
    ClassificationRequest, ClassifierError, ClassifierSettings, ClassifierVerdict, CodeOption,
    EscalationErrorKind, HttpTaxonomyClassifier, TaxonomyClassifier,
};
pub use confidence_scorer::ConfidenceScorer;
pub use dictionary_seeder::{DictionarySeeder, SeedReport};
pub use feedback_recorder::{DecisionContext, FeedbackRecorder, FindingDecision};
pub use matcher::{Candidate, CandidateSource, Matcher, RawMatch};
pub use normalizer::normalize;
pub use suggestion_orchestrator::{BatchSuggestions, ItemSuggestions, SuggestionEngine, TextSuggestions};
