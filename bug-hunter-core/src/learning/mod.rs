//! Pattern learning and matching
//!
//! Known defect patterns live in a three-namespace catalog (built-in, common,
//! project-specific). The matcher scores them against diagnostics or code, the
//! tracker counts how often they fire, and the persistence layer moves the
//! learned part of that state in and out of a JSON document.

pub mod catalog;
pub mod defect;
pub mod engine;
pub mod matcher;
pub mod pattern;
pub mod persistence;
pub mod predefined;
pub mod recommender;
pub mod scoring;
pub mod signature;
pub mod stats;
pub mod tracker;

#[cfg(test)]
mod integration_tests;

use thiserror::Error;

pub use catalog::PatternCatalog;
pub use defect::DefectRecord;
pub use engine::PatternLearningEngine;
pub use matcher::PatternMatcher;
pub use pattern::{BugPattern, FixExample, MatchSource, PatternMatch, Severity};
pub use persistence::{ImportReport, LearningDocument, PatternEntry, PersistOutcome};
pub use recommender::{CodeLocation, FixRecommendation, IssuePrediction, IssueType};
pub use scoring::{ScoringStrategy, ScoringWeights};
pub use stats::LearningStats;
pub use tracker::{OccurrenceTracker, PatternStats};

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid learning document: {0}")]
    InvalidDocument(String),

    #[error("Incompatible learning document version: {found} (current: {current})")]
    IncompatibleVersion { found: String, current: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LearningError>;
