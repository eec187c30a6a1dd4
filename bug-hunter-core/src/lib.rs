//! Core functionality for bug-hunter
//!
//! This crate contains the pattern learning and matching engine: the catalog of
//! known defect patterns, the matcher that scores them against diagnostics and
//! code, occurrence tracking, fix recommendation and persistence.

pub mod config;
pub mod learning;
pub mod logging;

pub use config::EngineConfig;
pub use learning::{
    BugPattern, DefectRecord, FixRecommendation, IssuePrediction, IssueType, LearningDocument,
    LearningStats, PatternLearningEngine, PatternMatch, PersistOutcome, Severity,
};
