//! The pattern learning engine
//!
//! Owns the catalog, the occurrence tracker and the configuration, and is the
//! single entry point for callers. Everything but file persistence is
//! synchronous.

use std::path::Path;

use serde_json::Value;

use super::Result;
use super::catalog::PatternCatalog;
use super::defect::DefectRecord;
use super::matcher::PatternMatcher;
use super::pattern::{BugPattern, PatternMatch};
use super::persistence::{self, ImportReport, LearningDocument, LearningSection, PersistOutcome};
use super::recommender::{self, FixRecommendation, FixRecommender, IssuePrediction};
use super::stats::LearningStats;
use super::tracker::{OccurrenceTracker, PatternStats};
use crate::config::EngineConfig;
use crate::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct PatternLearningEngine {
    config: EngineConfig,
    catalog: PatternCatalog,
    tracker: OccurrenceTracker,
}

impl Default for PatternLearningEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PatternLearningEngine {
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self::empty(config);
        if engine.config.load_predefined {
            engine.catalog.load_predefined_patterns();
        }
        engine
    }

    /// An engine without the built-in patterns, regardless of configuration.
    pub fn empty(config: EngineConfig) -> Self {
        Self { config, catalog: PatternCatalog::new(), tracker: OccurrenceTracker::new() }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &OccurrenceTracker {
        &self.tracker
    }

    // Catalog

    pub fn load_predefined_patterns(&mut self) -> Vec<&BugPattern> {
        self.catalog.load_predefined_patterns()
    }

    /// Returns `true` when a pattern with the same id was replaced.
    pub fn learn_pattern(&mut self, pattern: BugPattern, project_specific: bool) -> bool {
        self.catalog.learn_pattern(pattern, project_specific)
    }

    pub fn all_patterns(&self) -> Vec<&BugPattern> {
        self.catalog.all_patterns()
    }

    pub fn project_specific_patterns(&self) -> Vec<&BugPattern> {
        self.catalog.project_specific_patterns()
    }

    pub fn get_pattern(&self, id: &str) -> Option<&BugPattern> {
        self.catalog.get_pattern(id)
    }

    pub fn search_patterns(&self, query: &str) -> Vec<&BugPattern> {
        self.catalog.search_patterns(query)
    }

    // Matching

    fn matcher(&self) -> PatternMatcher<'_> {
        PatternMatcher::new(&self.catalog, &self.config.scoring)
    }

    pub fn match_pattern(&self, text: &str) -> Vec<PatternMatch> {
        self.matcher().match_text(text)
    }

    pub fn recommend_fix(&self, text: &str) -> FixRecommendation {
        FixRecommender::new(self.matcher(), self.config.min_confidence).recommend_fix(text)
    }

    pub fn predict_issues(&self, code_context: &str) -> Vec<IssuePrediction> {
        recommender::predict_issues(code_context)
    }

    // Occurrences

    pub fn record_occurrence(&mut self, pattern_id: &str) -> u64 {
        self.tracker.record_occurrence(pattern_id)
    }

    pub fn pattern_stats(&self, pattern_id: &str) -> PatternStats {
        self.tracker.pattern_stats(pattern_id)
    }

    pub fn frequent_patterns(&self, threshold: u64) -> Vec<String> {
        self.tracker.frequent_patterns(threshold)
    }

    pub fn record_file_issue(&mut self, file_path: &str, pattern_id: &str) {
        self.tracker.record_file_issue(file_path, pattern_id);
    }

    pub fn problematic_files(&self) -> Vec<String> {
        self.tracker.problematic_files()
    }

    pub fn learning_stats(&self) -> LearningStats {
        LearningStats::collect(&self.catalog, &self.tracker, self.config.learning_target)
    }

    // Defects

    /// Identify the defect in `code_snippet` and describe it for reporting.
    ///
    /// Returns `None` when no pattern clears the confidence floor.
    pub fn diagnose(&self, file: &str, line: usize, code_snippet: &str) -> Option<DefectRecord> {
        let record = DefectRecord::from_recommendation(
            file,
            line,
            code_snippet,
            self.recommend_fix(code_snippet),
        );
        if record.is_none() {
            debug!("No known pattern for {}:{}", file, line);
        }
        record
    }

    pub fn record_defect(&mut self, record: &DefectRecord) {
        self.tracker.record_occurrence(&record.defect_type);
        self.tracker.record_file_issue(&record.file, &record.defect_type);
    }

    // Import / export

    /// Learned patterns and tracker state. Built-in patterns are not exported.
    pub fn export_patterns(&self) -> LearningDocument {
        LearningDocument {
            patterns: self.catalog.export_sections(),
            learning: Some(LearningSection {
                occurrences: self.tracker.occurrences().clone(),
                file_issues: self.tracker.all_file_issues().clone(),
            }),
            ..Default::default()
        }
    }

    pub fn import_patterns(&mut self, document: LearningDocument) -> ImportReport {
        if let Err(e) = persistence::validate_version(&document.version) {
            warn!("{}; importing anyway", e);
        }

        let (common, project_specific) = self.catalog.import_sections(document.patterns);
        let mut report = ImportReport { common, project_specific, ..Default::default() };

        if let Some(learning) = document.learning {
            report.occurrences = learning.occurrences.len();
            report.file_issues = learning.file_issues.len();
            self.tracker.seed(learning.occurrences, learning.file_issues);
        }

        info!(
            "Imported {} common and {} project-specific patterns",
            report.common, report.project_specific
        );
        report
    }

    /// Import from arbitrary JSON, repairing or skipping malformed entries.
    pub fn import_value(&mut self, value: &Value) -> Result<ImportReport> {
        let (document, skipped) = LearningDocument::from_value(value)?;
        let mut report = self.import_patterns(document);
        report.skipped = skipped;
        Ok(report)
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> PersistOutcome {
        let path = path.as_ref();
        match persistence::write_document(path, &self.export_patterns()).await {
            Ok(()) => {
                info!("Saved learned patterns to {}", path.display());
                PersistOutcome::ok(path)
            }
            Err(e) => {
                warn!("Failed to save learned patterns to {}: {}", path.display(), e);
                PersistOutcome::failed(path, e)
            }
        }
    }

    /// Nothing is changed unless the whole file reads and parses.
    pub async fn load_from_file(&mut self, path: impl AsRef<Path>) -> PersistOutcome {
        let path = path.as_ref();
        match persistence::read_document(path).await {
            Ok((document, skipped)) => {
                let report = self.import_patterns(document);
                if skipped > 0 {
                    warn!("Skipped {} malformed entries in {}", skipped, path.display());
                }
                info!(
                    "Loaded {} patterns from {}",
                    report.common + report.project_specific,
                    path.display()
                );
                PersistOutcome::ok(path)
            }
            Err(e) => {
                warn!("Failed to load learned patterns from {}: {}", path.display(), e);
                PersistOutcome::failed(path, e)
            }
        }
    }

    pub async fn save(&self) -> PersistOutcome {
        let path = self.config.export_path.clone();
        self.save_to_file(path).await
    }

    pub async fn load(&mut self) -> PersistOutcome {
        let path = self.config.export_path.clone();
        self.load_from_file(path).await
    }
}
