use serde::Serialize;

use super::catalog::PatternCatalog;
use super::tracker::OccurrenceTracker;

/// Summary of the learning state, meant for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_patterns: usize,
    pub project_specific_patterns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frequent_pattern: Option<String>,
    /// Learned patterns over the configured target, capped at 1.0
    pub learning_progress: f32,
    pub total_occurrences: u64,
    pub tracked_files: usize,
}

impl LearningStats {
    pub fn collect(
        catalog: &PatternCatalog,
        tracker: &OccurrenceTracker,
        learning_target: usize,
    ) -> Self {
        let learned = catalog.learned_count() as f32;
        let target = learning_target.max(1) as f32;

        Self {
            total_patterns: catalog.len(),
            project_specific_patterns: catalog.project_specific_patterns().len(),
            most_frequent_pattern: tracker.most_frequent_pattern(),
            learning_progress: (learned / target).min(1.0),
            total_occurrences: tracker.total_occurrences(),
            tracked_files: tracker.tracked_files(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::pattern::{BugPattern, Severity};

    #[test]
    fn test_empty_stats() {
        let stats = LearningStats::collect(&PatternCatalog::new(), &OccurrenceTracker::new(), 10);
        assert_eq!(stats.total_patterns, 0);
        assert_eq!(stats.most_frequent_pattern, None);
        assert_eq!(stats.learning_progress, 0.0);

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("mostFrequentPattern").is_none());
    }

    #[test]
    fn test_progress_is_bounded() {
        let mut catalog = PatternCatalog::with_predefined();
        let mut tracker = OccurrenceTracker::new();
        for i in 0..4 {
            let pattern = BugPattern::new(format!("L{i}"), "learned", Severity::Low);
            catalog.learn_pattern(pattern, i % 2 == 0);
        }
        tracker.record_occurrence("L1");
        tracker.record_occurrence("L3");
        tracker.record_occurrence("L3");

        let stats = LearningStats::collect(&catalog, &tracker, 8);
        assert_eq!(stats.learning_progress, 0.5);
        assert_eq!(stats.project_specific_patterns, 2);
        assert_eq!(stats.most_frequent_pattern.as_deref(), Some("L3"));
        assert_eq!(stats.total_occurrences, 3);

        let capped = LearningStats::collect(&catalog, &tracker, 2);
        assert_eq!(capped.learning_progress, 1.0);
    }
}
