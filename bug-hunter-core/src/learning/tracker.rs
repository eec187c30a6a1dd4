use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::debug;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternStats {
    pub occurrences: u64,
}

/// Counts how often patterns fire and in which files.
///
/// Ids are not checked against the catalog, so counts for patterns that were
/// never learned (or were dropped since) are kept as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceTracker {
    occurrences: BTreeMap<String, u64>,
    file_issues: BTreeMap<String, Vec<String>>,
}

impl OccurrenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_occurrence(&mut self, pattern_id: &str) -> u64 {
        let count = self.occurrences.entry(pattern_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        debug!("Pattern {} seen {} times", pattern_id, count);
        *count
    }

    pub fn pattern_stats(&self, pattern_id: &str) -> PatternStats {
        PatternStats { occurrences: self.occurrences.get(pattern_id).copied().unwrap_or(0) }
    }

    /// Ids seen at least `threshold` times, most frequent first.
    pub fn frequent_patterns(&self, threshold: u64) -> Vec<String> {
        let mut frequent: Vec<(&String, u64)> = self
            .occurrences
            .iter()
            .filter(|(_, count)| **count >= threshold)
            .map(|(id, count)| (id, *count))
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        frequent.into_iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn most_frequent_pattern(&self) -> Option<String> {
        self.frequent_patterns(1).into_iter().next()
    }

    pub fn record_file_issue(&mut self, file_path: &str, pattern_id: &str) {
        self.file_issues.entry(file_path.to_string()).or_default().push(pattern_id.to_string());
        debug!("Recorded {} in {}", pattern_id, file_path);
    }

    pub fn file_issues(&self, file_path: &str) -> &[String] {
        self.file_issues.get(file_path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files with at least one recorded issue, busiest first.
    pub fn problematic_files(&self) -> Vec<String> {
        let mut files: Vec<(&String, usize)> = self
            .file_issues
            .iter()
            .filter(|(_, issues)| !issues.is_empty())
            .map(|(path, issues)| (path, issues.len()))
            .collect();
        files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        files.into_iter().map(|(path, _)| path.clone()).collect()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.occurrences.values().fold(0u64, |total, count| total.saturating_add(*count))
    }

    pub fn tracked_files(&self) -> usize {
        self.file_issues.len()
    }

    pub fn occurrences(&self) -> &BTreeMap<String, u64> {
        &self.occurrences
    }

    pub fn all_file_issues(&self) -> &BTreeMap<String, Vec<String>> {
        &self.file_issues
    }

    /// Overwrite the counters and file lists named in an imported document.
    /// Entries the document does not mention are left alone.
    pub fn seed(
        &mut self,
        occurrences: BTreeMap<String, u64>,
        file_issues: BTreeMap<String, Vec<String>>,
    ) {
        self.occurrences.extend(occurrences);
        self.file_issues.extend(file_issues);
    }
}
