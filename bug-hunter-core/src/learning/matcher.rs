use std::cmp::Ordering;

use super::catalog::PatternCatalog;
use super::pattern::PatternMatch;
use super::scoring::{self, ScoringStrategy};
use crate::debug;

/// Scores every catalog pattern against a piece of text.
///
/// Matching never records anything; feeding results into the occurrence
/// tracker is the caller's decision.
#[derive(Debug, Clone, Copy)]
pub struct PatternMatcher<'a> {
    catalog: &'a PatternCatalog,
    strategy: &'a ScoringStrategy,
}

impl<'a> PatternMatcher<'a> {
    pub fn new(catalog: &'a PatternCatalog, strategy: &'a ScoringStrategy) -> Self {
        Self { catalog, strategy }
    }

    /// All matching patterns, strongest first. Ties go to the lower id, then to
    /// the common namespace.
    pub fn match_text(&self, text: &str) -> Vec<PatternMatch> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<PatternMatch> = self
            .catalog
            .entries()
            .filter_map(|stored| {
                scoring::score(self.strategy, &stored.compiled, text).map(|score| PatternMatch {
                    pattern: stored.pattern.clone(),
                    confidence: score.confidence,
                    signature: score.best.signature.to_string(),
                    matched: score.best.matched.to_string(),
                    source: score.best.source,
                })
            })
            .collect();

        matches.sort_by(rank);
        debug!("Matched {} patterns against {} bytes of input", matches.len(), text.len());
        matches
    }

    pub fn best_match(&self, text: &str) -> Option<PatternMatch> {
        self.match_text(text).into_iter().next()
    }
}

fn rank(a: &PatternMatch, b: &PatternMatch) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.pattern.id.cmp(&b.pattern.id))
        .then_with(|| a.pattern.project_specific.cmp(&b.pattern.project_specific))
}
