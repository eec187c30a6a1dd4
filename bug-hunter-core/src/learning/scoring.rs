//! Confidence scoring for pattern hits
//!
//! Scoring is a pure function of the strategy, the compiled pattern and the
//! input text, so weights and combination rules can change without touching
//! the catalog or the matcher.

use serde::{Deserialize, Serialize};

use super::pattern::MatchSource;
use super::signature::{CompiledPattern, Hit, HitKind};

/// Base score of a single hit, by source and kind.
///
/// Signature weights sit above code weights: diagnostics name the defect,
/// code fragments only resemble it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub signature_literal: f32,
    pub signature_wildcard: f32,
    pub signature_partial: f32,
    pub code_literal: f32,
    pub code_wildcard: f32,
    pub code_partial: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            signature_literal: 0.7,
            signature_wildcard: 0.85,
            signature_partial: 0.45,
            code_literal: 0.55,
            code_wildcard: 0.65,
            code_partial: 0.3,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, hit: &Hit<'_, '_>) -> f32 {
        let weight = match (hit.source, hit.kind) {
            (MatchSource::Signature, HitKind::Literal) => self.signature_literal,
            (MatchSource::Signature, HitKind::Wildcard) => self.signature_wildcard,
            (MatchSource::Signature, HitKind::Partial) => self.signature_partial,
            (MatchSource::Code, HitKind::Literal) => self.code_literal,
            (MatchSource::Code, HitKind::Wildcard) => self.code_wildcard,
            (MatchSource::Code, HitKind::Partial) => self.code_partial,
        };
        if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) }
    }
}

/// How the hits of one pattern combine into a confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// `1 - Π(1 - w)`: every extra hit raises confidence, never past 1.0
    NoisyOr(ScoringWeights),
    /// Only the strongest hit counts
    BestHit(ScoringWeights),
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        ScoringStrategy::NoisyOr(ScoringWeights::default())
    }
}

impl ScoringStrategy {
    pub fn weights(&self) -> &ScoringWeights {
        match self {
            ScoringStrategy::NoisyOr(weights) | ScoringStrategy::BestHit(weights) => weights,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score<'p, 't> {
    pub confidence: f32,
    /// Strongest hit; the earliest one wins ties, so signatures beat code patterns
    pub best: Hit<'p, 't>,
}

pub fn score<'p, 't>(
    strategy: &ScoringStrategy,
    pattern: &'p CompiledPattern,
    text: &'t str,
) -> Option<Score<'p, 't>> {
    let weights = strategy.weights();
    let hits = pattern.hits(text);

    let mut best: Option<(f32, &Hit<'p, 't>)> = None;
    for hit in &hits {
        let weight = weights.weight(hit);
        if best.is_none_or(|(top, _)| weight > top) {
            best = Some((weight, hit));
        }
    }
    let (top, best) = best?;

    let confidence = match strategy {
        ScoringStrategy::NoisyOr(_) => {
            1.0 - hits.iter().map(|hit| 1.0 - weights.weight(hit)).product::<f32>()
        }
        ScoringStrategy::BestHit(_) => top,
    };

    Some(Score { confidence: confidence.clamp(0.0, 1.0), best: best.clone() })
}
