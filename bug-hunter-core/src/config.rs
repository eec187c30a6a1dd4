//! Engine configuration, loaded from TOML

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::learning::scoring::ScoringStrategy;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of learned patterns at which `learning_progress` reads 1.0
    pub learning_target: usize,
    /// Confidence floor below which `recommend_fix` returns nothing
    pub min_confidence: f32,
    pub scoring: ScoringStrategy,
    /// Where `save`/`load` keep the learning document
    pub export_path: PathBuf,
    pub load_predefined: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learning_target: 50,
            min_confidence: 0.3,
            scoring: ScoringStrategy::default(),
            export_path: PathBuf::from(".bug-hunter/patterns.json"),
            load_predefined: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("Invalid engine configuration")?;
        Ok(config.sanitized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    fn sanitized(mut self) -> Self {
        self.learning_target = self.learning_target.max(1);
        self.min_confidence = if self.min_confidence.is_nan() {
            Self::default().min_confidence
        } else {
            self.min_confidence.clamp(0.0, 1.0)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::scoring::ScoringWeights;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.learning_target, 50);
        assert!(config.load_predefined);
        assert_eq!(config.scoring, ScoringStrategy::NoisyOr(ScoringWeights::default()));
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            learning_target = 0
            min_confidence = 1.5

            [scoring]
            kind = "best_hit"
            signature_literal = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.learning_target, 1);
        assert_eq!(config.min_confidence, 1.0);
        assert_eq!(config.export_path, PathBuf::from(".bug-hunter/patterns.json"));
        match config.scoring {
            ScoringStrategy::BestHit(weights) => {
                assert_eq!(weights.signature_literal, 0.6);
                assert_eq!(weights.code_literal, ScoringWeights::default().code_literal);
            }
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn test_config_nan_confidence_uses_default() {
        let config = EngineConfig::from_toml_str("min_confidence = nan").unwrap();
        assert_eq!(config.min_confidence, EngineConfig::default().min_confidence);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/bug-hunter.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
