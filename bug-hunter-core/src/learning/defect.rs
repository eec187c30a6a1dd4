use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pattern::Severity;
use super::recommender::FixRecommendation;

/// A located defect, in the shape the report renderer consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DefectRecord {
    pub id: Uuid,
    pub file: String,
    pub line: usize,
    pub severity: Severity,
    /// Id of the pattern that identified the defect
    #[serde(rename = "type")]
    pub defect_type: String,
    pub description: String,
    pub code_snippet: String,
    pub fix_suggestion: String,
    pub fixed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_code: Option<String>,
}

impl DefectRecord {
    /// `None` when the recommendation carries no pattern.
    pub fn from_recommendation(
        file: &str,
        line: usize,
        code_snippet: &str,
        recommendation: FixRecommendation,
    ) -> Option<Self> {
        let pattern = recommendation.pattern?;
        let description =
            if pattern.description.is_empty() { pattern.name.clone() } else { pattern.description };

        Some(Self {
            id: Uuid::new_v4(),
            file: file.to_string(),
            line,
            severity: pattern.severity,
            defect_type: pattern.id,
            description,
            code_snippet: code_snippet.to_string(),
            fix_suggestion: recommendation.suggestion,
            fixed: false,
            fixed_code: pattern.example.map(|example| example.after),
        })
    }
}
