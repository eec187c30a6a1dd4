use std::fmt;

use serde::{Deserialize, Serialize};

/// A named, reusable description of a recurring defect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BugPattern {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    /// Matched case-insensitively against diagnostic text
    #[serde(default)]
    pub signatures: Vec<String>,
    /// Matched case-sensitively against source code
    #[serde(default)]
    pub code_patterns: Vec<String>,
    #[serde(default)]
    pub fix_strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<FixExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,
    #[serde(default)]
    pub project_specific: bool,
}

impl BugPattern {
    pub fn new(id: impl Into<String>, name: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            severity,
            signatures: Vec::new(),
            code_patterns: Vec::new(),
            fix_strategy: String::new(),
            example: None,
            prevention: None,
            project_specific: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signatures.push(signature.into());
        self
    }

    pub fn with_code_pattern(mut self, code_pattern: impl Into<String>) -> Self {
        self.code_patterns.push(code_pattern.into());
        self
    }

    pub fn with_fix_strategy(mut self, fix_strategy: impl Into<String>) -> Self {
        self.fix_strategy = fix_strategy.into();
        self
    }

    pub fn with_example(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.example = Some(FixExample { before: before.into(), after: after.into() });
        self
    }

    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixExample {
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which list of a pattern produced a hit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Signature,
    Code,
}

/// One pattern recognized in a piece of text.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub pattern: BugPattern,
    pub confidence: f32,
    /// The signature or code pattern that produced the strongest hit
    pub signature: String,
    /// The slice of the input that hit
    pub matched: String,
    pub source: MatchSource,
}
