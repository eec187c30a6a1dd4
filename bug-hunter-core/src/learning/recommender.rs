use std::collections::HashSet;
use std::fmt;

use regex_utils::code;
use serde::{Deserialize, Serialize};

use super::matcher::PatternMatcher;
use super::pattern::{BugPattern, PatternMatch};

/// Best fix for a piece of text; empty when nothing cleared the confidence floor.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FixRecommendation {
    pub pattern: Option<BugPattern>,
    pub confidence: f32,
    pub suggestion: String,
}

impl FixRecommendation {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    fn from_match(found: PatternMatch) -> Self {
        let suggestion = suggestion_for(&found.pattern);
        Self { confidence: found.confidence, pattern: Some(found.pattern), suggestion }
    }
}

fn suggestion_for(pattern: &BugPattern) -> String {
    match &pattern.example {
        Some(example) if !example.after.trim().is_empty() => {
            format!("{}\n\nExample fix:\n{}", pattern.fix_strategy, example.after)
        }
        _ => pattern.fix_strategy.clone(),
    }
}

pub struct FixRecommender<'a> {
    matcher: PatternMatcher<'a>,
    min_confidence: f32,
}

impl<'a> FixRecommender<'a> {
    pub fn new(matcher: PatternMatcher<'a>, min_confidence: f32) -> Self {
        Self { matcher, min_confidence }
    }

    pub fn recommend_fix(&self, text: &str) -> FixRecommendation {
        match self.matcher.best_match(text) {
            Some(found) if found.confidence >= self.min_confidence => {
                FixRecommendation::from_match(found)
            }
            _ => FixRecommendation::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    NullPointer,
    UnhandledRejection,
    InjectionRisk,
    XssRisk,
    HardcodedSecret,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::NullPointer => "null-pointer",
            IssueType::UnhandledRejection => "unhandled-rejection",
            IssueType::InjectionRisk => "injection-risk",
            IssueType::XssRisk => "xss-risk",
            IssueType::HardcodedSecret => "hardcoded-secret",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based position in the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePrediction {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<CodeLocation>,
    pub message: String,
}

impl IssuePrediction {
    fn at(issue_type: IssueType, line: usize, column: usize, message: String) -> Self {
        Self { issue_type, location: Some(CodeLocation { line, column }), message }
    }
}

/// Flag likely issue categories in raw code before any error is seen.
///
/// Purely textual, so false positives are expected.
pub fn predict_issues(code_context: &str) -> Vec<IssuePrediction> {
    let mut predictions = Vec::new();
    predict_null_dereferences(code_context, &mut predictions);
    predict_unhandled_rejections(code_context, &mut predictions);
    predict_line_sinks(code_context, &mut predictions);
    predictions.sort_by_key(|p| p.location.map(|l| (l.line, l.column)));
    predictions
}

fn predict_null_dereferences(source: &str, predictions: &mut Vec<IssuePrediction>) {
    let mut reported = HashSet::new();

    for (index, line) in source.lines().enumerate() {
        for caps in code::PROPERTY_CHAIN.captures_iter(line) {
            let Some(root) = caps.get(1) else { continue };
            let name = root.as_str();
            if code::KNOWN_ROOTS.contains(&name) || reported.contains(name) {
                continue;
            }
            if code::has_null_guard(source, name) {
                continue;
            }
            reported.insert(name.to_string());
            predictions.push(IssuePrediction::at(
                IssueType::NullPointer,
                index + 1,
                column(line, root.start()),
                format!("`{name}` is dereferenced without a null/undefined check"),
            ));
        }
    }
}

fn predict_unhandled_rejections(source: &str, predictions: &mut Vec<IssuePrediction>) {
    let mut guarded_depths: Vec<i64> = Vec::new();
    let mut depth: i64 = 0;

    for (index, line) in source.lines().enumerate() {
        let opens_try = code::TRY_BLOCK.is_match(line);
        let guarded = !guarded_depths.is_empty() || opens_try;

        if !guarded && !code::CATCH_HANDLER.is_match(line) {
            if let Some(call) = code::AWAIT_OR_THEN.find(line) {
                if !then_chain_caught(source, index) {
                    predictions.push(IssuePrediction::at(
                        IssueType::UnhandledRejection,
                        index + 1,
                        column(line, call.start()),
                        "Async call has no surrounding try/catch or .catch() handler".to_string(),
                    ));
                }
            }
        }

        for ch in line.chars() {
            match ch {
                '{' => {
                    if opens_try && guarded_depths.last() != Some(&depth) {
                        guarded_depths.push(depth);
                    }
                    depth += 1;
                }
                '}' => {
                    depth -= 1;
                    if guarded_depths.last() == Some(&depth) {
                        guarded_depths.pop();
                    }
                }
                _ => {}
            }
        }
    }
}

/// 1-based character column of a byte offset within `line`.
fn column(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}

/// A `.then(` whose chain continues onto a `.catch(` within the next few lines.
fn then_chain_caught(source: &str, line_index: usize) -> bool {
    source
        .lines()
        .skip(line_index + 1)
        .take(3)
        .take_while(|line| line.trim_start().starts_with('.'))
        .any(|line| code::CATCH_HANDLER.is_match(line))
}

fn predict_line_sinks(source: &str, predictions: &mut Vec<IssuePrediction>) {
    let sinks: [(&regex::Regex, IssueType, &str); 4] = [
        (&*code::SQL_CONCAT, IssueType::InjectionRisk, "SQL built from concatenated input"),
        (&*code::DYNAMIC_EVAL, IssueType::InjectionRisk, "Dynamic code built from input"),
        (&*code::HTML_SINK, IssueType::XssRisk, "Raw HTML written to the DOM"),
        (&*code::SECRET_ASSIGNMENT, IssueType::HardcodedSecret, "Credential literal in source"),
    ];

    for (index, line) in source.lines().enumerate() {
        for (regex, issue_type, message) in &sinks {
            if let Some(found) = regex.find(line) {
                predictions.push(IssuePrediction::at(
                    issue_type.clone(),
                    index + 1,
                    column(line, found.start()),
                    message.to_string(),
                ));
            }
        }
    }
}
