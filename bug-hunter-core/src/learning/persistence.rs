//! Learning document format and durable storage
//!
//! Documents are parsed leniently: a malformed pattern entry is repaired from
//! whatever fields are usable or skipped, and the rest of the document still
//! imports. Nothing is applied to the engine until the whole document is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::pattern::{BugPattern, FixExample, Severity};
use super::{LearningError, Result};
use crate::{debug, warn};

pub const DOCUMENT_VERSION: &str = "1.0.0";

/// A learned pattern as written to a document, with the time it was learned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternEntry {
    #[serde(flatten)]
    pub pattern: BugPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternSections {
    #[serde(default)]
    pub common: BTreeMap<String, PatternEntry>,
    #[serde(default)]
    pub project_specific: BTreeMap<String, PatternEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningSection {
    #[serde(default)]
    pub occurrences: BTreeMap<String, u64>,
    #[serde(default)]
    pub file_issues: BTreeMap<String, Vec<String>>,
}

/// The persisted learning state: learned patterns plus occurrence counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningDocument {
    pub version: String,
    #[serde(default)]
    pub patterns: PatternSections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<LearningSection>,
}

impl Default for LearningDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            patterns: PatternSections::default(),
            learning: None,
        }
    }
}

impl LearningDocument {
    /// Build a document from arbitrary JSON, tolerating partial or malformed entries.
    ///
    /// Returns the document and the number of entries that had to be dropped.
    pub fn from_value(value: &Value) -> Result<(Self, usize)> {
        let root = value.as_object().ok_or_else(|| {
            LearningError::InvalidDocument("top level is not a JSON object".to_string())
        })?;

        let mut skipped = 0;
        let mut document = LearningDocument {
            version: root
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or(DOCUMENT_VERSION)
                .to_string(),
            ..Default::default()
        };

        if let Some(patterns) = root.get("patterns").and_then(Value::as_object) {
            document.patterns.common =
                parse_pattern_section(patterns.get("common"), "common", &mut skipped);
            document.patterns.project_specific = parse_pattern_section(
                patterns.get("projectSpecific"),
                "projectSpecific",
                &mut skipped,
            );
        }

        if let Some(learning) = root.get("learning").and_then(Value::as_object) {
            document.learning = Some(parse_learning_section(learning, &mut skipped));
        }

        Ok((document, skipped))
    }

    pub fn from_json_str(json: &str) -> Result<(Self, usize)> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_pattern_section(
    section: Option<&Value>,
    name: &str,
    skipped: &mut usize,
) -> BTreeMap<String, PatternEntry> {
    let Some(entries) = section.and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    let mut patterns = BTreeMap::new();
    for (id, entry) in entries {
        match entry_from_value(id, entry) {
            Ok(entry) => {
                patterns.insert(id.clone(), entry);
            }
            Err(e) => {
                warn!("Skipping {} pattern {}: {}", name, id, e);
                *skipped += 1;
            }
        }
    }
    patterns
}

/// Decode one pattern entry. The map key is its id and the fallback name.
fn entry_from_value(id: &str, entry: &Value) -> Result<PatternEntry> {
    let fields = entry.as_object().ok_or_else(|| {
        LearningError::InvalidPattern(format!("entry for {id} is not an object"))
    })?;

    let mut keyed = fields.clone();
    keyed.insert("id".to_string(), Value::String(id.to_string()));
    let mut pattern = match serde_json::from_value::<BugPattern>(Value::Object(keyed)) {
        Ok(pattern) => pattern,
        Err(e) => {
            debug!("Repairing pattern {}: {}", id, e);
            salvage_pattern(id, fields)
        }
    };
    if pattern.name.trim().is_empty() {
        pattern.name = id.to_string();
    }

    let learned_at = fields
        .get("learnedAt")
        .and_then(Value::as_str)
        .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
        .map(|at| at.with_timezone(&Utc));

    Ok(PatternEntry { pattern, learned_at })
}

/// Field-by-field fallback for entries whose fields have the wrong shapes.
fn salvage_pattern(id: &str, fields: &serde_json::Map<String, Value>) -> BugPattern {
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    let list = |key: &str| match fields.get(key) {
        Some(Value::Array(items)) => {
            items.iter().filter_map(Value::as_str).map(str::to_string).collect()
        }
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    };

    BugPattern {
        id: id.to_string(),
        name: text("name").unwrap_or_default(),
        description: text("description").unwrap_or_default(),
        severity: text("severity").and_then(|s| parse_severity(&s)).unwrap_or_default(),
        signatures: list("signatures"),
        code_patterns: list("codePatterns"),
        fix_strategy: text("fixStrategy").unwrap_or_default(),
        example: fields.get("example").and_then(Value::as_object).map(|example| FixExample {
            before: example.get("before").and_then(Value::as_str).unwrap_or_default().to_string(),
            after: example.get("after").and_then(Value::as_str).unwrap_or_default().to_string(),
        }),
        prevention: text("prevention"),
        project_specific: fields.get("projectSpecific").and_then(Value::as_bool).unwrap_or(false),
    }
}

fn parse_severity(raw: &str) -> Option<Severity> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Some(Severity::Low),
        "medium" => Some(Severity::Medium),
        "high" => Some(Severity::High),
        "critical" => Some(Severity::Critical),
        _ => None,
    }
}

fn parse_learning_section(
    learning: &serde_json::Map<String, Value>,
    skipped: &mut usize,
) -> LearningSection {
    let mut section = LearningSection::default();

    if let Some(occurrences) = learning.get("occurrences").and_then(Value::as_object) {
        for (id, count) in occurrences {
            match count.as_u64() {
                Some(count) => {
                    section.occurrences.insert(id.clone(), count);
                }
                None => {
                    warn!("Skipping occurrence count for {}: {} is not a count", id, count);
                    *skipped += 1;
                }
            }
        }
    }

    if let Some(file_issues) = learning.get("fileIssues").and_then(Value::as_object) {
        for (path, ids) in file_issues {
            match ids.as_array() {
                Some(ids) => {
                    let ids = ids.iter().filter_map(Value::as_str).map(str::to_string).collect();
                    section.file_issues.insert(path.clone(), ids);
                }
                None => {
                    warn!("Skipping file issues for {}: not a list", path);
                    *skipped += 1;
                }
            }
        }
    }

    section
}

/// Documents from another major version are still imported, but flagged.
pub fn validate_version(version: &str) -> Result<()> {
    let major = |v: &str| v.trim().trim_start_matches('v').split('.').next().map(str::to_string);
    match (major(DOCUMENT_VERSION), major(version)) {
        (Some(current), Some(found)) if current != found && found.parse::<u64>().is_ok() => {
            Err(LearningError::IncompatibleVersion {
                found: version.to_string(),
                current: DOCUMENT_VERSION.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub common: usize,
    pub project_specific: usize,
    pub skipped: usize,
    pub occurrences: usize,
    pub file_issues: usize,
}

/// Result envelope for file operations; failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistOutcome {
    pub success: bool,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PersistOutcome {
    pub fn ok(file_path: &Path) -> Self {
        Self { success: true, file_path: file_path.to_path_buf(), error: None }
    }

    pub fn failed(file_path: &Path, error: impl ToString) -> Self {
        Self { success: false, file_path: file_path.to_path_buf(), error: Some(error.to_string()) }
    }
}

/// Serialize in memory, then write a sibling temp file and rename it into place.
pub async fn write_document(path: &Path, document: &LearningDocument) -> Result<()> {
    let json = document.to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file_name = path.file_name().ok_or_else(|| {
        LearningError::InvalidDocument(format!("{} is not a file path", path.display()))
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, json).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

pub async fn read_document(path: &Path) -> Result<(LearningDocument, usize)> {
    let json = tokio::fs::read_to_string(path).await?;
    LearningDocument::from_json_str(&json)
}
