use serde_json::json;
use tempfile::TempDir;

use super::pattern::{BugPattern, Severity};
use super::predefined::NULL_DEREFERENCE;
use super::*;
use crate::config::EngineConfig;

fn custom_pattern() -> BugPattern {
    BugPattern::new("CUSTOM001", "Config lookup miss", Severity::High)
        .with_description("Reading a config key that was never set")
        .with_signature("ConfigKeyMissing: *")
        .with_code_pattern("config.get(")
        .with_fix_strategy("Provide a default for the key")
        .with_example("config.get(\"port\")", "config.get(\"port\").unwrap_or(8080)")
}

#[test]
fn test_learned_pattern_is_matched_and_recommended() {
    let mut engine = PatternLearningEngine::default();
    engine.learn_pattern(custom_pattern(), true);

    let matches = engine.match_pattern("panic: ConfigKeyMissing: database.url");
    assert_eq!(matches[0].pattern.id, "CUSTOM001");
    assert!(matches[0].pattern.project_specific);

    let recommendation = engine.recommend_fix("ConfigKeyMissing: port");
    assert_eq!(recommendation.pattern.as_ref().map(|p| p.id.as_str()), Some("CUSTOM001"));
    assert!(recommendation.suggestion.contains("unwrap_or(8080)"));

    let stats = engine.learning_stats();
    assert_eq!(stats.project_specific_patterns, 1);
    assert!(stats.learning_progress > 0.0);
}

#[test]
fn test_null_dereference_message() {
    let engine = PatternLearningEngine::default();
    let matches = engine.match_pattern("Cannot read property of null");

    assert!(!matches.is_empty());
    assert_eq!(matches[0].pattern.id, NULL_DEREFERENCE);
    assert!(matches[0].confidence > 0.5);
}

#[test]
fn test_matching_does_not_record() {
    let engine = PatternLearningEngine::default();
    engine.match_pattern("Cannot read property 'x' of undefined");
    engine.recommend_fix("Cannot read property 'x' of undefined");

    assert_eq!(engine.pattern_stats(NULL_DEREFERENCE).occurrences, 0);
    assert_eq!(engine.learning_stats().most_frequent_pattern, None);
}

#[test]
fn test_occurrences_and_problem_files() {
    let mut engine = PatternLearningEngine::default();
    for _ in 0..5 {
        engine.record_occurrence("BP001");
    }
    for _ in 0..2 {
        engine.record_occurrence("BP002");
    }
    engine.record_file_issue("src/cart.js", "BP001");
    engine.record_file_issue("src/cart.js", "BP002");
    engine.record_file_issue("src/user.js", "BP001");

    assert_eq!(engine.frequent_patterns(2), vec!["BP001", "BP002"]);
    assert_eq!(engine.frequent_patterns(3), vec!["BP001"]);
    assert_eq!(engine.problematic_files(), vec!["src/cart.js", "src/user.js"]);
    assert_eq!(engine.learning_stats().most_frequent_pattern.as_deref(), Some("BP001"));
}

#[test]
fn test_export_import_round_trip() {
    let mut source = PatternLearningEngine::default();
    source.learn_pattern(custom_pattern(), false);
    source.learn_pattern(BugPattern::new("PROJ1", "Scoped", Severity::Low), true);
    source.record_occurrence("CUSTOM001");
    source.record_file_issue("src/config.rs", "CUSTOM001");

    let json = source.export_patterns().to_json_pretty().unwrap();
    let (document, skipped) = LearningDocument::from_json_str(&json).unwrap();
    assert_eq!(skipped, 0);

    let mut target = PatternLearningEngine::default();
    let report = target.import_patterns(document);
    assert_eq!((report.common, report.project_specific), (1, 1));

    assert_eq!(target.get_pattern("CUSTOM001"), source.get_pattern("CUSTOM001"));
    assert_eq!(target.project_specific_patterns().len(), 1);
    assert_eq!(target.pattern_stats("CUSTOM001").occurrences, 1);
    assert_eq!(target.problematic_files(), vec!["src/config.rs"]);
    assert_eq!(target.all_patterns().len(), source.all_patterns().len());
}

#[test]
fn test_reimporting_own_export_changes_nothing() {
    let mut engine = PatternLearningEngine::default();
    engine.learn_pattern(custom_pattern(), false);
    engine.learn_pattern(BugPattern::new("PROJ1", "Scoped", Severity::Low), true);
    engine.record_occurrence("CUSTOM001");
    engine.record_occurrence("BP002");
    engine.record_file_issue("src/config.rs", "CUSTOM001");

    let patterns_before: Vec<BugPattern> = engine.all_patterns().into_iter().cloned().collect();
    let stats_before = engine.learning_stats();
    let learned_at_before = engine.catalog().learned_at("CUSTOM001");

    let document = engine.export_patterns();
    engine.import_patterns(document);

    let patterns_after: Vec<BugPattern> = engine.all_patterns().into_iter().cloned().collect();
    assert_eq!(patterns_after, patterns_before);
    assert_eq!(engine.learning_stats(), stats_before);
    assert_eq!(engine.catalog().learned_at("CUSTOM001"), learned_at_before);
}

#[test]
fn test_relearned_pattern_equals_latest_version() {
    let mut engine = PatternLearningEngine::default();
    engine.learn_pattern(custom_pattern(), false);

    let updated = custom_pattern()
        .with_signature("ConfigKeyMissing: *")
        .with_fix_strategy("Fail fast at startup when a required key is absent");
    engine.learn_pattern(updated.clone(), false);

    let all = engine.all_patterns();
    let stored: Vec<_> = all.iter().filter(|p| p.id == "CUSTOM001").collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(*stored[0], &updated);
}

#[test]
fn test_imported_counts_saturate() {
    let mut engine = PatternLearningEngine::default();
    engine
        .import_value(&json!({"learning": {"occurrences": {"A": u64::MAX, "B": 1}}}))
        .unwrap();

    assert_eq!(engine.learning_stats().total_occurrences, u64::MAX);
    assert_eq!(engine.record_occurrence("A"), u64::MAX);
    assert_eq!(engine.record_occurrence("B"), 2);
}

#[tokio::test]
async fn test_save_and_load_into_fresh_engine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("learning").join("patterns.json");

    let mut engine = PatternLearningEngine::default();
    engine.learn_pattern(custom_pattern(), true);
    engine.record_occurrence("CUSTOM001");
    engine.record_occurrence("CUSTOM001");

    let saved = engine.save_to_file(&path).await;
    assert!(saved.success, "{:?}", saved.error);
    assert_eq!(saved.file_path, path);

    let mut fresh = PatternLearningEngine::default();
    let loaded = fresh.load_from_file(&path).await;
    assert!(loaded.success);
    assert_eq!(fresh.all_patterns().len(), engine.all_patterns().len());
    assert_eq!(fresh.get_pattern("CUSTOM001"), engine.get_pattern("CUSTOM001"));
    assert_eq!(fresh.learning_stats(), engine.learning_stats());
    assert_eq!(fresh.pattern_stats("CUSTOM001").occurrences, 2);
    assert_eq!(fresh.match_pattern("ConfigKeyMissing: x")[0].pattern.id, "CUSTOM001");
}

#[tokio::test]
async fn test_load_missing_file_leaves_state() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = PatternLearningEngine::default();
    engine.record_occurrence("BP001");
    let before = engine.all_patterns().len();

    let outcome = engine.load_from_file(temp_dir.path().join("missing.json")).await;
    assert!(!outcome.success);
    assert!(outcome.error.is_some());
    assert_eq!(engine.all_patterns().len(), before);
    assert_eq!(engine.pattern_stats("BP001").occurrences, 1);
}

#[tokio::test]
async fn test_load_corrupt_file_leaves_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("patterns.json");
    tokio::fs::write(&path, "{\"patterns\": {\"common\": ").await.unwrap();

    let mut engine = PatternLearningEngine::default();
    let before = engine.all_patterns().len();
    assert!(!engine.load_from_file(&path).await.success);
    assert_eq!(engine.all_patterns().len(), before);
}

#[tokio::test]
async fn test_save_and_load_configured_path() {
    let temp_dir = TempDir::new().unwrap();
    let config = EngineConfig {
        export_path: temp_dir.path().join("store.json"),
        ..Default::default()
    };

    let mut engine = PatternLearningEngine::new(config.clone());
    engine.learn_pattern(custom_pattern(), false);
    assert!(engine.save().await.success);

    let mut reloaded = PatternLearningEngine::new(config);
    assert!(reloaded.load().await.success);
    assert!(reloaded.get_pattern("CUSTOM001").is_some());
}

#[test]
fn test_predictions_through_engine() {
    let engine = PatternLearningEngine::default();
    let predictions = engine.predict_issues(
        "async function save(order) {\n  await api.post(order.customer.id);\n}",
    );
    let types: Vec<IssueType> = predictions.iter().map(|p| p.issue_type.clone()).collect();
    assert!(types.contains(&IssueType::NullPointer));
    assert!(types.contains(&IssueType::UnhandledRejection));
}
