use std::hint::black_box;

use bug_hunter_core::learning::pattern::{BugPattern, Severity};
use bug_hunter_core::{EngineConfig, PatternLearningEngine};
use criterion::{Criterion, criterion_group, criterion_main};
use tempfile::TempDir;

const DIAGNOSTIC: &str = "TypeError: Cannot read property 'name' of undefined
    at renderProfile (src/profile.js:42:17)
    at processTicksAndRejections (node:internal/process/task_queues:95:5)";

const SOURCE: &str = r#"async function loadProfile(user) {
  const res = await api.get("/users/" + user.account.id);
  el.innerHTML = res.body;
  return db.query("SELECT * FROM orders WHERE owner = " + user.id);
}"#;

fn engine_with_learned(count: usize) -> PatternLearningEngine {
    let mut engine = PatternLearningEngine::default();
    for i in 0..count {
        engine.learn_pattern(
            BugPattern::new(format!("LEARNED{i:04}"), "learned", Severity::Medium)
                .with_signature(format!("E{i:04}: * failed"))
                .with_code_pattern(format!("handler{i}(")),
            i % 2 == 0,
        );
    }
    engine
}

fn bench_matching(c: &mut Criterion) {
    let engine = PatternLearningEngine::default();
    c.bench_function("match_predefined", |b| {
        b.iter(|| engine.match_pattern(black_box(DIAGNOSTIC)));
    });

    let large = engine_with_learned(500);
    c.bench_function("match_500_learned", |b| {
        b.iter(|| large.match_pattern(black_box(DIAGNOSTIC)));
    });

    c.bench_function("recommend_fix", |b| {
        b.iter(|| engine.recommend_fix(black_box(DIAGNOSTIC)));
    });

    c.bench_function("predict_issues", |b| {
        b.iter(|| engine.predict_issues(black_box(SOURCE)));
    });
}

fn bench_persistence(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("patterns.json");
    let engine = engine_with_learned(200);

    c.bench_function("save_200_learned", |b| {
        b.to_async(&runtime).iter(|| async {
            assert!(engine.save_to_file(black_box(&path)).await.success);
        });
    });

    c.bench_function("load_200_learned", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut fresh = PatternLearningEngine::new(EngineConfig::default());
            assert!(fresh.load_from_file(black_box(&path)).await.success);
        });
    });
}

criterion_group!(benches, bench_matching, bench_persistence);
criterion_main!(benches);
