mod common;

use std::sync::Arc;

use faqbot::audit::{AuditRecord, MemoryAudit};
use faqbot::errors::BotError;
use faqbot::faq::repository::{load, load_source};
use faqbot::faq::{Answer, FaqRepository, FaqSource, ReloadPolicy};

#[test]
fn all_four_partitions_merge_in_order() {
    let audit = MemoryAudit::new();
    let corpus = load(&common::fixture_sources(), &audit);

    // 3 attendance + 2 live + 1 online + 1 etc; invalid entries skipped
    assert_eq!(corpus.len(), 7);
    assert_eq!(corpus.failed_sources(), 0);
    assert!(audit.errors().is_empty());
    assert_eq!(corpus.courses(), vec!["AI 과정", "BDA 과정"]);
    assert_eq!(
        corpus.categories_for("AI 과정"),
        vec!["출석", "실시간 강의", "온라인 강의", "수업 외 문의"]
    );
    assert_eq!(corpus.questions_for("AI 과정").len(), 5);
}

#[test]
fn missing_partition_degrades_coverage_only() {
    let mut sources = common::fixture_sources();
    sources[1] = FaqSource::new(common::fixture_root().join("no-such-file.json"), "실시간 강의 관련");

    let audit = MemoryAudit::new();
    let corpus = load(&sources, &audit);

    assert_eq!(corpus.len(), 3 + 1 + 1);
    assert_eq!(corpus.failed_sources(), 1);
    let errors = audit.errors();
    assert_eq!(errors.len(), 1, "exactly one load error: {errors:?}");
    assert!(errors[0].0.contains("no-such-file.json"));
    assert!(errors[0].1.as_deref().unwrap_or_default().contains("failed to load FAQ source"));

    let infos = audit
        .records()
        .into_iter()
        .filter(|r| matches!(r, AuditRecord::Info { .. }))
        .count();
    // three successes plus the total line
    assert_eq!(infos, 4);
}

#[test]
fn non_list_document_fails_the_partition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"course": "AI 과정"}"#).unwrap();
    match load_source(&path) {
        Err(BotError::SourceLoad { path: p, .. }) => assert!(p.ends_with("broken.json")),
        other => panic!("expected SourceLoad, got {other:?}"),
    }
}

#[test]
fn structured_answers_resolve_at_load_time() {
    let entries = load_source(&common::fixture_root().join("attendance-faq.json")).unwrap();
    assert_eq!(entries.len(), 3);
    match &entries[0].answer {
        Answer::Structured { title, items } => {
            assert_eq!(title, "지각 기준 안내");
            assert_eq!(items.len(), 3);
            assert!(items[1].is_empty());
        }
        other => panic!("expected structured answer, got {other:?}"),
    }
    assert!(matches!(entries[1].answer, Answer::Plain(_)));
}

#[test]
fn cached_policy_serves_one_snapshot_until_invalidated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");
    std::fs::write(
        &path,
        r#"[{"course":"AI 과정","category":"출석","question":"q1","answer":"a1"}]"#,
    )
    .unwrap();

    let audit = Arc::new(MemoryAudit::new());
    let repo = FaqRepository::new(vec![FaqSource::new(&path, "t")], ReloadPolicy::Cached, audit.clone());
    let first = repo.snapshot();
    assert_eq!(first.len(), 1);

    std::fs::write(
        &path,
        r#"[{"course":"AI 과정","category":"출석","question":"q1","answer":"a1"},
            {"course":"AI 과정","category":"출석","question":"q2","answer":"a2"}]"#,
    )
    .unwrap();
    assert_eq!(repo.snapshot().len(), 1);
    repo.invalidate();
    assert_eq!(repo.snapshot().len(), 2);
    // the earlier snapshot is untouched
    assert_eq!(first.len(), 1);
}

#[test]
fn always_policy_rereads_every_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");
    std::fs::write(&path, "[]").unwrap();

    let audit = Arc::new(MemoryAudit::new());
    let repo = FaqRepository::new(vec![FaqSource::new(&path, "t")], ReloadPolicy::Always, audit);
    assert!(repo.snapshot().is_empty());
    std::fs::write(
        &path,
        r#"[{"course":"BDA 과정","category":"출석","question":"q","answer":"a"}]"#,
    )
    .unwrap();
    assert_eq!(repo.snapshot().len(), 1);
}

#[test]
fn entries_without_a_category_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.json");
    std::fs::write(
        &path,
        r#"[
            {"course": "AI 과정", "question": "카테고리 없음?", "answer": "a"},
            {"course": "AI 과정", "category": " ", "question": "공백 카테고리?", "answer": "a"},
            {"course": "AI 과정", "category": "출석", "question": "QR 출석 방법은?", "answer": "a"}
        ]"#,
    )
    .unwrap();
    let entries = load_source(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, "출석");
}

#[test]
fn every_rendered_category_button_navigates() {
    let (engine, audit) = common::memory_engine(
        faqbot::bot::FlowVariant::Categorized,
        load(&common::fixture_sources(), &MemoryAudit::new()).entries().to_vec(),
    );
    let course = engine.handle(&common::click("select_ai_course", "AI 과정")).unwrap();
    for button in course.menu.buttons() {
        let next = engine.handle(&common::click(button.action_id(), button.value()));
        assert!(next.is_some(), "dead button {} ({})", button.label(), button.action_id());
    }
    assert!(audit.errors().is_empty());
}
