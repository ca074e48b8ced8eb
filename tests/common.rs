//! Test utilities & fixtures.
//! Provides access to the FAQ source fixtures under `tests/test-data-int`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use faqbot::audit::MemoryAudit;
use faqbot::bot::{CourseOption, FlowVariant, Interaction, MenuRenderer, NavigationEngine};
use faqbot::config::Config;
use faqbot::faq::{Answer, FaqCorpus, FaqEntry, FaqRepository, FaqSource};

/// Return the path to the static integration test fixture directory.
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

/// The four fixture partitions in their production order.
#[allow(dead_code)]
pub fn fixture_sources() -> Vec<FaqSource> {
    let root = fixture_root();
    vec![
        FaqSource::new(root.join("attendance-faq.json"), "출석 관련"),
        FaqSource::new(root.join("live-lecture-faq.json"), "실시간 강의 관련"),
        FaqSource::new(root.join("online-lecture-faq.json"), "온라인 강의 관련"),
        FaqSource::new(root.join("cource-etc-faq.json"), "과정 외 관련"),
    ]
}

/// Default config pointed at the fixtures and a throwaway audit dir.
#[allow(dead_code)]
pub fn fixture_config(audit_dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.faq.sources = fixture_sources();
    cfg.audit.dir = audit_dir.to_string_lossy().to_string();
    cfg.logging.file = None;
    cfg
}

#[allow(dead_code)]
pub fn entry(course: &str, category: &str, question: &str) -> FaqEntry {
    FaqEntry {
        course: course.into(),
        category: category.into(),
        question: question.into(),
        answer: Answer::Plain(format!("{question} 에 대한 답변")),
    }
}

/// Engine over an in-memory corpus with default courses.
#[allow(dead_code)]
pub fn memory_engine(flow: FlowVariant, entries: Vec<FaqEntry>) -> (Arc<NavigationEngine>, Arc<MemoryAudit>) {
    let audit = Arc::new(MemoryAudit::new());
    let repo = Arc::new(FaqRepository::from_corpus(FaqCorpus::new(entries), audit.clone()));
    let renderer = MenuRenderer::new(flow, CourseOption::defaults());
    (Arc::new(NavigationEngine::new(repo, renderer, audit.clone())), audit)
}

#[allow(dead_code)]
pub fn click(action_id: &str, value: &str) -> Interaction {
    Interaction {
        action_id: action_id.into(),
        value: value.into(),
        user_id: "U_TEST".into(),
        channel_id: "C_TEST".into(),
        raw: serde_json::json!({"type": "block_actions", "user": {"id": "U_TEST"}}),
    }
}
