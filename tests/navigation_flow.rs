mod common;

use common::{click, entry, memory_engine};
use faqbot::bot::{FlowVariant, NavigationState};
use faqbot::metrics;

fn three_attendance() -> Vec<faqbot::faq::FaqEntry> {
    vec![
        entry("AI 과정", "출석", "q0"),
        entry("AI 과정", "출석", "q1"),
        entry("AI 과정", "출석", "q2"),
        entry("BDA 과정", "출석", "b0"),
    ]
}

#[test]
fn stale_index_is_logged_and_unanswered() {
    let (engine, audit) = memory_engine(FlowVariant::Categorized, three_attendance());
    let before = metrics::snapshot().stale;

    assert!(engine.handle(&click("question_5", "AI 과정|출석|5")).is_none());

    let errors = audit.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].0.contains("StaleSelection"));
    assert!(errors[0].1.as_deref().unwrap_or_default().contains("index 5"));
    assert!(metrics::snapshot().stale > before);
}

#[test]
fn full_categorized_round_trip_including_back_edges() {
    let (engine, audit) = memory_engine(FlowVariant::Categorized, three_attendance());

    let t = engine.handle(&click("select_ai_course", "AI 과정")).unwrap();
    assert_eq!(t.state, NavigationState::CourseSelected { course: "AI 과정".into() });

    let t = engine.handle(&click("category_출석", "AI 과정|출석")).unwrap();
    let q2 = t.menu.buttons()[2].value().to_string();
    assert_eq!(q2, "AI 과정|출석|2");

    let t = engine.handle(&click("question_2", &q2)).unwrap();
    assert!(t.menu.section_text().contains("q2"));

    // retry: same category
    let retry = t.menu.buttons()[0].value().to_string();
    let t = engine
        .handle(&click("back_to_questions_AI_과정", &retry))
        .unwrap();
    assert!(matches!(t.state, NavigationState::CategorySelected { .. }));

    // back: category picker
    let t = engine
        .handle(&click("back_to_categories_AI_과정", "AI 과정"))
        .unwrap();
    assert_eq!(t.state, NavigationState::CourseSelected { course: "AI 과정".into() });
    assert_eq!(t.menu.buttons().len(), 1);

    let actions: Vec<String> = audit.interactions().into_iter().map(|(a, _)| a).collect();
    assert_eq!(
        actions,
        vec![
            "course_selection",
            "category_selection",
            "question_selection",
            "back_to_questions",
            "back_to_categories"
        ]
    );
}

#[test]
fn flat_flow_round_trip() {
    let (engine, audit) = memory_engine(FlowVariant::Flat, three_attendance());

    let t = engine.handle(&click("select_bda_course", "BDA 과정")).unwrap();
    assert_eq!(t.menu.buttons()[0].value(), "BDA 과정|0");

    let t = engine.handle(&click("question_0", "BDA 과정|0")).unwrap();
    assert_eq!(
        t.state,
        NavigationState::AnswerShown { course: "BDA 과정".into(), category: None, index: 0 }
    );
    assert!(t.menu.section_text().contains("b0"));

    let t = engine
        .handle(&click("back_to_questions_BDA_과정", "BDA 과정"))
        .unwrap();
    assert_eq!(t.state, NavigationState::CourseSelected { course: "BDA 과정".into() });

    let t = engine.handle(&click("back_to_start", "back_to_start")).unwrap();
    assert_eq!(t.state, NavigationState::Start);
    assert_eq!(t.menu.buttons().len(), 2);

    // positional index beyond the course view
    assert!(engine.handle(&click("question_1", "BDA 과정|1")).is_none());
    assert_eq!(audit.errors().len(), 1);
}

#[test]
fn corrupted_payloads_produce_no_reply() {
    let (engine, audit) = memory_engine(FlowVariant::Categorized, three_attendance());
    assert!(engine.handle(&click("question_0", "AI 과정|출석|zero")).is_none());
    assert!(engine.handle(&click("question_0", "AI 과정")).is_none());
    assert!(engine.handle(&click("unknown_button", "AI 과정")).is_none());
    let errors = audit.errors();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|(m, _)| m.starts_with("MalformedPayload")));
    assert!(audit.interactions().is_empty());
}

#[test]
fn concurrent_interactions_do_not_interfere() {
    let (engine, _) = memory_engine(FlowVariant::Categorized, three_attendance());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let idx = i % 3;
                let t = engine
                    .handle(&click(&format!("question_{idx}"), &format!("AI 과정|출석|{idx}")))
                    .unwrap();
                assert!(t.menu.section_text().contains(&format!("q{idx}")));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn resolve_matches_handle_without_auditing() {
    let (engine, audit) = memory_engine(FlowVariant::Categorized, three_attendance());
    let clicks = [
        click("select_ai_course", "AI 과정"),
        click("category_출석", "AI 과정|출석"),
        click("question_1", "AI 과정|출석|1"),
        click("question_9", "AI 과정|출석|9"),
        click("bogus", "x"),
    ];

    for c in &clicks {
        let resolved = engine.resolve(c).ok();
        let handled = engine.handle(c);
        assert_eq!(
            resolved.as_ref().map(|t| (&t.state, &t.menu, t.action)),
            handled.as_ref().map(|t| (&t.state, &t.menu, t.action)),
            "{}",
            c.action_id
        );
    }
    // only handle() writes to the audit trail
    assert_eq!(audit.interactions().len(), 4);
    assert_eq!(audit.errors().len(), 2);
}
