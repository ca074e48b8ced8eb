mod common;

use std::sync::Arc;

use faqbot::audit::{AuditRecord, MemoryAudit};
use faqbot::bot::{BotServer, FlowVariant};
use faqbot::slack::{parse_envelope, EnvelopeKind, InboundEvent};
use serde_json::json;

fn event_from(frame: &str) -> InboundEvent {
    match parse_envelope(frame).unwrap().kind {
        EnvelopeKind::Event(e) => e,
        other => panic!("not an event: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mention_then_clicks_over_fixture_sources() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = common::fixture_config(tmp.path());
    let audit = Arc::new(MemoryAudit::new());
    let mut server = BotServer::new(cfg, audit.clone()).expect("server");

    server
        .route_test_event(event_from(
            r#"{"envelope_id":"1","type":"events_api","payload":{"event":
                {"type":"app_mention","user":"U1","channel":"C1","text":"<@B>"}}}"#,
        ))
        .await
        .expect("mention");
    let reply = server.test_replies().last().expect("start menu");
    assert_eq!(reply.channel, "C1");
    assert_eq!(reply.menu.buttons()[0].action_id(), "select_ai_course");

    server
        .route_test_event(event_from(
            r#"{"envelope_id":"2","type":"interactive","payload":{"type":"block_actions",
                "user":{"id":"U1"},"channel":{"id":"C1"},
                "actions":[{"action_id":"select_ai_course","value":"AI 과정"}]}}"#,
        ))
        .await
        .expect("course");
    let reply = server.test_replies().last().unwrap();
    let labels: Vec<&str> = reply.menu.buttons().iter().map(|b| b.label()).collect();
    assert_eq!(labels, vec!["📋 출석", "🏫 실시간 강의", "💻 온라인 강의", "📋 수업 외 문의"]);

    let events: Vec<String> = audit
        .records()
        .into_iter()
        .filter_map(|r| match r {
            AuditRecord::Event { event_type, .. } => Some(event_type),
            _ => None,
        })
        .collect();
    assert_eq!(events, vec!["app_mention"]);
    assert_eq!(audit.interactions(), vec![("course_selection".to_string(), "AI 과정".to_string())]);
}

#[tokio::test]
async fn plain_messages_are_audited_but_never_answered() {
    let tmp = tempfile::tempdir().unwrap();
    let audit = Arc::new(MemoryAudit::new());
    let mut server = BotServer::new(common::fixture_config(tmp.path()), audit.clone()).unwrap();

    server
        .route_test_event(InboundEvent::Message {
            raw: json!({"type": "message", "text": "안녕하세요", "user": "U2"}),
        })
        .await
        .unwrap();
    assert!(server.test_replies().is_empty());
    assert!(matches!(
        audit.records().last(),
        Some(AuditRecord::Event { event_type, .. }) if event_type == "message"
    ));
}

#[tokio::test]
async fn stale_click_routes_to_nothing() {
    let (engine, audit) = common::memory_engine(
        FlowVariant::Categorized,
        vec![common::entry("AI 과정", "출석", "q0")],
    );
    let tmp = tempfile::tempdir().unwrap();
    let mut server = BotServer::with_engine(common::fixture_config(tmp.path()), engine, audit.clone());

    server
        .route_test_event(InboundEvent::Action(common::click("question_3", "AI 과정|출석|3")))
        .await
        .unwrap();
    assert!(server.test_replies().is_empty());
    assert_eq!(audit.errors().len(), 1);
}

#[tokio::test]
async fn secondary_identity_serves_flat_menus() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = common::fixture_config(tmp.path());
    cfg.bot.identity = faqbot::config::BotIdentity::Secondary;
    let mut server = BotServer::new(cfg, Arc::new(MemoryAudit::new())).unwrap();

    server
        .route_test_event(InboundEvent::Action(common::click("select_ai_course", "AI 과정")))
        .await
        .unwrap();
    let menu = &server.test_replies()[0].menu;
    assert!(menu.section_text().contains("총 5개의 질문이 있습니다."));
    assert_eq!(menu.buttons().last().unwrap().action_id(), "back_to_start");
}

#[test]
fn route_event_answers_mentions_in_their_channel() {
    let (engine, audit) = common::memory_engine(FlowVariant::Flat, Vec::new());
    let tmp = tempfile::tempdir().unwrap();
    let server = BotServer::with_engine(common::fixture_config(tmp.path()), engine, audit);
    let reply = server
        .route_event(InboundEvent::Mention {
            channel: "C42".into(),
            user: "U7".into(),
            raw: json!({"type": "app_mention"}),
        })
        .expect("start menu");
    assert_eq!(reply.channel, "C42");
    assert_eq!(reply.menu.text, "과정을 선택해주세요.");
}
