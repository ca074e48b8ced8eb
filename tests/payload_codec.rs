use faqbot::bot::payload::{decode, decode_request, encode, parse_action_id, ActionTag};
use faqbot::bot::{FlowVariant, NavigationState};
use faqbot::errors::BotError;

#[test]
fn tokens_survive_korean_and_punctuation() {
    let cases: &[&[&str]] = &[
        &["AI 과정"],
        &["BDA 과정", "실시간 강의 (Zoom)"],
        &["AI 과정", "수업 외 문의", "14"],
        &["🧠 과정", "출석/결석"],
    ];
    for fields in cases {
        let token = encode(fields);
        let decoded = decode(&token, fields.len()).unwrap();
        assert_eq!(decoded, fields.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }
}

#[test]
fn malformed_tokens_are_rejected_not_guessed() {
    for (action_id, value, flow) in [
        ("question_0", "AI 과정|출석", FlowVariant::Categorized),
        ("question_0", "AI 과정|출석|0|extra", FlowVariant::Categorized),
        ("question_0", "AI 과정|-1", FlowVariant::Flat),
        ("question_0", "AI 과정|1.5", FlowVariant::Flat),
        ("category_출석", "AI 과정", FlowVariant::Categorized),
        ("select_ai_course", "", FlowVariant::Categorized),
        ("back_to_categories_AI_과정", "AI 과정", FlowVariant::Flat),
    ] {
        let tag = parse_action_id(action_id).unwrap();
        match decode_request(&tag, value, flow) {
            Err(BotError::MalformedPayload { .. }) => {}
            other => panic!("{action_id} / {value:?} / {flow:?}: expected MalformedPayload, got {other:?}"),
        }
    }
}

#[test]
fn retry_button_reopens_category_in_categorized_flow() {
    let tag = parse_action_id("back_to_questions_AI_과정").unwrap();
    assert_eq!(tag, ActionTag::BackToQuestions);
    let state = decode_request(&tag, "AI 과정|출석", FlowVariant::Categorized).unwrap();
    assert_eq!(
        state,
        NavigationState::CategorySelected {
            course: "AI 과정".into(),
            category: "출석".into()
        }
    );
}

#[test]
fn back_to_start_is_accepted_in_both_flows() {
    let tag = parse_action_id("back_to_start").unwrap();
    for flow in [FlowVariant::Categorized, FlowVariant::Flat] {
        assert_eq!(decode_request(&tag, "back_to_start", flow).unwrap(), NavigationState::Start);
    }
}
