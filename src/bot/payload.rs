//! Button payload tokens and action identifiers.
//!
//! Every button carries two strings back to us:
//!
//! - an **action id** that says *what kind* of button it was (`category_출석`,
//!   `question_3`, `back_to_start`, ...). These are recognized by prefix/shape into
//!   the closed [`ActionTag`] enum; no per-category patterns are compiled.
//! - a **value** token holding the navigational context, 1–3 fields joined by
//!   [`DELIMITER`]: `course`, `course|category`, `course|category|index` or
//!   `course|index`.
//!
//! [`decode_request`] turns the pair into the [`NavigationState`] the user asked for.
//! Decoding never guesses: a wrong field count, an empty field or a non-numeric index
//! is a [`BotError::MalformedPayload`].
use std::collections::HashSet;

use super::state::{FlowVariant, NavigationState};
use crate::errors::{BotError, BotResult};

pub const DELIMITER: char = '|';

pub const BACK_TO_START: &str = "back_to_start";
const COURSE_PREFIX: &str = "select_";
const COURSE_SUFFIX: &str = "_course";
const CATEGORY_PREFIX: &str = "category_";
const QUESTION_PREFIX: &str = "question_";
const BACK_TO_QUESTIONS_PREFIX: &str = "back_to_questions_";
const BACK_TO_CATEGORIES_PREFIX: &str = "back_to_categories_";

/// Join fields into a payload token. Fields must not contain [`DELIMITER`]; course and
/// category names are checked against this when FAQ sources load.
pub fn encode(fields: &[&str]) -> String {
    debug_assert!(
        fields.iter().all(|f| !f.contains(DELIMITER)),
        "payload field contains delimiter: {fields:?}"
    );
    fields.join(&DELIMITER.to_string())
}

/// Split a token into exactly `arity` non-empty fields.
pub fn decode(token: &str, arity: usize) -> BotResult<Vec<String>> {
    let fields: Vec<&str> = token.split(DELIMITER).collect();
    if fields.len() != arity {
        return Err(BotError::malformed(
            token,
            format!("expected {arity} field(s), got {}", fields.len()),
        ));
    }
    if fields.iter().any(|f| f.is_empty()) {
        return Err(BotError::malformed(token, "empty field"));
    }
    Ok(fields.into_iter().map(str::to_string).collect())
}

/// Parse a question index field. Only plain ASCII digits are accepted.
pub fn decode_index(token: &str, field: &str) -> BotResult<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BotError::malformed(token, format!("index '{field}' is not a number")));
    }
    field
        .parse::<usize>()
        .map_err(|e| BotError::malformed(token, format!("index '{field}': {e}")))
}

/// Replace characters that are unsafe inside action ids.
pub fn slug(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' | '(' | ')' => '_',
            other => other,
        })
        .collect()
}

pub fn course_action_id(key: &str) -> String {
    format!("{COURSE_PREFIX}{}{COURSE_SUFFIX}", slug(key))
}

pub fn category_action_id(category: &str) -> String {
    format!("{CATEGORY_PREFIX}{}", slug(category))
}

pub fn question_action_id(index: usize) -> String {
    format!("{QUESTION_PREFIX}{index}")
}

pub fn back_to_questions_action_id(course: &str) -> String {
    format!("{BACK_TO_QUESTIONS_PREFIX}{}", slug(course))
}

pub fn back_to_categories_action_id(course: &str) -> String {
    format!("{BACK_TO_CATEGORIES_PREFIX}{}", slug(course))
}

/// Hands out action ids that are unique within one rendered message. Two categories
/// whose slugs coincide (`"a b"` and `"a_b"`) get `_2`, `_3`, ... suffixes.
#[derive(Debug, Default)]
pub struct ActionIds {
    used: HashSet<String>,
}

impl ActionIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Closed set of button kinds the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTag {
    SelectCourse,
    Category,
    Question,
    BackToQuestions,
    BackToCategories,
    BackToStart,
}

impl ActionTag {
    /// Audit name for an interaction of this kind.
    pub fn audit_name(&self) -> &'static str {
        match self {
            ActionTag::SelectCourse => "course_selection",
            ActionTag::Category => "category_selection",
            ActionTag::Question => "question_selection",
            ActionTag::BackToQuestions => "back_to_questions",
            ActionTag::BackToCategories => "back_to_categories",
            ActionTag::BackToStart => "back_to_start",
        }
    }
}

/// Classify an action id by its shape.
pub fn parse_action_id(action_id: &str) -> BotResult<ActionTag> {
    let id = action_id.trim();
    if id == BACK_TO_START {
        return Ok(ActionTag::BackToStart);
    }
    if let Some(rest) = id.strip_prefix(BACK_TO_QUESTIONS_PREFIX) {
        if !rest.is_empty() {
            return Ok(ActionTag::BackToQuestions);
        }
    }
    if let Some(rest) = id.strip_prefix(BACK_TO_CATEGORIES_PREFIX) {
        if !rest.is_empty() {
            return Ok(ActionTag::BackToCategories);
        }
    }
    if let Some(rest) = id.strip_prefix(CATEGORY_PREFIX) {
        if !rest.is_empty() {
            return Ok(ActionTag::Category);
        }
    }
    if let Some(rest) = id.strip_prefix(QUESTION_PREFIX) {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(ActionTag::Question);
        }
    }
    if let Some(rest) = id.strip_prefix(COURSE_PREFIX) {
        if rest.len() > COURSE_SUFFIX.len() && rest.ends_with(COURSE_SUFFIX) {
            return Ok(ActionTag::SelectCourse);
        }
    }
    Err(BotError::malformed(action_id, "unrecognized action id"))
}

fn wrong_flow(tag: &ActionTag, value: &str, flow: FlowVariant) -> BotError {
    BotError::malformed(
        value,
        format!("{} is not part of the {} flow", tag.audit_name(), flow.as_str()),
    )
}

/// Decode the state a button asks for. Pure: no corpus lookups happen here.
pub fn decode_request(tag: &ActionTag, value: &str, flow: FlowVariant) -> BotResult<NavigationState> {
    match (tag, flow) {
        (ActionTag::BackToStart, _) => Ok(NavigationState::Start),
        (ActionTag::SelectCourse, _) => {
            let mut f = decode(value, 1)?;
            Ok(NavigationState::CourseSelected { course: f.remove(0) })
        }
        (ActionTag::Category, FlowVariant::Categorized)
        | (ActionTag::BackToQuestions, FlowVariant::Categorized) => {
            let mut f = decode(value, 2)?;
            let category = f.remove(1);
            Ok(NavigationState::CategorySelected {
                course: f.remove(0),
                category,
            })
        }
        (ActionTag::Question, FlowVariant::Categorized) => {
            let mut f = decode(value, 3)?;
            let index = decode_index(value, &f[2])?;
            let category = f.remove(1);
            Ok(NavigationState::AnswerShown {
                course: f.remove(0),
                category: Some(category),
                index,
            })
        }
        (ActionTag::Question, FlowVariant::Flat) => {
            let mut f = decode(value, 2)?;
            let index = decode_index(value, &f[1])?;
            Ok(NavigationState::AnswerShown {
                course: f.remove(0),
                category: None,
                index,
            })
        }
        (ActionTag::BackToCategories, FlowVariant::Categorized)
        | (ActionTag::BackToQuestions, FlowVariant::Flat) => {
            let mut f = decode(value, 1)?;
            Ok(NavigationState::CourseSelected { course: f.remove(0) })
        }
        (ActionTag::Category, FlowVariant::Flat) | (ActionTag::BackToCategories, FlowVariant::Flat) => {
            Err(wrong_flow(tag, value, flow))
        }
    }
}
