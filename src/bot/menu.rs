//! Menu rendering: navigation state + corpus → Block Kit reply.
//!
//! Everything here is a pure function of its inputs, so the same corpus always yields
//! the same buttons in the same order with the same action ids.
//!
//! Layout conventions:
//! - every menu is a header `section`, a `divider`, then button groups of at most five
//! - button labels are capped at 75 characters (72 + `...`)
//! - answer screens end with two navigation buttons: retry within scope, and back to
//!   the parent scope (categories in the 3-level flow, start in the 2-level flow)
use serde::{Deserialize, Serialize};

use super::blocks::{paginate, Block, Element, Menu};
use super::payload::{
    back_to_categories_action_id, back_to_questions_action_id, category_action_id, course_action_id,
    encode, question_action_id, ActionIds, BACK_TO_START,
};
use super::state::FlowVariant;
use crate::faq::{Answer, FaqCorpus, FaqEntry};

/// Longest label shown on a button, in characters
pub const MAX_LABEL_CHARS: usize = 75;
const TRUNCATED_CHARS: usize = 72;
const ELLIPSIS: &str = "...";

const WELCOME: &str =
    "안녕하세요! 🤖 커널아카데미 부트캠프 FAQ 봇입니다.\n현재 진행중인 과정명을 선택해주세요.";

/// A course button on the start menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOption {
    /// Short ASCII key used in the action id (`select_<key>_course`)
    pub key: String,
    /// Course name as it appears in FAQ sources
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

impl CourseOption {
    pub fn new(key: &str, name: &str, emoji: &str) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// The two bootcamp tracks the bot has always offered.
    pub fn defaults() -> Vec<CourseOption> {
        vec![
            CourseOption::new("ai", "AI 과정", "🧠"),
            CourseOption::new("bda", "BDA 과정", "📊"),
        ]
    }
}

/// Cap a label at [`MAX_LABEL_CHARS`] characters without splitting a code point.
pub fn truncate_label(s: &str) -> String {
    if s.chars().count() <= MAX_LABEL_CHARS {
        return s.to_string();
    }
    let mut out: String = s.chars().take(TRUNCATED_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Render an answer body as mrkdwn. Structured answers get a bold title, a blank line,
/// then each item on its own line; an empty item is a paragraph break.
pub fn format_answer(answer: &Answer) -> String {
    match answer {
        Answer::Plain(text) => text.clone(),
        Answer::Structured { title, items } => {
            let mut out = format!("*{title}*\n\n");
            for item in items {
                if item.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(item);
                    out.push('\n');
                }
            }
            out
        }
    }
}

/// Icon on category buttons (3-level flow)
pub fn category_icon(category: &str) -> &'static str {
    if category.contains("실시간") {
        "🏫"
    } else if category.contains("온라인") {
        "💻"
    } else {
        "📋"
    }
}

/// Icon prefixed to question labels in the 2-level flow, hinting at the hidden category
pub fn question_icon(category: &str) -> &'static str {
    if category.contains("출석") {
        "📋"
    } else if category.contains("실시간") {
        "🏫"
    } else if category.contains("온라인") {
        "💻"
    } else if category.contains("수업 외") {
        "📚"
    } else {
        "❓"
    }
}

/// Pure renderer for one flow variant
#[derive(Debug, Clone)]
pub struct MenuRenderer {
    flow: FlowVariant,
    courses: Vec<CourseOption>,
}

impl MenuRenderer {
    pub fn new(flow: FlowVariant, courses: Vec<CourseOption>) -> Self {
        Self { flow, courses }
    }

    pub fn flow(&self) -> FlowVariant {
        self.flow
    }

    pub fn courses(&self) -> &[CourseOption] {
        &self.courses
    }

    /// Course picker shown on mention and on `back_to_start`. Independent of FAQ data.
    pub fn render_start(&self) -> Menu {
        let mut ids = ActionIds::new();
        let buttons: Vec<Element> = self
            .courses
            .iter()
            .map(|c| {
                let label = if c.emoji.is_empty() {
                    c.name.clone()
                } else {
                    format!("{} {}", c.emoji, c.name)
                };
                Element::button(label, c.name.clone(), ids.unique(course_action_id(&c.key)))
            })
            .collect();
        let mut blocks = vec![Block::section(WELCOME), Block::Divider];
        blocks.extend(paginate(buttons));
        Menu {
            text: "과정을 선택해주세요.".into(),
            blocks,
        }
    }

    /// Menu after a course is picked: categories (3-level) or all questions (2-level).
    pub fn render_course(&self, corpus: &FaqCorpus, course: &str) -> Menu {
        match self.flow {
            FlowVariant::Categorized => self.render_categories(corpus, course),
            FlowVariant::Flat => self.render_course_questions(corpus, course),
        }
    }

    /// Category picker for a course, categories in first-seen corpus order.
    pub fn render_categories(&self, corpus: &FaqCorpus, course: &str) -> Menu {
        let mut ids = ActionIds::new();
        let buttons: Vec<Element> = corpus
            .categories_for(course)
            .into_iter()
            .map(|category| {
                Element::button(
                    truncate_label(&format!("{} {}", category_icon(category), category)),
                    encode(&[course, category]),
                    ids.unique(category_action_id(category)),
                )
            })
            .collect();
        let mut blocks = vec![
            Block::section(format!(
                "*{course}*에 대한 FAQ입니다.\n\n*카테고리를 선택해주세요:*"
            )),
            Block::Divider,
        ];
        blocks.extend(paginate(buttons));
        Menu {
            text: "카테고리를 선택해주세요.".into(),
            blocks,
        }
    }

    /// Questions of one category plus a way back to the category picker (3-level).
    pub fn render_category(&self, corpus: &FaqCorpus, course: &str, category: &str) -> Menu {
        let buttons: Vec<Element> = corpus
            .questions_for_category(course, category)
            .into_iter()
            .enumerate()
            .map(|(i, faq)| {
                Element::button(
                    truncate_label(&faq.question),
                    encode(&[course, category, i.to_string().as_str()]),
                    question_action_id(i),
                )
            })
            .collect();
        let mut blocks = vec![
            Block::section(format!(
                "*{course}* > *{category}*\n\n*궁금한 질문을 선택해주세요:*"
            )),
            Block::Divider,
        ];
        blocks.extend(paginate(buttons));
        blocks.push(Block::Actions {
            elements: vec![Element::button(
                "◀️ 카테고리 선택으로 돌아가기",
                course,
                back_to_categories_action_id(course),
            )],
        });
        Menu {
            text: "질문을 선택해주세요.".into(),
            blocks,
        }
    }

    /// Every question of a course with category icons, plus a way back to start (2-level).
    pub fn render_course_questions(&self, corpus: &FaqCorpus, course: &str) -> Menu {
        let questions = corpus.questions_for(course);
        let total = questions.len();
        let buttons: Vec<Element> = questions
            .into_iter()
            .enumerate()
            .map(|(i, faq)| {
                Element::button(
                    truncate_label(&format!("{} {}", question_icon(&faq.category), faq.question)),
                    encode(&[course, i.to_string().as_str()]),
                    question_action_id(i),
                )
            })
            .collect();
        let mut blocks = vec![
            Block::section(format!(
                "*{course}*에 대한 모든 FAQ입니다.\n\n*궁금한 질문을 선택해주세요:*\n총 {total}개의 질문이 있습니다."
            )),
            Block::Divider,
        ];
        blocks.extend(paginate(buttons));
        blocks.push(Block::Actions {
            elements: vec![Element::button(
                "◀️ 과정 선택으로 돌아가기",
                BACK_TO_START,
                BACK_TO_START,
            )],
        });
        Menu {
            text: "질문을 선택해주세요.".into(),
            blocks,
        }
    }

    /// Answer screen for one entry.
    pub fn render_answer(&self, entry: &FaqEntry) -> Menu {
        let course = entry.course.as_str();
        let navigation = match self.flow {
            FlowVariant::Categorized => vec![
                Element::button(
                    "🔄 같은 카테고리 다른 질문 보기",
                    encode(&[course, entry.category.as_str()]),
                    back_to_questions_action_id(course),
                ),
                Element::button(
                    "◀️ 카테고리 선택으로 돌아가기",
                    course,
                    back_to_categories_action_id(course),
                ),
            ],
            FlowVariant::Flat => vec![
                Element::button(
                    "🔄 다른 질문 보기",
                    course,
                    back_to_questions_action_id(course),
                ),
                Element::button("🏠 처음으로 돌아가기", BACK_TO_START, BACK_TO_START),
            ],
        };
        Menu {
            text: "FAQ 답변입니다.".into(),
            blocks: vec![
                Block::section(format!(
                    "*Q: {}*\n📂 카테고리: {}\n🎓 과정: {}",
                    entry.question, entry.category, entry.course
                )),
                Block::Divider,
                Block::section(format!("*A:* {}", format_answer(&entry.answer))),
                Block::Divider,
                Block::Actions { elements: navigation },
            ],
        }
    }
}
