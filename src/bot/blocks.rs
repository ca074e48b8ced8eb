//! The subset of Slack Block Kit the bot emits.
//!
//! Only three block kinds are ever produced: mrkdwn `section`s, `divider`s and
//! `actions` groups of buttons. Keeping the set closed means every reply validates
//! against the platform schema by construction.
use serde::{Deserialize, Serialize};

/// Slack's per-`actions` block limit we honor (the platform allows more, but five
/// keeps long question lists readable on mobile).
pub const MAX_BUTTONS_PER_GROUP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
    PlainText { text: String, emoji: bool },
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TextObject::Mrkdwn { text } | TextObject::PlainText { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        text: TextObject,
        value: String,
        action_id: String,
    },
}

impl Element {
    pub fn button(label: impl Into<String>, value: impl Into<String>, action_id: impl Into<String>) -> Self {
        Element::Button {
            text: TextObject::plain(label),
            value: value.into(),
            action_id: action_id.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Element::Button { text, .. } => text.text(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Element::Button { value, .. } => value,
        }
    }

    pub fn action_id(&self) -> &str {
        match self {
            Element::Button { action_id, .. } => action_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Divider,
    Actions { elements: Vec<Element> },
}

impl Block {
    pub fn section(mrkdwn: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::mrkdwn(mrkdwn),
        }
    }

    pub fn elements(&self) -> &[Element] {
        match self {
            Block::Actions { elements } => elements,
            _ => &[],
        }
    }
}

/// Split buttons into `actions` blocks of at most [`MAX_BUTTONS_PER_GROUP`], keeping
/// order. No buttons means no blocks (Slack rejects an empty `actions` block).
pub fn paginate(elements: Vec<Element>) -> Vec<Block> {
    let mut out = Vec::with_capacity(elements.len().div_ceil(MAX_BUTTONS_PER_GROUP));
    let mut iter = elements.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<Element> = iter.by_ref().take(MAX_BUTTONS_PER_GROUP).collect();
        out.push(Block::Actions { elements: chunk });
    }
    out
}

/// A complete reply: Block Kit blocks plus the plain-text notification fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub text: String,
    pub blocks: Vec<Block>,
}

impl Menu {
    /// All buttons in display order.
    pub fn buttons(&self) -> Vec<&Element> {
        self.blocks.iter().flat_map(|b| b.elements()).collect()
    }

    /// Number of `actions` blocks.
    pub fn action_groups(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Actions { .. }))
            .count()
    }

    /// Text of every section, joined with newlines (handy for logs and tests).
    pub fn section_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { text } => Some(text.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
