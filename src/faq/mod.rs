//! # FAQ Data Model
//!
//! FAQ content is authored as one JSON document per topic partition (attendance,
//! live lectures, online lectures, non-course questions, ...). Each document is a
//! list of entries:
//!
//! ```json
//! [
//!   {
//!     "course": "AI 과정",
//!     "category": "출석",
//!     "question": "지각 기준은 어떻게 되나요?",
//!     "answer": { "title": "지각 기준 안내", "items": ["10분 이후 입실 시 지각", "", "문의: 운영팀"] }
//!   }
//! ]
//! ```
//!
//! The `answer` field is either a plain string or a structured `{title, items}`
//! object. The two shapes are resolved into [`Answer`] when the document is
//! deserialized, so rendering never has to inspect raw JSON.
//!
//! Partitions are merged into a [`FaqCorpus`] by [`repository::load`]. Corpus order is
//! significant: question indices carried in button payloads are positions inside a
//! *filtered* view, so every filter here is stable.

pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use repository::{FaqRepository, FaqSource, ReloadPolicy};

/// Answer body of a FAQ entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Plain(String),
    /// Title line plus ordered content lines; an empty line is a paragraph break.
    Structured { title: String, items: Vec<String> },
}

/// One question/answer pair scoped to a course and category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub course: String,
    /// Missing in some source files; such entries fail validation and are skipped.
    #[serde(default)]
    pub category: String,
    pub question: String,
    pub answer: Answer,
}

/// Ordered, read-only collection of all loaded FAQ entries
#[derive(Debug, Clone)]
pub struct FaqCorpus {
    entries: Vec<FaqEntry>,
    loaded_at: DateTime<Utc>,
    failed_sources: usize,
}

impl Default for FaqCorpus {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FaqCorpus {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self {
            entries,
            loaded_at: Utc::now(),
            failed_sources: 0,
        }
    }

    pub(crate) fn with_failures(mut self, failed_sources: usize) -> Self {
        self.failed_sources = failed_sources;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Number of source partitions that could not be loaded into this snapshot.
    pub fn failed_sources(&self) -> usize {
        self.failed_sources
    }

    /// Entries for a course, in corpus order.
    pub fn questions_for(&self, course: &str) -> Vec<&FaqEntry> {
        self.entries.iter().filter(|e| e.course == course).collect()
    }

    /// Entries for a course and category, in corpus order.
    pub fn questions_for_category(&self, course: &str, category: &str) -> Vec<&FaqEntry> {
        self.entries
            .iter()
            .filter(|e| e.course == course && e.category == category)
            .collect()
    }

    /// Distinct categories of a course, in first-seen order.
    pub fn categories_for(&self, course: &str) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for e in self.entries.iter().filter(|e| e.course == course) {
            if !seen.contains(&e.category.as_str()) {
                seen.push(e.category.as_str());
            }
        }
        seen
    }

    pub fn has_category(&self, course: &str, category: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.course == course && e.category == category)
    }

    /// Distinct courses, in first-seen order.
    pub fn courses(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !seen.contains(&e.course.as_str()) {
                seen.push(e.course.as_str());
            }
        }
        seen
    }

    /// Per-course, per-category entry counts (sorted for stable display).
    pub fn summary(&self) -> BTreeMap<String, BTreeMap<String, usize>> {
        let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for e in &self.entries {
            *out.entry(e.course.clone())
                .or_default()
                .entry(e.category.clone())
                .or_default() += 1;
        }
        out
    }
}
