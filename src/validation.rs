//! Validation helpers for FAQ source data and configured vocabulary.
//!
//! Course and category names travel inside button payloads, so they must never
//! contain the payload delimiter. Rather than escaping at encode time, entries that
//! break the contract are rejected when a source partition is loaded.

use crate::bot::payload::DELIMITER;
use crate::faq::FaqEntry;

/// Largest FAQ source document accepted (bytes).
pub const MAX_SOURCE_BYTES: u64 = 4 * 1024 * 1024;

/// Reasons a single FAQ entry is rejected at load time
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("course is empty")]
    EmptyCourse,

    #[error("category is empty")]
    EmptyCategory,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("{field} contains the payload delimiter '{delimiter}'")]
    ContainsDelimiter { field: &'static str, delimiter: char },

    #[error("structured answer has an empty title")]
    EmptyAnswerTitle,
}

/// Reasons a whole source document is rejected
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("file size exceeds limit ({limit} bytes)")]
    FileSizeExceeded { limit: u64 },

    #[error("invalid JSON: {0}")]
    InvalidFormat(String),
}

/// Check the invariants every entry must hold before it joins the corpus.
pub fn validate_entry(entry: &FaqEntry) -> Result<(), EntryError> {
    if entry.course.trim().is_empty() {
        return Err(EntryError::EmptyCourse);
    }
    if entry.category.trim().is_empty() {
        return Err(EntryError::EmptyCategory);
    }
    if entry.question.trim().is_empty() {
        return Err(EntryError::EmptyQuestion);
    }
    validate_payload_field("course", &entry.course)?;
    validate_payload_field("category", &entry.category)?;
    if let crate::faq::Answer::Structured { title, .. } = &entry.answer {
        if title.trim().is_empty() {
            return Err(EntryError::EmptyAnswerTitle);
        }
    }
    Ok(())
}

/// Reject a vocabulary value that would corrupt a payload token.
pub fn validate_payload_field(field: &'static str, value: &str) -> Result<(), EntryError> {
    if value.contains(DELIMITER) {
        return Err(EntryError::ContainsDelimiter {
            field,
            delimiter: DELIMITER,
        });
    }
    Ok(())
}

/// Validate file size before reading
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), SourceError> {
    if size > max_size {
        return Err(SourceError::FileSizeExceeded { limit: max_size });
    }
    Ok(())
}

/// Parse a JSON document, tolerating a UTF-8 BOM or stray leading NULs left behind by
/// editors and interrupted copies.
pub fn lenient_json_parse<T>(content: &str) -> Result<T, SourceError>
where
    T: serde::de::DeserializeOwned,
{
    let normalized = content
        .trim_start_matches('\u{feff}')
        .trim_start_matches('\0');
    serde_json::from_str(normalized).map_err(|e| SourceError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faq::{Answer, FaqEntry};

    fn entry(course: &str, category: &str, question: &str) -> FaqEntry {
        FaqEntry {
            course: course.into(),
            category: category.into(),
            question: question.into(),
            answer: Answer::Plain("ok".into()),
        }
    }

    #[test]
    fn accepts_regular_entries() {
        assert!(validate_entry(&entry("AI 과정", "출석 (온라인)", "지각 기준은?")).is_ok());
    }

    #[test]
    fn rejects_empty_fields() {
        assert_eq!(validate_entry(&entry(" ", "출석", "q")), Err(EntryError::EmptyCourse));
        assert_eq!(validate_entry(&entry("AI 과정", "", "q")), Err(EntryError::EmptyCategory));
        assert_eq!(validate_entry(&entry("AI 과정", "출석", "")), Err(EntryError::EmptyQuestion));
    }

    #[test]
    fn rejects_delimiter_in_vocabulary() {
        let err = validate_entry(&entry("AI|BDA", "출석", "q")).unwrap_err();
        assert!(matches!(err, EntryError::ContainsDelimiter { field: "course", .. }));
        let err = validate_entry(&entry("AI 과정", "a|b", "q")).unwrap_err();
        assert!(matches!(err, EntryError::ContainsDelimiter { field: "category", .. }));
    }

    #[test]
    fn rejects_untitled_structured_answer() {
        let mut e = entry("AI 과정", "출석", "q");
        e.answer = Answer::Structured {
            title: "".into(),
            items: vec!["x".into()],
        };
        assert_eq!(validate_entry(&e), Err(EntryError::EmptyAnswerTitle));
    }

    #[test]
    fn lenient_parse_strips_bom() {
        let v: Vec<u8> = lenient_json_parse("\u{feff}[1,2]").unwrap();
        assert_eq!(v, vec![1, 2]);
        assert!(lenient_json_parse::<Vec<u8>>("[1,").is_err());
    }

    #[test]
    fn file_size_limit() {
        assert!(validate_file_size(10, 100).is_ok());
        assert!(validate_file_size(101, 100).is_err());
    }
}
