use serde_json::Value;
use std::sync::{Mutex, PoisonError};

use super::AuditSink;

/// One captured audit call
#[derive(Debug, Clone, PartialEq)]
pub enum AuditRecord {
    Info {
        message: String,
        data: Option<Value>,
    },
    Event {
        event_type: String,
        data: Value,
    },
    Interaction {
        action_type: String,
        user_id: String,
        selected_value: String,
    },
    Error {
        message: String,
        cause: Option<String>,
    },
}

/// In-memory sink used by tests and the `status` command.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Error records only, as `(message, cause)` pairs.
    pub fn errors(&self) -> Vec<(String, Option<String>)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                AuditRecord::Error { message, cause } => Some((message, cause)),
                _ => None,
            })
            .collect()
    }

    /// Interaction records only, as `(action_type, selected_value)` pairs.
    pub fn interactions(&self) -> Vec<(String, String)> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                AuditRecord::Interaction {
                    action_type,
                    selected_value,
                    ..
                } => Some((action_type, selected_value)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, r: AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(r);
    }
}

impl AuditSink for MemoryAudit {
    fn info(&self, message: &str, data: Option<&Value>) {
        self.push(AuditRecord::Info {
            message: message.to_string(),
            data: data.cloned(),
        });
    }

    fn event(&self, event_type: &str, data: &Value) {
        self.push(AuditRecord::Event {
            event_type: event_type.to_string(),
            data: data.clone(),
        });
    }

    fn user_interaction(
        &self,
        action_type: &str,
        user_id: &str,
        selected_value: &str,
        _data: Option<&Value>,
    ) {
        self.push(AuditRecord::Interaction {
            action_type: action_type.to_string(),
            user_id: user_id.to_string(),
            selected_value: selected_value.to_string(),
        });
    }

    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        self.push(AuditRecord::Error {
            message: message.to_string(),
            cause: cause.map(|c| c.to_string()),
        });
    }
}
