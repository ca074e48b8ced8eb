use thiserror::Error;

/// Errors raised by the FAQ navigation core and its transport adapter.
///
/// Everything except [`BotError::Transport`] is recovered locally: the failure is
/// written to the audit trail and the interaction simply gets no reply.
#[derive(Debug, Error)]
pub enum BotError {
    /// A FAQ source partition could not be read or parsed. The partition is skipped.
    #[error("failed to load FAQ source {path}: {reason}")]
    SourceLoad { path: String, reason: String },

    /// A button value or action id could not be decoded.
    #[error("malformed payload '{token}': {reason}")]
    MalformedPayload { token: String, reason: String },

    /// The payload referenced something that is not in the current corpus.
    #[error("stale selection: {0}")]
    StaleSelection(String),

    /// Socket Mode connection or acknowledgement failure. Fatal at the start-up boundary.
    #[error("transport error: {0}")]
    Transport(String),

    /// Wrapper around IO errors (audit files, FAQ sources).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON errors.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BotError {
    pub fn malformed(token: &str, reason: impl Into<String>) -> Self {
        BotError::MalformedPayload {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly name used as the audit `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::SourceLoad { .. } => "SourceLoadError",
            BotError::MalformedPayload { .. } => "MalformedPayload",
            BotError::StaleSelection(_) => "StaleSelection",
            BotError::Transport(_) => "TransportError",
            BotError::Io(_) => "IoError",
            BotError::Json(_) => "JsonError",
        }
    }
}

pub type BotResult<T> = std::result::Result<T, BotError>;
