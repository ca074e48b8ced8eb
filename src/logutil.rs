//! Logging helpers that keep user-supplied values on one log line and keep secrets
//! out of the log entirely.

/// Escape control characters so a value cannot break a log line, and cap its length.
/// Newlines, carriage returns and tabs become `\n`, `\r`, `\t`; other controls become `\xNN`.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 300;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Presence map for credential variables: `{"SLACK_BOT_TOKEN": true, ...}`.
/// Only whether a value is set is ever reported.
pub fn token_status(vars: &[&str]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for var in vars {
        let set = std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false);
        map.insert((*var).to_string(), serde_json::Value::Bool(set));
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_newlines_and_truncates() {
        assert_eq!(escape_log("AI 과정|출석\n0"), "AI 과정|출석\\n0");
        let long = "가".repeat(400);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), 301);
        assert!(esc.ends_with('…'));
    }

    #[test]
    fn token_status_reports_presence_only() {
        let v = token_status(&["FAQBOT_SURELY_UNSET_VAR"]);
        assert_eq!(v["FAQBOT_SURELY_UNSET_VAR"], serde_json::Value::Bool(false));
    }
}
