//! # Audit Trail
//!
//! Every notable thing the bot does is recorded three ways:
//!
//! 1. one line through the `log` facade (console and the configured log file),
//! 2. a cumulative JSON array (`bot_events_<ts>_<pid>.json`),
//! 3. a flattened CSV table (`bot_data_<ts>_<pid>.csv`) whose columns are the sorted union
//!    of every key observed so far in the process lifetime.
//!
//! The JSON and CSV files are rewritten in full on each record via a temp file and a
//! rename, so readers never observe a half-written file. An in-process mutex orders
//! writers, and an exclusive `fs2` lock on `<dir>/.audit.lock` keeps two bot
//! processes sharing one audit directory from interleaving their renames.
//!
//! The navigation core only sees the [`AuditSink`] trait; the host process owns the
//! concrete [`AuditLog`] and injects it.

mod memory;

pub use memory::{AuditRecord, MemoryAudit};

use chrono::Local;
use fs2::FileExt;
use log::{error, info, warn};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::logutil::escape_log;

/// Maximum nesting depth expanded into separate CSV columns
const FLATTEN_DEPTH: usize = 3;

/// Audit logs opened so far by this process
static OPENED: AtomicU64 = AtomicU64::new(0);

/// Receiver of audit records
pub trait AuditSink: Send + Sync {
    fn info(&self, message: &str, data: Option<&Value>);
    fn event(&self, event_type: &str, data: &Value);
    fn user_interaction(
        &self,
        action_type: &str,
        user_id: &str,
        selected_value: &str,
        data: Option<&Value>,
    );
    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>);
}

type CsvRow = BTreeMap<String, String>;

struct AuditFiles {
    json_logs: Vec<Value>,
    csv_headers: BTreeSet<String>,
    csv_rows: Vec<CsvRow>,
}

/// File-backed audit sink
pub struct AuditLog {
    json_path: PathBuf,
    csv_path: PathBuf,
    lock_path: PathBuf,
    files: Mutex<AuditFiles>,
}

impl AuditLog {
    /// Create the audit directory if needed and pick file names unique to this log:
    /// timestamp, pid, and an in-process sequence after the first log.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = match OPENED.fetch_add(1, Ordering::Relaxed) {
            0 => format!("{stamp}_{}", std::process::id()),
            n => format!("{stamp}_{}-{n}", std::process::id()),
        };
        Ok(Self {
            json_path: dir.join(format!("bot_events_{stem}.json")),
            csv_path: dir.join(format!("bot_data_{stem}.csv")),
            lock_path: dir.join(".audit.lock"),
            files: Mutex::new(AuditFiles {
                json_logs: Vec::new(),
                csv_headers: BTreeSet::new(),
                csv_rows: Vec::new(),
            }),
        })
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    fn record(&self, json_entry: Value, csv_row: Option<CsvRow>) {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files.json_logs.push(json_entry);
        if let Some(row) = csv_row {
            files.csv_headers.extend(row.keys().cloned());
            files.csv_rows.push(row);
        }

        let lock = match OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
        {
            Ok(f) => f,
            Err(e) => {
                warn!("audit lock unavailable ({}): {}", self.lock_path.display(), e);
                return;
            }
        };
        if let Err(e) = lock.lock_exclusive() {
            warn!("audit lock failed: {}", e);
            return;
        }
        if let Err(e) = self.save_json(&files) {
            warn!("JSON 로그 저장 오류: {}", e);
        }
        if !files.csv_rows.is_empty() {
            if let Err(e) = self.save_csv(&files) {
                warn!("CSV 로그 저장 오류: {}", e);
            }
        }
        if let Err(e) = fs2::FileExt::unlock(&lock) {
            warn!("audit unlock failed: {}", e);
        }
    }

    fn save_json(&self, files: &AuditFiles) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(&files.json_logs)?;
        write_replace(&self.json_path, &body)?;
        Ok(())
    }

    fn save_csv(&self, files: &AuditFiles) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(files.csv_headers.iter())?;
        for row in &files.csv_rows {
            writer.write_record(
                files
                    .csv_headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
            )?;
        }
        let body = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        write_replace(&self.csv_path, &body)?;
        Ok(())
    }
}

/// Write to `<path>.tmp` then rename over `path`.
fn write_replace(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(body)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten nested JSON into `prefix` + `_`-joined keys.
///
/// Objects nest up to `max_depth` levels; deeper objects are stored as JSON text under
/// the key reached so far. Arrays are always stored as JSON text.
pub fn flatten(value: &Value, prefix: &str, max_depth: usize) -> CsvRow {
    let mut out = CsvRow::new();
    let Value::Object(map) = value else {
        let key = prefix.trim_end_matches('_');
        out.insert(
            if key.is_empty() { "value".into() } else { key.to_string() },
            scalar_text(value),
        );
        return out;
    };
    if max_depth == 0 {
        out.insert(prefix.trim_end_matches('_').to_string(), value.to_string());
        return out;
    }
    for (k, v) in map {
        let key = format!("{prefix}{k}");
        match v {
            Value::Object(_) => out.extend(flatten(v, &format!("{key}_"), max_depth - 1)),
            Value::Array(_) => {
                out.insert(key, v.to_string());
            }
            other => {
                out.insert(key, scalar_text(other));
            }
        }
    }
    out
}

fn row(pairs: &[(&str, String)]) -> CsvRow {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

impl AuditSink for AuditLog {
    fn info(&self, message: &str, data: Option<&Value>) {
        let ts = now_iso();
        info!("{}", message);
        let entry = json!({
            "timestamp": ts,
            "level": "INFO",
            "message": message,
            "extra_data": data.cloned().unwrap_or_else(|| Value::Object(Map::new())),
        });
        let csv_row = data.map(|d| {
            let mut r = row(&[
                ("timestamp", ts.clone()),
                ("level", "INFO".into()),
                ("message", message.into()),
            ]);
            r.extend(flatten(d, "", FLATTEN_DEPTH));
            r
        });
        self.record(entry, csv_row);
    }

    fn event(&self, event_type: &str, data: &Value) {
        let ts = now_iso();
        let message = format!("[{event_type}] 이벤트 수신");
        info!("{}: {}", message, escape_log(&data.to_string()));
        let is_mention = event_type == "app_mention";
        let entry = json!({
            "timestamp": ts,
            "event_type": event_type,
            "message": message,
            "event_data": data,
            "question_time": if is_mention { Value::String(ts.clone()) } else { Value::Null },
        });
        let mut r = row(&[
            ("timestamp", ts.clone()),
            ("event_type", event_type.into()),
            ("message", message.clone()),
        ]);
        r.extend(flatten(data, "event_", FLATTEN_DEPTH));
        if is_mention {
            r.insert("question_time".into(), ts);
        }
        self.record(entry, Some(r));
    }

    fn user_interaction(
        &self,
        action_type: &str,
        user_id: &str,
        selected_value: &str,
        data: Option<&Value>,
    ) {
        let ts = now_iso();
        let message = format!(
            "[사용자 상호작용] {action_type} - 사용자: {user_id}, 선택값: {}",
            escape_log(selected_value)
        );
        info!("{}", message);
        let entry = json!({
            "timestamp": ts,
            "action_type": action_type,
            "user_id": user_id,
            "selected_value": selected_value,
            "message": message,
            "interaction_data": data.cloned().unwrap_or_else(|| Value::Object(Map::new())),
        });
        let mut r = row(&[
            ("timestamp", ts),
            ("action_type", action_type.into()),
            ("user_id", user_id.into()),
            ("selected_value", selected_value.into()),
            ("message", message.clone()),
        ]);
        if let Some(d) = data {
            r.extend(flatten(d, "interaction_", FLATTEN_DEPTH));
        }
        self.record(entry, Some(r));
    }

    fn error(&self, message: &str, cause: Option<&dyn std::error::Error>) {
        let ts = now_iso();
        let cause_text = cause.map(|c| c.to_string());
        match &cause_text {
            Some(c) => error!("ERROR: {} - {}", message, c),
            None => error!("ERROR: {}", message),
        }
        let entry = json!({
            "timestamp": ts,
            "level": "ERROR",
            "message": message,
            "error": cause_text,
        });
        let r = row(&[
            ("timestamp", ts),
            ("level", "ERROR".into()),
            ("message", message.into()),
            ("error", cause_text.unwrap_or_default()),
        ]);
        self.record(entry, Some(r));
    }
}
