//! Loading and caching of topic-partitioned FAQ sources.
//!
//! A missing or broken partition degrades coverage, not availability: the failure
//! is written to the audit trail once and the remaining partitions still load.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::{FaqCorpus, FaqEntry};
use crate::audit::AuditSink;
use crate::errors::BotError;
use crate::metrics;
use crate::validation::{lenient_json_parse, validate_entry, validate_file_size, MAX_SOURCE_BYTES};

/// One FAQ partition on disk plus a human label used in logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqSource {
    pub path: PathBuf,
    pub label: String,
}

impl FaqSource {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// When the corpus is re-read from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Re-read every source for each interaction that needs FAQ data.
    #[default]
    Always,
    /// Load once and serve the snapshot until [`FaqRepository::invalidate`] is called.
    Cached,
}

/// Read one partition. Invalid entries are skipped with a warning; a missing file or
/// a document that is not a JSON list fails the whole partition.
pub fn load_source(path: &Path) -> Result<Vec<FaqEntry>, BotError> {
    let display = path.display().to_string();
    let source_err = |reason: String| BotError::SourceLoad {
        path: display.clone(),
        reason,
    };

    let meta = std::fs::metadata(path).map_err(|e| source_err(e.to_string()))?;
    validate_file_size(meta.len(), MAX_SOURCE_BYTES).map_err(|e| source_err(e.to_string()))?;
    let content = std::fs::read_to_string(path).map_err(|e| source_err(e.to_string()))?;
    let raw: Vec<Value> = lenient_json_parse(&content).map_err(|e| source_err(e.to_string()))?;

    let mut entries = Vec::with_capacity(raw.len());
    for (pos, value) in raw.into_iter().enumerate() {
        let entry: FaqEntry = match serde_json::from_value(value) {
            Ok(e) => e,
            Err(e) => {
                warn!("{}: entry #{} skipped: {}", display, pos, e);
                continue;
            }
        };
        if let Err(e) = validate_entry(&entry) {
            warn!("{}: entry #{} skipped: {}", display, pos, e);
            continue;
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Build a corpus from the given partitions, in order.
pub fn load(sources: &[FaqSource], audit: &dyn AuditSink) -> FaqCorpus {
    let mut all = Vec::new();
    let mut failures = 0usize;
    for source in sources {
        match load_source(&source.path) {
            Ok(entries) => {
                audit.info(
                    &format!(
                        "FAQ 데이터 로드 성공: {} ({}개 항목)",
                        source.path.display(),
                        entries.len()
                    ),
                    Some(&json!({
                        "path": source.path.display().to_string(),
                        "label": source.label,
                        "count": entries.len(),
                    })),
                );
                all.extend(entries);
            }
            Err(e) => {
                failures += 1;
                metrics::inc_source_failures();
                audit.error(
                    &format!("FAQ 파일 로드 실패: {} ({})", source.path.display(), source.label),
                    Some(&e),
                );
            }
        }
    }
    audit.info(
        &format!("전체 FAQ 데이터 로드 완료: 총 {}개 항목", all.len()),
        None,
    );
    FaqCorpus::new(all).with_failures(failures)
}

/// Process-wide FAQ store handing out immutable snapshots
pub struct FaqRepository {
    sources: Vec<FaqSource>,
    policy: ReloadPolicy,
    cached: RwLock<Option<Arc<FaqCorpus>>>,
    audit: Arc<dyn AuditSink>,
}

impl FaqRepository {
    pub fn new(sources: Vec<FaqSource>, policy: ReloadPolicy, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            sources,
            policy,
            cached: RwLock::new(None),
            audit,
        }
    }

    /// Repository over an already-built corpus; used by tests and previews.
    pub fn from_corpus(corpus: FaqCorpus, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            sources: Vec::new(),
            policy: ReloadPolicy::Cached,
            cached: RwLock::new(Some(Arc::new(corpus))),
            audit,
        }
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn sources(&self) -> &[FaqSource] {
        &self.sources
    }

    /// Corpus for one interaction. The returned snapshot never changes underneath the
    /// caller, even if another interaction reloads concurrently.
    pub fn snapshot(&self) -> Arc<FaqCorpus> {
        if self.policy == ReloadPolicy::Cached {
            if let Some(c) = self
                .cached
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
            {
                return Arc::clone(c);
            }
        }
        self.reload()
    }

    /// Re-read every source and publish the result as the current snapshot.
    pub fn reload(&self) -> Arc<FaqCorpus> {
        let fresh = Arc::new(load(&self.sources, self.audit.as_ref()));
        debug!(
            "FAQ corpus reloaded: {} entries, {} failed sources",
            fresh.len(),
            fresh.failed_sources()
        );
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&fresh));
        fresh
    }

    /// Drop the cached snapshot; the next [`snapshot`](Self::snapshot) reloads.
    pub fn invalidate(&self) {
        if !self.sources.is_empty() {
            *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }
}
