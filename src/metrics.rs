//! Process-wide interaction counters, logged periodically by the server.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

static INTERACTIONS: AtomicU64 = AtomicU64::new(0);
static REPLIES: AtomicU64 = AtomicU64::new(0);
static MALFORMED: AtomicU64 = AtomicU64::new(0);
static STALE: AtomicU64 = AtomicU64::new(0);
static SOURCE_FAILURES: AtomicU64 = AtomicU64::new(0);
static ACKS: AtomicU64 = AtomicU64::new(0);

static ACTION_COUNTERS: OnceLock<Mutex<HashMap<String, u64>>> = OnceLock::new();

pub fn inc_interactions() {
    INTERACTIONS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_replies() {
    REPLIES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_malformed() {
    MALFORMED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_stale() {
    STALE.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_source_failures() {
    SOURCE_FAILURES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_acks() {
    ACKS.fetch_add(1, Ordering::Relaxed);
}

fn action_counter_lock() -> &'static Mutex<HashMap<String, u64>> {
    ACTION_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count one handled interaction of the given kind (`course_selection`, ...).
pub fn record_action(kind: &str) -> u64 {
    let mut guard = action_counter_lock()
        .lock()
        .expect("action counter mutex poisoned");
    let counter = guard.entry(kind.to_string()).or_default();
    *counter = counter.saturating_add(1);
    *counter
}

pub fn action_counters_snapshot() -> HashMap<String, u64> {
    action_counter_lock()
        .lock()
        .expect("action counter mutex poisoned")
        .clone()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub interactions: u64,
    pub replies: u64,
    pub malformed: u64,
    pub stale: u64,
    pub source_failures: u64,
    pub acks: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        interactions: INTERACTIONS.load(Ordering::Relaxed),
        replies: REPLIES.load(Ordering::Relaxed),
        malformed: MALFORMED.load(Ordering::Relaxed),
        stale: STALE.load(Ordering::Relaxed),
        source_failures: SOURCE_FAILURES.load(Ordering::Relaxed),
        acks: ACKS.load(Ordering::Relaxed),
    }
}
