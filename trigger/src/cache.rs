//! Deduplication of stage-completion events.

use data_types::{EventKind, ExtractDate};
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use std::fmt::Debug;

/// Records which `(date, event)` pairs have already been routed.
///
/// Process-local by design: the cache is lost on restart and explicitly
/// purgeable. A multi-replica deployment would back this trait with a small
/// external key-value store instead.
pub trait CompletionCache: Debug + Send + Sync {
    /// Record `(date, event)`. Returns `false` if the pair was already
    /// present, in which case the caller must not forward it again.
    fn insert(&self, date: &ExtractDate, event: EventKind) -> bool;

    /// Forget everything.
    fn purge(&self);
}

/// An in-memory [`CompletionCache`] backed by a hashmap protected with a
/// mutex, so check-and-insert is atomic per call.
#[derive(Debug, Default)]
pub struct MemoryCompletionCache {
    entries: Mutex<HashMap<ExtractDate, HashSet<EventKind>>>,
}

impl MemoryCompletionCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompletionCache for MemoryCompletionCache {
    fn insert(&self, date: &ExtractDate, event: EventKind) -> bool {
        let mut entries = self.entries.lock();
        entries.entry(date.clone()).or_default().insert(event)
    }

    fn purge(&self) {
        self.entries.lock().clear()
    }
}
