//! Event de-duplication
//!
//! The push transport may redeliver events on reconnect, and several
//! screens receive the same broadcast. Keys are retained for a bounded
//! window instead of forever; within the window the at-most-once-per-key
//! contract holds, and anything older has long been superseded by a
//! snapshot reload.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);

/// Guards against processing the same push event twice
#[derive(Debug)]
pub struct EventDeduplicator {
    seen: HashMap<String, Instant>,
    retention: Duration,
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDeduplicator {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            seen: HashMap::new(),
            retention,
        }
    }

    /// Has this key been marked within the retention window?
    pub fn seen(&self, key: &str) -> bool {
        self.seen
            .get(key)
            .is_some_and(|at| at.elapsed() < self.retention)
    }

    /// Record the key and evict anything past the retention window
    pub fn mark(&mut self, key: impl Into<String>) {
        let retention = self.retention;
        self.seen.retain(|_, at| at.elapsed() < retention);
        self.seen.insert(key.into(), Instant::now());
    }

    /// Returns true exactly once per key within the window
    pub fn check_and_mark(&mut self, key: &str) -> bool {
        if self.seen(key) {
            return false;
        }
        self.mark(key);
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
