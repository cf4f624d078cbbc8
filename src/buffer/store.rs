use super::batch::{Batch, GroupingPolicy};
use crate::domain::LogEntry;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the live batch.
///
/// Producers append through any clone of the handle while the scheduler
/// flushes. Every operation holds the lock only for the in-memory change, so
/// appends never wait on encoding or network I/O.
#[derive(Clone)]
pub struct BatchStore {
    inner: Arc<Mutex<Batch>>,
    policy: GroupingPolicy,
}

impl BatchStore {
    pub fn new(policy: GroupingPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Batch::new(policy))),
            policy,
        }
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    pub fn append(&self, entry: LogEntry) {
        self.inner.lock().append(entry);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Number of top-level streams currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().entry_count()
    }

    /// Cloned view of the live batch, for inspection only.
    pub fn snapshot(&self) -> Batch {
        self.inner.lock().clone()
    }

    /// Swaps the live batch for an empty one and hands back the old batch.
    pub fn take(&self) -> Batch {
        let mut guard = self.inner.lock();
        std::mem::replace(&mut *guard, Batch::new(self.policy))
    }

    /// Puts a batch that failed to send back in front of whatever was
    /// appended since it was taken.
    pub fn restore(&self, snapshot: Batch) {
        let mut guard = self.inner.lock();
        let newer = std::mem::replace(&mut *guard, snapshot);
        guard.absorb(newer);
    }
}

impl std::fmt::Debug for BatchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock();
        f.debug_struct("BatchStore")
            .field("policy", &self.policy)
            .field("streams", &guard.len())
            .field("entries", &guard.entry_count())
            .finish()
    }
}
