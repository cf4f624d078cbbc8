use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushMetrics {
    pub flushes_attempted: u64,
    pub flushes_skipped: u64,
    pub pushes_succeeded: u64,
    pub pushes_failed: u64,
    pub entries_sent: u64,
    pub bytes_sent: u64,
    pub last_push_latency: Duration,
}

/// Counters for the flush loop. Cloning shares the counters.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    flushes_attempted: Arc<AtomicU64>,
    flushes_skipped: Arc<AtomicU64>,
    pushes_succeeded: Arc<AtomicU64>,
    pushes_failed: Arc<AtomicU64>,
    entries_sent: Arc<AtomicU64>,
    bytes_sent: Arc<AtomicU64>,
    last_push_latency_ms: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skipped(&self) {
        self.flushes_attempted.fetch_add(1, Ordering::Relaxed);
        self.flushes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, entries: usize, bytes: usize, latency: Duration) {
        self.flushes_attempted.fetch_add(1, Ordering::Relaxed);
        self.pushes_succeeded.fetch_add(1, Ordering::Relaxed);
        self.entries_sent.fetch_add(entries as u64, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.last_push_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.flushes_attempted.fetch_add(1, Ordering::Relaxed);
        self.pushes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FlushMetrics {
        FlushMetrics {
            flushes_attempted: self.flushes_attempted.load(Ordering::Relaxed),
            flushes_skipped: self.flushes_skipped.load(Ordering::Relaxed),
            pushes_succeeded: self.pushes_succeeded.load(Ordering::Relaxed),
            pushes_failed: self.pushes_failed.load(Ordering::Relaxed),
            entries_sent: self.entries_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            last_push_latency: Duration::from_millis(
                self.last_push_latency_ms.load(Ordering::Relaxed),
            ),
        }
    }
}
