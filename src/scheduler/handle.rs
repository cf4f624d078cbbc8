use super::Scheduler;
use crate::buffer::BatchStore;
use crate::domain::{BatcherError, LogEntry};
use crate::sender::{FlushMetrics, MetricsCollector};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Handle to a spawned flush loop.
pub struct SchedulerHandle<P> {
    store: BatchStore,
    metrics: MetricsCollector,
    cancel: CancellationToken,
    join: JoinHandle<Scheduler<P>>,
}

impl<P> SchedulerHandle<P> {
    pub(super) fn new(
        store: BatchStore,
        metrics: MetricsCollector,
        cancel: CancellationToken,
        join: JoinHandle<Scheduler<P>>,
    ) -> Self {
        Self {
            store,
            metrics,
            cancel,
            join,
        }
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    pub fn append(&self, entry: LogEntry) {
        self.store.append(entry);
    }

    pub fn metrics(&self) -> FlushMetrics {
        self.metrics.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signals the loop to stop and waits for it, including the final flush.
    pub async fn stop(self) -> Result<Scheduler<P>, BatcherError> {
        info!("Stopping flush loop");
        self.cancel.cancel();
        self.join
            .await
            .map_err(|e| BatcherError::Scheduler(e.to_string()))
    }
}
