//! Periodic flush loop.
//!
//! Each cycle takes the live batch out of the store, encodes it and pushes
//! it. A successful push drops the taken batch. Any failure puts it back in
//! front of entries appended during the attempt and switches the wait to the
//! circuit breaker interval until a later push succeeds.

pub mod handle;

pub use handle::SchedulerHandle;

use crate::buffer::{Batch, BatchStore};
use crate::domain::LogEntry;
use crate::encoder::{BatchEncoder, Encoding, EncodingError};
use crate::reliability::{
    BreakerState, CIRCUIT_BREAKER_INTERVAL, CircuitBreaker, DEFAULT_FLUSH_INTERVAL,
};
use crate::sender::{FlushMetrics, MetricsCollector, Pusher, TransportError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub encoding: Encoding,
    pub flush_interval: Duration,
    pub breaker_interval: Duration,
    /// Attempt one last flush when the loop is stopped.
    pub flush_on_shutdown: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Protobuf,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            breaker_interval: CIRCUIT_BREAKER_INTERVAL,
            flush_on_shutdown: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum FlushError {
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug)]
pub enum FlushOutcome {
    /// Nothing was pending; no request was made.
    Skipped,
    Sent {
        batch_id: String,
        entries: usize,
        bytes: usize,
        latency: Duration,
    },
    /// The batch is back in the store.
    Failed {
        batch_id: String,
        entries: usize,
        error: FlushError,
    },
}

impl FlushOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, FlushOutcome::Failed { .. })
    }
}

pub struct Scheduler<P> {
    store: BatchStore,
    encoder: Arc<dyn BatchEncoder>,
    pusher: P,
    breaker: CircuitBreaker,
    metrics: MetricsCollector,
    flush_on_shutdown: bool,
}

impl<P: Pusher> Scheduler<P> {
    pub fn new(config: SchedulerConfig, pusher: P) -> Self {
        Self {
            store: BatchStore::new(config.encoding.grouping()),
            encoder: config.encoding.encoder(),
            pusher,
            breaker: CircuitBreaker::with_breaker_interval(
                config.flush_interval,
                config.breaker_interval,
            ),
            metrics: MetricsCollector::new(),
            flush_on_shutdown: config.flush_on_shutdown,
        }
    }

    /// Shared handle producers append through.
    pub fn store(&self) -> BatchStore {
        self.store.clone()
    }

    pub fn append(&self, entry: LogEntry) {
        self.store.append(entry);
    }

    pub fn state(&self) -> BreakerState {
        self.breaker.state()
    }

    pub fn current_interval(&self) -> Duration {
        self.breaker.current_interval()
    }

    pub fn metrics(&self) -> FlushMetrics {
        self.metrics.snapshot()
    }

    pub async fn flush(&mut self) -> FlushOutcome {
        let batch = self.store.take();

        if batch.is_empty() {
            self.metrics.record_skipped();
            if self.breaker.record_success() {
                info!(
                    "Nothing pending, leaving backoff; flush interval back to {:?}",
                    self.breaker.current_interval()
                );
            }
            return FlushOutcome::Skipped;
        }

        let batch_id = batch.id().to_string();
        let entries = batch.entry_count();

        debug!(
            "Flushing batch {} ({} streams, {} entries, encoding={})",
            batch_id,
            batch.len(),
            entries,
            self.encoder.name()
        );

        let body = match self.encoder.encode(&batch) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to encode batch {}: {}", batch_id, e);
                return self.fail(batch, FlushError::Encoding(e));
            }
        };

        let result = self.pusher.push(body, self.encoder.content_type()).await;

        match result {
            Ok(receipt) => {
                drop(batch);
                self.metrics
                    .record_success(entries, receipt.bytes_sent, receipt.latency);

                info!(
                    "Pushed batch {} ({} entries, {} bytes) in {:?}",
                    batch_id, entries, receipt.bytes_sent, receipt.latency
                );
                if self.breaker.record_success() {
                    info!(
                        "Push succeeded, leaving backoff; flush interval back to {:?}",
                        self.breaker.current_interval()
                    );
                }

                FlushOutcome::Sent {
                    batch_id,
                    entries,
                    bytes: receipt.bytes_sent,
                    latency: receipt.latency,
                }
            }
            Err(e) => {
                warn!("Push of batch {} failed: {}", batch_id, e.diagnostic());
                self.fail(batch, FlushError::Transport(e))
            }
        }
    }

    fn fail(&mut self, batch: Batch, error: FlushError) -> FlushOutcome {
        let batch_id = batch.id().to_string();
        let entries = batch.entry_count();

        self.store.restore(batch);
        self.metrics.record_failure();

        if self.breaker.record_failure() {
            warn!(
                "Entering backoff; next flush in {:?} ({} entries retained)",
                self.breaker.current_interval(),
                self.store.entry_count()
            );
        }

        FlushOutcome::Failed {
            batch_id,
            entries,
            error,
        }
    }

    /// Runs flush cycles until `cancel` fires, then hands the scheduler back.
    pub async fn run(mut self, cancel: CancellationToken) -> Self {
        info!(
            "Starting flush loop (encoding={}, interval={:?})",
            self.encoder.name(),
            self.breaker.configured_interval()
        );

        loop {
            self.flush().await;

            let wait = self.breaker.current_interval();
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        if self.flush_on_shutdown && !self.store.is_empty() {
            info!(
                "Flushing {} pending entries before shutdown",
                self.store.entry_count()
            );
            if let FlushOutcome::Failed { entries, error, .. } = self.flush().await {
                warn!(
                    "Final flush failed, {} entries left unsent: {}",
                    entries, error
                );
            }
        }

        info!("Flush loop stopped");
        self
    }
}

impl<P: Pusher + 'static> Scheduler<P> {
    /// Runs the flush loop on a tokio task.
    pub fn spawn(self) -> SchedulerHandle<P> {
        let cancel = CancellationToken::new();
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let join = tokio::spawn(self.run(cancel.clone()));

        SchedulerHandle::new(store, metrics, cancel, join)
    }
}
