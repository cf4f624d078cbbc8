//! Domain layer for loki-batcher.
//!
//! Contains the canonical types shared across all modules:
//! - `LogEntry`: what producers append
//! - `Stream` / `StreamEntry`: the batched, label-grouped form
//! - `BatcherError`: Top-level error type

pub mod error;
pub mod log_entry;

pub use error::BatcherError;
pub use log_entry::{LogEntry, Stream, StreamEntry};
