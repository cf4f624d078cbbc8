// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Millisecond counters and durations stay in range
    clippy::cast_possible_wrap,       // Sub-second remainders always fit in i32
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. EncodingError in encoder module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::len_without_is_empty
)]

pub mod app;
pub mod buffer;
pub mod domain;
pub mod encoder;
pub mod reliability;
pub mod scheduler;
pub mod sender;

// Re-export main types for easy access
pub use app::{App, Config};
pub use buffer::{Batch, BatchStore, GroupingPolicy};
pub use domain::{BatcherError, LogEntry, Stream, StreamEntry};
pub use encoder::{BatchEncoder, Encoding, EncodingError};
pub use reliability::{BreakerState, CircuitBreaker};
pub use scheduler::{FlushError, FlushOutcome, Scheduler, SchedulerConfig, SchedulerHandle};
pub use sender::{ClientConfig, PushClient, Pusher, TransportError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
