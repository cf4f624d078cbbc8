pub mod client;
pub mod metrics;
pub mod transmission;

pub use client::{ClientConfig, ClientError, ConnectionStats, PUSH_PATH, PushClient};
pub use metrics::{FlushMetrics, MetricsCollector};
pub use transmission::{PushReceipt, Pusher, TransportError};
