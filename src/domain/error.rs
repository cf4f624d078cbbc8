use thiserror::Error;

/// Top-level error type for setting up and running the batcher.
///
/// Flush-time failures never reach this type: the scheduler absorbs them
/// into its backoff state. Only construction and startup errors surface here.
#[derive(Error, Debug)]
pub enum BatcherError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::app::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] crate::app::LoggingError),

    #[error("Client error: {0}")]
    Client(#[from] crate::sender::ClientError),

    #[error("Input error: {0}")]
    Input(#[from] std::io::Error),

    #[error("Scheduler task failed: {0}")]
    Scheduler(String),
}
