pub mod config;
pub mod input;
pub mod logging_system;
pub mod shutdown;

pub use config::{Config, ConfigError, LogLevel};
pub use input::{LineParser, forward_lines};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};
pub use shutdown::{spawn_signal_listener, wait_for_signal};

use crate::domain::BatcherError;
use crate::scheduler::Scheduler;
use crate::sender::PushClient;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct App {
    config: Config,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, BatcherError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_config(Config::from_args(args)?))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ships stdin until EOF or a shutdown signal, then stops the flush loop.
    pub async fn run(self) -> Result<(), BatcherError> {
        let config = self.config;

        info!("Starting loki-batcher v{}", crate::VERSION);
        info!(
            "Configuration: host={}, encoding={:?}, interval={:?}",
            config.host,
            config.encoding(),
            config.flush_interval
        );

        let client = PushClient::new(config.client_config())?;
        info!("Pushing to {}", client.push_url());

        let handle = Scheduler::new(config.scheduler_config(), client).spawn();

        let shutdown = CancellationToken::new();
        spawn_signal_listener(shutdown.clone());

        let parser = LineParser::new(config.default_labels.clone());
        let stdin = BufReader::new(tokio::io::stdin());
        let forwarded = forward_lines(stdin, handle.store(), &parser, &shutdown).await;
        shutdown.cancel();

        let scheduler = handle.stop().await?;
        let metrics = scheduler.metrics();
        info!(
            "loki-batcher stopped: {} entries sent in {} pushes, {} failed pushes, {} entries unsent",
            metrics.entries_sent,
            metrics.pushes_succeeded,
            metrics.pushes_failed,
            scheduler.store().entry_count()
        );

        forwarded?;
        Ok(())
    }
}

pub async fn main() -> anyhow::Result<()> {
    let app = App::from_args(std::env::args_os())?;
    setup_logging(app.config())?;

    app.run().await?;
    Ok(())
}
