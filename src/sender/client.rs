use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Path of the push API, appended to the configured host.
pub const PUSH_PATH: &str = "/api/prom/push";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:3100".to_string(),
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("loki-batcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
}

#[derive(Debug)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self, success: bool, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// HTTP client bound to one push endpoint.
#[derive(Debug, Clone)]
pub struct PushClient {
    pub(crate) client: Client,
    pub(crate) config: ClientConfig,
    push_url: Url,
    pub(crate) stats: Arc<ClientStats>,
}

impl PushClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let push_url = push_url(&config.host)?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            push_url,
            stats: Arc::new(ClientStats::new()),
        })
    }

    pub fn push_url(&self) -> &Url {
        &self.push_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        let total_requests = self.stats.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.stats.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        ConnectionStats {
            total_requests,
            successful_requests: self.stats.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.stats.failed_requests.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

/// Resolves `{host}/api/prom/push`, keeping any path prefix on the host.
pub fn push_url(host: &str) -> Result<Url, ClientError> {
    let mut url: Url = host
        .parse()
        .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid host URL '{host}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidConfiguration(format!(
            "Host URL '{host}' cannot carry a path"
        )));
    }

    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}{PUSH_PATH}"));
    Ok(url)
}
