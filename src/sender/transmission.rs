use super::PushClient;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

// Longest response body kept for diagnostics
const MAX_ERROR_BODY_CHARS: usize = 4096;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Push rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Push timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err)
        }
    }
}

impl TransportError {
    /// Response body (or underlying cause) for operator logs.
    pub fn diagnostic(&self) -> String {
        match self {
            TransportError::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushReceipt {
    pub status_code: u16,
    pub bytes_sent: usize,
    pub latency: Duration,
}

/// Ships one encoded body to the push endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait Pusher: Send + Sync {
    fn push(
        &self,
        body: Bytes,
        content_type: &'static str,
    ) -> impl Future<Output = Result<PushReceipt, TransportError>> + Send;
}

impl Pusher for PushClient {
    async fn push(
        &self,
        body: Bytes,
        content_type: &'static str,
    ) -> Result<PushReceipt, TransportError> {
        let start = Instant::now();
        let bytes_sent = body.len();

        debug!("Pushing {} bytes ({}) to {}", bytes_sent, content_type, self.push_url());

        let content_type = HeaderValue::from_str(content_type)
            .map_err(|e| TransportError::InvalidHeaderValue(format!("Invalid content type: {e}")))?;

        let result = self
            .client
            .post(self.push_url().clone())
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                return Err(e.into());
            }
        };

        let latency = start.elapsed();
        let status = response.status();
        self.stats.record_request(status.is_success(), latency);

        if status.is_success() {
            return Ok(PushReceipt {
                status_code: status.as_u16(),
                bytes_sent,
                latency,
            });
        }

        let body = match response.text().await {
            Ok(text) => truncate_body(text),
            Err(e) => {
                warn!("Failed to read push error response body: {}", e);
                String::new()
            }
        };

        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn truncate_body(body: String) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body
    } else {
        let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}
