//! Batch encoders for the push API.
//!
//! An [`Encoding`] is chosen once from configuration; it fixes both the
//! encoder used on the flush path and the grouping policy of the batch.

pub mod json;
pub mod logproto;
pub mod protobuf;

pub use json::{JSON_CONTENT_TYPE, JsonEncoder};
pub use protobuf::{PROTOBUF_CONTENT_TYPE, ProtobufEncoder};

use crate::buffer::{Batch, GroupingPolicy};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Stream {index} has an empty label set")]
    MissingLabels { index: usize },
    #[error("Entry {entry} of stream {stream} has no timestamp")]
    MissingTimestamp { stream: usize, entry: usize },
    #[error("Protobuf encoding failed: {0}")]
    Protobuf(#[from] prost::EncodeError),
    #[error("Protobuf decoding failed: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns a batch snapshot into a request body. Implementations must not
/// keep state between calls.
pub trait BatchEncoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn content_type(&self) -> &'static str;
    fn encode(&self, batch: &Batch) -> Result<Bytes, EncodingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Protobuf,
    Json,
}

impl Encoding {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Encoding::Json } else { Encoding::Protobuf }
    }

    pub fn grouping(self) -> GroupingPolicy {
        match self {
            Encoding::Protobuf => GroupingPolicy::ByLabels,
            Encoding::Json => GroupingPolicy::PerAppend,
        }
    }

    pub fn encoder(self) -> Arc<dyn BatchEncoder> {
        match self {
            Encoding::Protobuf => Arc::new(ProtobufEncoder::new()),
            Encoding::Json => Arc::new(JsonEncoder::new()),
        }
    }
}
