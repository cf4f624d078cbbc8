use super::{BatchEncoder, EncodingError};
use crate::buffer::Batch;
use crate::domain::Stream;
use bytes::Bytes;
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json";

// Capacity hints for the output buffer
const MAX_SAFE_BUFFER_SIZE: usize = 100 * 1024 * 1024; // 100MB
const ESTIMATED_ENTRY_SIZE: usize = 128; // bytes per entry
const ENVELOPE_OVERHEAD: usize = 16; // {"streams":[]}

#[derive(Serialize)]
struct JsonPushBody<'a> {
    streams: &'a [Stream],
}

/// Serializes the batch as-is: `{"streams":[{"labels":..,"entries":[{"ts":..,"line":..}]}]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate_encoded_size(&self, batch: &Batch) -> usize {
        estimate_for_entries(batch.entry_count())
    }
}

fn estimate_for_entries(entries: usize) -> usize {
    entries
        .saturating_mul(ESTIMATED_ENTRY_SIZE)
        .saturating_add(ENVELOPE_OVERHEAD)
        .min(MAX_SAFE_BUFFER_SIZE)
}

impl BatchEncoder for JsonEncoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn encode(&self, batch: &Batch) -> Result<Bytes, EncodingError> {
        let mut buffer = Vec::with_capacity(self.estimate_encoded_size(batch));
        serde_json::to_writer(
            &mut buffer,
            &JsonPushBody {
                streams: batch.streams(),
            },
        )?;

        Ok(Bytes::from(buffer))
    }
}
