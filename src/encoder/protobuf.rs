//! Protobuf encoding of a batch as a `logproto.PushRequest`.

use super::logproto::{
    EntryAdapter, PushRequest, StreamAdapter, millis_to_timestamp, timestamp_to_millis,
};
use super::{BatchEncoder, EncodingError};
use crate::buffer::Batch;
use crate::domain::{Stream, StreamEntry};
use bytes::Bytes;
use prost::Message;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufEncoder;

impl ProtobufEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the wire request. Every stream and entry is a fresh value; no
    /// scratch buffer is reused between iterations.
    pub fn to_push_request(&self, batch: &Batch) -> Result<PushRequest, EncodingError> {
        let streams = batch
            .streams()
            .iter()
            .enumerate()
            .map(|(index, stream)| self.to_stream_adapter(index, stream))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PushRequest { streams })
    }

    fn to_stream_adapter(
        &self,
        index: usize,
        stream: &Stream,
    ) -> Result<StreamAdapter, EncodingError> {
        if stream.labels.trim().is_empty() {
            return Err(EncodingError::MissingLabels { index });
        }

        let entries = stream
            .entries
            .iter()
            .map(|entry| EntryAdapter {
                timestamp: Some(millis_to_timestamp(entry.ts)),
                line: entry.line.clone(),
            })
            .collect();

        Ok(StreamAdapter {
            labels: stream.labels.clone(),
            entries,
        })
    }

    /// Decodes a push request body back into streams.
    pub fn decode(&self, body: &[u8]) -> Result<Vec<Stream>, EncodingError> {
        let request = PushRequest::decode(body)?;

        request
            .streams
            .into_iter()
            .enumerate()
            .map(|(stream_index, adapter)| -> Result<Stream, EncodingError> {
                let entries = adapter
                    .entries
                    .into_iter()
                    .enumerate()
                    .map(|(entry_index, entry)| -> Result<StreamEntry, EncodingError> {
                        let timestamp =
                            entry.timestamp.ok_or(EncodingError::MissingTimestamp {
                                stream: stream_index,
                                entry: entry_index,
                            })?;
                        Ok(StreamEntry {
                            ts: timestamp_to_millis(&timestamp),
                            line: entry.line,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Stream {
                    labels: adapter.labels,
                    entries,
                })
            })
            .collect()
    }
}

impl BatchEncoder for ProtobufEncoder {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn content_type(&self) -> &'static str {
        PROTOBUF_CONTENT_TYPE
    }

    fn encode(&self, batch: &Batch) -> Result<Bytes, EncodingError> {
        let request = self.to_push_request(batch)?;

        let mut buf = Vec::with_capacity(request.encoded_len());
        request.encode(&mut buf)?;

        Ok(Bytes::from(buf))
    }
}
