use serde::{Deserialize, Serialize};

/// A single log line handed to the batcher by a producer.
///
/// `labels` is the serialized label set (for example `{job="api"}`) that
/// identifies the stream the line belongs to. `ts` is milliseconds since the
/// Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub labels: String,
    pub ts: i64,
    pub line: String,
}

impl LogEntry {
    pub fn new(labels: impl Into<String>, ts: i64, line: impl Into<String>) -> Self {
        Self {
            labels: labels.into(),
            ts,
            line: line.into(),
        }
    }

    /// Splits the entry into its label set and the `(ts, line)` pair.
    pub fn into_parts(self) -> (String, StreamEntry) {
        (
            self.labels,
            StreamEntry {
                ts: self.ts,
                line: self.line,
            },
        )
    }
}

/// One `(timestamp, line)` pair inside a [`Stream`].
///
/// Serialized with the producer field names (`ts`, `line`); only the
/// protobuf encoder renames them for the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub ts: i64,
    pub line: String,
}

/// A label set and the ordered lines collected for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub labels: String,
    pub entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn with_entry(labels: impl Into<String>, entry: StreamEntry) -> Self {
        Self {
            labels: labels.into(),
            entries: vec![entry],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
