use crate::domain::{LogEntry, Stream};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How appended entries are arranged into streams.
///
/// The protobuf push path groups lines by label set. The JSON push path
/// sends every append as its own stream, even when label sets repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingPolicy {
    ByLabels,
    PerAppend,
}

/// The pending, unsent accumulation of log data.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    streams: Vec<Stream>,
    policy: GroupingPolicy,
}

impl Batch {
    pub fn new(policy: GroupingPolicy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            streams: Vec::new(),
            policy,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Number of top-level streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Number of lines across all streams.
    pub fn entry_count(&self) -> usize {
        self.streams.iter().map(Stream::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }

    pub fn append(&mut self, entry: LogEntry) {
        let (labels, stream_entry) = entry.into_parts();

        match self.policy {
            GroupingPolicy::ByLabels => {
                match self.streams.iter_mut().find(|s| s.labels == labels) {
                    Some(stream) => stream.entries.push(stream_entry),
                    None => self.streams.push(Stream::with_entry(labels, stream_entry)),
                }
            }
            GroupingPolicy::PerAppend => {
                self.streams.push(Stream::with_entry(labels, stream_entry));
            }
        }
    }

    /// Appends every stream of `newer` after the current contents.
    ///
    /// Under `ByLabels` the lines of a known label set are appended to the
    /// existing stream, so per-label arrival order is kept.
    pub fn absorb(&mut self, newer: Batch) {
        for stream in newer.streams {
            match self.policy {
                GroupingPolicy::ByLabels => {
                    match self.streams.iter_mut().find(|s| s.labels == stream.labels) {
                        Some(existing) => existing.entries.extend(stream.entries),
                        None => self.streams.push(stream),
                    }
                }
                GroupingPolicy::PerAppend => self.streams.push(stream),
            }
        }
    }
}
