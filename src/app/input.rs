use crate::buffer::BatchStore;
use crate::domain::LogEntry;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Deserialize)]
struct InputLine {
    labels: Option<String>,
    ts: Option<i64>,
    line: String,
}

/// Turns raw input lines into entries.
///
/// A line holding a JSON object with a `line` field is taken as an entry
/// (`labels` and `ts` optional; blank `labels` count as missing). Anything
/// else is sent verbatim under the default label set.
#[derive(Debug, Clone)]
pub struct LineParser {
    default_labels: String,
}

impl LineParser {
    pub fn new(default_labels: impl Into<String>) -> Self {
        Self {
            default_labels: default_labels.into(),
        }
    }

    pub fn parse(&self, raw: &str, now_ms: i64) -> Option<LogEntry> {
        let trimmed = raw.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return None;
        }

        if trimmed.trim_start().starts_with('{')
            && let Ok(input) = serde_json::from_str::<InputLine>(trimmed)
        {
            return Some(LogEntry {
                labels: input
                    .labels
                    .filter(|labels| !labels.trim().is_empty())
                    .unwrap_or_else(|| self.default_labels.clone()),
                ts: input.ts.unwrap_or(now_ms),
                line: input.line,
            });
        }

        Some(LogEntry::new(self.default_labels.clone(), now_ms, trimmed))
    }
}

/// Appends every line of `reader` to `store` until EOF or cancellation.
/// Returns the number of entries appended.
pub async fn forward_lines<R>(
    reader: R,
    store: &BatchStore,
    parser: &LineParser,
    cancel: &CancellationToken,
) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0u64;

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = lines.next_line() => next?,
        };

        let Some(raw) = next else {
            info!("Input closed after {} entries", forwarded);
            break;
        };

        match parser.parse(&raw, chrono::Utc::now().timestamp_millis()) {
            Some(entry) => {
                store.append(entry);
                forwarded += 1;
            }
            None => debug!("Skipping blank input line"),
        }
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::GroupingPolicy;
    use crate::encoder::{BatchEncoder, ProtobufEncoder};

    #[test]
    fn test_json_line_becomes_entry() {
        let parser = LineParser::new("{job=\"default\"}");
        let entry = parser
            .parse(r#"{"labels":"{job=\"api\"}","ts":100,"line":"x"}"#, 999)
            .unwrap();

        assert_eq!(entry, LogEntry::new("{job=\"api\"}", 100, "x"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parser = LineParser::new("{job=\"default\"}");
        let entry = parser.parse(r#"{"line":"only a line"}"#, 999).unwrap();

        assert_eq!(entry, LogEntry::new("{job=\"default\"}", 999, "only a line"));
    }

    #[test]
    fn test_blank_labels_use_default_set() {
        let parser = LineParser::new("{job=\"default\"}");

        let empty = parser.parse(r#"{"labels":"","line":"x"}"#, 1).unwrap();
        assert_eq!(empty.labels, "{job=\"default\"}");

        let spaces = parser.parse(r#"{"labels":"   ","line":"y"}"#, 1).unwrap();
        assert_eq!(spaces.labels, "{job=\"default\"}");
    }

    #[test]
    fn test_parsed_lines_always_encode() {
        let parser = LineParser::new("{job=\"default\"}");
        let store = BatchStore::new(GroupingPolicy::ByLabels);

        for raw in [
            "healthy",
            r#"{"labels":"","line":"x"}"#,
            r#"{"labels":"{job=\"api\"}","line":"y"}"#,
        ] {
            store.append(parser.parse(raw, 1).unwrap());
        }

        let batch = store.snapshot();
        assert_eq!(batch.entry_count(), 3);
        assert!(ProtobufEncoder::new().encode(&batch).is_ok());
    }

    #[test]
    fn test_plain_text_and_blank_lines() {
        let parser = LineParser::new("{job=\"default\"}");

        let entry = parser.parse("GET /health 200\r\n", 5).unwrap();
        assert_eq!(entry.line, "GET /health 200");
        assert_eq!(entry.labels, "{job=\"default\"}");

        assert!(parser.parse("   ", 5).is_none());
        assert_eq!(parser.parse("{not json", 5).unwrap().line, "{not json");
    }

    #[tokio::test]
    async fn test_forward_lines_until_eof() {
        let input: &[u8] = b"first\n\n{\"labels\":\"{job=\\\"b\\\"}\",\"line\":\"second\"}\nthird\n";
        let store = BatchStore::new(GroupingPolicy::ByLabels);
        let parser = LineParser::new("{job=\"a\"}");

        let forwarded = forward_lines(input, &store, &parser, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(forwarded, 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entry_count(), 3);
    }
}
