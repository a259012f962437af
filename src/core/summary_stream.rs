//! SSE ingestion for the streaming summarize endpoint.
//!
//! The backend frames its response as newline-delimited `data:` records.
//! [`ingest`] consumes an arbitrary byte-chunk stream, reassembles records
//! across chunk boundaries, and reports domain events to a caller-supplied
//! sink until a terminal record, end-of-stream, or cancellation.

use futures_util::{Stream, StreamExt};
use memchr::memchr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{StreamPayload, SummaryMetadata};
use crate::core::error::SummarizeError;

/// One domain-level notification extracted from the response stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// An incremental piece of summary text.
    Fragment(String),
    /// A server-reported failure; terminates the stream.
    Error(String),
    /// Successful completion, with final metadata.
    Done(SummaryMetadata),
}

/// Terminal result of a summarization request.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Ordered concatenation of every fragment the stream delivered.
    pub text: String,
    pub metadata: SummaryMetadata,
}

/// Consume an SSE-framed byte stream and report events to `sink`.
///
/// Records may be split across chunks at any byte, including inside a
/// multi-byte UTF-8 sequence; bytes are buffered until a full line is
/// available, so the split point never affects the result. Lines without the
/// `data:` prefix and records that fail to parse are skipped.
///
/// Returns after the first error or done record, at end-of-stream (an error
/// if no terminal record was seen), or once `cancel` is triggered. The sink
/// is never invoked after cancellation, and the byte source is dropped on
/// every exit path.
pub async fn ingest<S, B, E, F>(
    mut chunks: S,
    fallback: SummaryMetadata,
    mut sink: F,
    cancel: &CancellationToken,
) -> Result<Summary, SummarizeError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(StreamEvent),
{
    let mut buffer: Vec<u8> = Vec::new();
    let mut text = String::new();

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(SummarizeError::Cancelled),
            next = chunks.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(|err| SummarizeError::transport(err.to_string()))?;
        buffer.extend_from_slice(chunk.as_ref());

        while let Some(newline) = memchr(b'\n', &buffer) {
            if cancel.is_cancelled() {
                return Err(SummarizeError::Cancelled);
            }
            let record = scan_line(&buffer[..newline]);
            buffer.drain(..=newline);
            if let Some(outcome) = apply_record(record, &mut text, &mut sink, &fallback) {
                return outcome;
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(SummarizeError::Cancelled);
    }

    // A terminal record without a trailing newline is still a record.
    if !buffer.is_empty() {
        let record = scan_line(&buffer);
        if let Some(outcome) = apply_record(record, &mut text, &mut sink, &fallback) {
            return outcome;
        }
    }

    Err(SummarizeError::StreamEndedUnexpectedly)
}

/// Extract a parsed record from one raw line, or `None` to skip it.
fn scan_line(raw: &[u8]) -> Option<StreamPayload> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(err) => {
            debug!(error = %err, "skipping stream line with invalid UTF-8");
            return None;
        }
    };

    let payload = line.strip_prefix("data:").map(str::trim_start)?;

    match serde_json::from_str::<StreamPayload>(payload) {
        Ok(record) if record.is_event() => Some(record),
        Ok(_) => {
            debug!(payload, "skipping record matching no known shape");
            None
        }
        Err(err) => {
            debug!(error = %err, "skipping malformed stream record");
            None
        }
    }
}

/// Fold one record into the running state. `Some` means a terminal outcome.
///
/// Checks run in the order error, content, done; a record carrying both
/// content and done appends the fragment and then completes the stream.
fn apply_record<F: FnMut(StreamEvent)>(
    record: Option<StreamPayload>,
    text: &mut String,
    sink: &mut F,
    fallback: &SummaryMetadata,
) -> Option<Result<Summary, SummarizeError>> {
    let record = record?;

    if let Some(message) = record.error {
        sink(StreamEvent::Error(message.clone()));
        return Some(Err(SummarizeError::Upstream(message)));
    }

    if let Some(content) = record.content {
        text.push_str(&content);
        sink(StreamEvent::Fragment(content));
    }

    if record.done {
        let metadata = record.metadata.unwrap_or_else(|| fallback.clone());
        sink(StreamEvent::Done(metadata.clone()));
        return Some(Ok(Summary {
            text: std::mem::take(text),
            metadata,
        }));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SummaryRequest;
    use crate::core::providers::Provider;
    use futures_util::stream;
    use std::convert::Infallible;

    fn request() -> SummaryRequest {
        SummaryRequest {
            url: "https://example.com".to_string(),
            llm_provider: Provider::OpenAi,
            api_key: "sk-test".to_string(),
            model_name: Some("gpt-4o-mini".to_string()),
            base_url: None,
        }
    }

    fn chunked(
        chunks: Vec<Vec<u8>>,
    ) -> impl Stream<Item = Result<Vec<u8>, Infallible>> + Unpin {
        stream::iter(chunks.into_iter().map(Ok::<Vec<u8>, Infallible>))
    }

    async fn run(chunks: Vec<Vec<u8>>) -> (Vec<StreamEvent>, Result<Summary, SummarizeError>) {
        let cancel = CancellationToken::new();
        let mut events = Vec::new();
        let outcome = ingest(
            chunked(chunks),
            request().fallback_metadata(),
            |event| events.push(event),
            &cancel,
        )
        .await;
        (events, outcome)
    }

    #[tokio::test]
    async fn fragments_concatenate_in_arrival_order() {
        let body = concat!(
            "data: {\"content\": \"A\"}\n\n",
            "data: {\"content\": \"B\"}\n\n",
            "data: {\"done\": true}\n\n",
        );
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        let summary = outcome.expect("stream should complete");
        assert_eq!(summary.text, "AB");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::Fragment("A".to_string()));
        assert_eq!(events[1], StreamEvent::Fragment("B".to_string()));
        assert!(matches!(events[2], StreamEvent::Done(_)));
    }

    #[tokio::test]
    async fn any_chunk_split_decodes_identically() {
        let body = concat!(
            "data: {\"content\": \"h\u{e9}llo \"}\n\n",
            "data: {\"content\": \"w\u{f6}rld \u{1f980}\"}\n\n",
            "data: {\"done\": true}\n\n",
        )
        .as_bytes();

        for split in 0..=body.len() {
            let (left, right) = body.split_at(split);
            let (_, outcome) = run(vec![left.to_vec(), right.to_vec()]).await;
            let summary = outcome.unwrap_or_else(|err| panic!("split at byte {split}: {err}"));
            assert_eq!(summary.text, "h\u{e9}llo w\u{f6}rld \u{1f980}");
        }
    }

    #[tokio::test]
    async fn spacing_after_the_prefix_is_optional() {
        let body = "data:{\"content\": \"tight\"}\ndata:{\"done\": true}\n";
        let (_, outcome) = run(vec![body.as_bytes().to_vec()]).await;
        assert_eq!(outcome.unwrap().text, "tight");
    }

    #[tokio::test]
    async fn error_record_stops_ingestion() {
        let body = concat!(
            "data: {\"content\": \"A\"}\n",
            "data: {\"content\": \"B\"}\n",
            "data: {\"error\": \"bad key\"}\n",
            "data: {\"content\": \"C\"}\n",
            "data: {\"done\": true}\n",
        );
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome, Err(SummarizeError::Upstream("bad key".to_string())));
        assert_eq!(
            events,
            vec![
                StreamEvent::Fragment("A".to_string()),
                StreamEvent::Fragment("B".to_string()),
                StreamEvent::Error("bad key".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_record_is_skipped() {
        let body = concat!(
            "data: {not json\n",
            "data: {\"content\": \"X\"}\n",
            "data: {\"done\": true}\n",
        );
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome.unwrap().text, "X");
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn non_record_lines_are_ignored() {
        let body = concat!(
            "\n",
            ": keepalive\n",
            "event: message\n",
            "data: {\"usage\": 5}\n",
            "data: {\"content\": \"X\"}\n",
            "data: {\"done\": true}\n",
        );
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome.unwrap().text, "X");
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn missing_metadata_falls_back_to_request_details() {
        let body = "data: {\"content\": \"X\"}\ndata: {\"done\": true}\n";
        let (_, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        let summary = outcome.unwrap();
        assert_eq!(summary.metadata.url, "https://example.com");
        assert_eq!(summary.metadata.title, "Summary Complete");
        assert_eq!(summary.metadata.provider, "openai");
        assert_eq!(summary.metadata.model, "gpt-4o-mini");
        assert_eq!(summary.metadata.processing_time, "Streamed");
    }

    #[tokio::test]
    async fn reported_metadata_wins_over_fallback() {
        let body = concat!(
            "data: {\"content\": \"X\"}\n",
            "data: {\"done\": true, \"metadata\": {\
                \"url\": \"https://example.com\", \
                \"title\": \"Example Domain\", \
                \"provider\": \"openai\", \
                \"model\": \"gpt-4o-mini\", \
                \"processing_time\": \"3.2 seconds\"}}\n",
        );
        let (_, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        let summary = outcome.unwrap();
        assert_eq!(summary.metadata.title, "Example Domain");
        assert_eq!(summary.metadata.processing_time, "3.2 seconds");
    }

    #[tokio::test]
    async fn end_of_stream_without_terminal_record() {
        let body = "data: {\"content\": \"A\"}\n";
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome, Err(SummarizeError::StreamEndedUnexpectedly));
        assert_eq!(events, vec![StreamEvent::Fragment("A".to_string())]);
    }

    #[tokio::test]
    async fn terminal_record_without_trailing_newline() {
        let body = "data: {\"content\": \"A\"}\ndata: {\"done\": true}";
        let (_, outcome) = run(vec![body.as_bytes().to_vec()]).await;
        assert_eq!(outcome.unwrap().text, "A");
    }

    #[tokio::test]
    async fn crlf_line_endings_are_tolerated() {
        let body = "data: {\"content\": \"A\"}\r\ndata: {\"done\": true}\r\n";
        let (_, outcome) = run(vec![body.as_bytes().to_vec()]).await;
        assert_eq!(outcome.unwrap().text, "A");
    }

    #[tokio::test]
    async fn content_and_done_in_one_record() {
        let body = "data: {\"content\": \"tail\", \"done\": true}\n";
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome.unwrap().text, "tail");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Fragment("tail".to_string()));
    }

    #[tokio::test]
    async fn error_takes_priority_within_a_record() {
        let body = "data: {\"content\": \"X\", \"error\": \"boom\"}\n";
        let (events, outcome) = run(vec![body.as_bytes().to_vec()]).await;

        assert_eq!(outcome, Err(SummarizeError::Upstream("boom".to_string())));
        assert_eq!(events, vec![StreamEvent::Error("boom".to_string())]);
    }

    #[tokio::test]
    async fn cancellation_stops_the_sink() {
        let body = concat!(
            "data: {\"content\": \"A\"}\n",
            "data: {\"content\": \"B\"}\n",
            "data: {\"done\": true}\n",
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut events = Vec::new();

        let outcome = ingest(
            chunked(vec![body.as_bytes().to_vec()]),
            request().fallback_metadata(),
            |event| {
                events.push(event);
                trigger.cancel();
            },
            &cancel,
        )
        .await;

        assert_eq!(outcome, Err(SummarizeError::Cancelled));
        assert_eq!(events, vec![StreamEvent::Fragment("A".to_string())]);
    }

    #[tokio::test]
    async fn pre_cancelled_token_emits_nothing() {
        let body = "data: {\"content\": \"A\"}\ndata: {\"done\": true}\n";
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut events = Vec::new();

        let outcome = ingest(
            chunked(vec![body.as_bytes().to_vec()]),
            request().fallback_metadata(),
            |event| events.push(event),
            &cancel,
        )
        .await;

        assert_eq!(outcome, Err(SummarizeError::Cancelled));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn mid_stream_read_failure_is_a_transport_error() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(b"data: {\"content\": \"A\"}\n".to_vec()),
            Err("connection reset by peer".to_string()),
        ];
        let cancel = CancellationToken::new();
        let mut events = Vec::new();

        let outcome = ingest(
            stream::iter(chunks),
            request().fallback_metadata(),
            |event| events.push(event),
            &cancel,
        )
        .await;

        match outcome {
            Err(SummarizeError::Transport { status, message }) => {
                assert_eq!(status, None);
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(events, vec![StreamEvent::Fragment("A".to_string())]);
    }
}
