//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! This module turns the raw byte stream of a streamed chat completion into
//! a stream of [`ChatCompletionChunk`] values.  The service sends data-only
//! events terminated by `data: [DONE]`.

use std::error;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::observability::{STREAM_BYTES, STREAM_CHUNKS, STREAM_ERRORS};
use crate::types::{ChatCompletionChunk, ErrorResponse};
use crate::{Error, Result};

/// End-of-stream sentinel sent as the final event's data.
const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of parsing one event block.
#[derive(Debug)]
enum SseEvent {
    /// A chunk or a per-event error.
    Item(Result<ChatCompletionChunk>),
    /// The `[DONE]` sentinel.
    Done,
    /// Comments, keep-alives, and events without data.
    Skip,
}

/// Process a stream of bytes into a stream of chat-completion chunks.
///
/// Transport and encoding errors end the stream after being yielded.  An
/// event that fails to parse yields an error and decoding continues with the
/// next event.
pub fn process_sse<S, E>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin + Send + 'static,
    E: error::Error + Send + Sync + 'static,
{
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    stream::unfold(
        (stream, String::new(), Vec::new(), false),
        move |(mut stream, mut buffer, mut pending, finished)| async move {
            if finished {
                return None;
            }
            loop {
                if let Some(event) = extract_event(&mut buffer) {
                    match event {
                        SseEvent::Item(item) => {
                            record(&item);
                            return Some((item, (stream, buffer, pending, false)));
                        }
                        SseEvent::Done => return None,
                        SseEvent::Skip => continue,
                    }
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        STREAM_BYTES.count(bytes.len() as u64);
                        if let Err(err) = decode_utf8(&mut pending, &bytes, &mut buffer) {
                            STREAM_ERRORS.click();
                            return Some((Err(err), (stream, buffer, pending, true)));
                        }
                    }
                    Some(Err(err)) => {
                        STREAM_ERRORS.click();
                        return Some((Err(err), (stream, buffer, pending, true)));
                    }
                    None => {
                        if !pending.is_empty() {
                            STREAM_ERRORS.click();
                            let err = Error::encoding("Stream ended inside a UTF-8 sequence", None);
                            return Some((Err(err), (stream, buffer, pending, true)));
                        }
                        // A final event may arrive without its blank-line terminator.
                        let tail = std::mem::take(&mut buffer);
                        return match parse_event(&tail) {
                            SseEvent::Item(item) => {
                                record(&item);
                                Some((item, (stream, buffer, pending, true)))
                            }
                            SseEvent::Done | SseEvent::Skip => None,
                        };
                    }
                }
            }
        },
    )
}

fn record(item: &Result<ChatCompletionChunk>) {
    if item.is_ok() {
        STREAM_CHUNKS.click();
    } else {
        STREAM_ERRORS.click();
    }
}

/// Append `bytes` to `buffer`, holding back an incomplete trailing UTF-8
/// sequence in `pending` until the rest of it arrives.
fn decode_utf8(pending: &mut Vec<u8>, bytes: &[u8], buffer: &mut String) -> Result<()> {
    pending.extend_from_slice(bytes);
    let valid = match std::str::from_utf8(pending.as_slice()) {
        Ok(_) => pending.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(err) => {
            return Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {err}"),
                Some(Box::new(err)),
            ));
        }
    };
    let text = std::str::from_utf8(&pending[..valid])?;
    buffer.push_str(text);
    pending.drain(..valid);
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }
    Ok(())
}

/// Remove the first complete SSE event from the front of `buffer`.
///
/// Events are delimited by a blank line.
fn extract_event(buffer: &mut String) -> Option<SseEvent> {
    let end = buffer.find("\n\n")?;
    let event = parse_event(&buffer[..end]);
    buffer.drain(..end + 2);
    Some(event)
}

/// Parse the lines of one event block.
fn parse_event(event_text: &str) -> SseEvent {
    let mut data: Option<String> = None;
    for line in event_text.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field != "data" {
            continue;
        }
        match &mut data {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => data = Some(value.to_string()),
        }
    }

    match data.as_deref().map(str::trim) {
        None | Some("") => SseEvent::Skip,
        Some(DONE_SENTINEL) => SseEvent::Done,
        Some(payload) => SseEvent::Item(parse_payload(payload)),
    }
}

/// Parse an event payload, which is either a chunk or an error object.
fn parse_payload(payload: &str) -> Result<ChatCompletionChunk> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        )
    })?;

    if value.get("error").is_some() {
        let response: ErrorResponse = serde_json::from_value(value).map_err(|e| {
            Error::serialization(
                format!("Failed to parse stream error: {e}"),
                Some(Box::new(e)),
            )
        })?;
        let error_type = response
            .error
            .label()
            .unwrap_or_else(|| "stream_error".to_string());
        let message = response
            .error
            .message
            .unwrap_or_else(|| payload.to_string());
        // The response already succeeded; an in-stream error carries no status.
        return Err(Error::streaming(format!("{error_type}: {message}"), None));
    }

    serde_json::from_value(value).map_err(|e| {
        Error::serialization(
            format!("Failed to parse chunk: {e}"),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> + Unpin + Send + 'static {
        stream::iter(
            chunks
                .into_iter()
                .map(|chunk| Ok(Bytes::from_static(chunk)))
                .collect::<Vec<_>>(),
        )
    }

    fn content(chunk: &ChatCompletionChunk) -> String {
        chunk
            .content_parts()
            .iter()
            .filter_map(|part| part.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn parse_single_chunk() {
        let data: &[u8] = b"data: {\"id\":\"c\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "Hi");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn done_ends_stream() {
        let data: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\ndata: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "a");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handle_split_event() {
        let chunk1: &[u8] = b"data: {\"choices\":[{\"delta\":";
        let chunk2: &[u8] = b"{\"content\":\"split\"}}]}\n";
        let chunk3: &[u8] = b"\ndata: [DONE]\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![chunk1, chunk2, chunk3])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "split");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handle_crlf_and_comments() {
        let data: &[u8] = b": keep-alive\r\n\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n\r\ndata: [DONE]\r\n\r\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "x");
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn handle_split_utf8() {
        // "é" is 0xC3 0xA9; split it across two network chunks.
        let chunk1: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"caf\xC3";
        let chunk2: &[u8] = b"\xA9\"}}]}\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![chunk1, chunk2])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "café");
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error() {
        let data: &[u8] = b"data: \xFF\xFE\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let event = sse_stream.next().await.unwrap();
        assert!(matches!(event, Err(Error::Encoding { .. })));
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn error_payload_becomes_streaming_error() {
        let data: &[u8] =
            b"data: {\"error\":{\"code\":\"content_filter\",\"message\":\"filtered\"}}\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let event = sse_stream.next().await.unwrap();
        match event {
            Err(err) => {
                assert!(err.is_streaming());
                assert_eq!(err.status_code(), None);
                assert!(!err.is_server_error());
                assert_eq!(err.to_string(), "Streaming error: content_filter: filtered");
            }
            Ok(chunk) => panic!("expected an error, got {chunk:?}"),
        }
    }

    #[tokio::test]
    async fn burst_of_events_in_one_read() {
        let mut data = String::new();
        for i in 0..2000 {
            data.push_str(&format!(
                "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{i} \"}}}}]}}\n\n"
            ));
        }
        data.push_str("data: [DONE]\n\n");
        let items = vec![Ok::<_, io::Error>(Bytes::from(data))];
        let mut sse_stream = Box::pin(process_sse(stream::iter(items)));

        let mut received = 0;
        while let Some(chunk) = sse_stream.next().await {
            assert_eq!(content(&chunk.unwrap()), format!("{received} "));
            received += 1;
        }
        assert_eq!(received, 2000);
    }

    #[tokio::test]
    async fn handle_malformed_event() {
        let data: &[u8] = b"data: not json\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let event = sse_stream.next().await.unwrap();
        assert!(matches!(event, Err(Error::Serialization { .. })));
        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "ok");
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let items: Vec<std::result::Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            )),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n\n",
            )),
        ];
        let mut sse_stream = Box::pin(process_sse(stream::iter(items)));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "Hi");
        let event = sse_stream.next().await.unwrap();
        match event {
            Err(err) => {
                assert!(err.is_streaming());
                assert!(err.to_string().contains("reset by peer"));
            }
            Ok(chunk) => panic!("expected an error, got {chunk:?}"),
        }
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn trailing_event_without_terminator() {
        let data: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}";
        let mut sse_stream = Box::pin(process_sse(byte_stream(vec![data])));

        let chunk = sse_stream.next().await.unwrap().unwrap();
        assert_eq!(content(&chunk), "tail");
        assert!(sse_stream.next().await.is_none());
    }
}
