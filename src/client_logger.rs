//! Logging trait for chat client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log all API interactions passing through the [`crate::ChatClient`], and
//! [`JsonLinesLogger`], which records them as one JSON object per line.

use std::io::Write;
use std::sync::Mutex;

use serde_json::json;

use crate::types::{ChatCompletionChunk, ChatCompletionRequest};

/// A trait for logging chat client operations.
///
/// Implement this trait to capture and record all API interactions,
/// including the request body and each streamed chunk.
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, url: &str, request: &ChatCompletionRequest);

    /// Log an individual streamed chunk.
    ///
    /// This method is called for each [`ChatCompletionChunk`] received during
    /// a streaming request, in arrival order.
    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk);

    /// Log a request or stream failure.
    fn log_error(&self, error: &crate::Error);
}

/// A [`ClientLogger`] that writes one JSON object per line.
///
/// Write failures are swallowed; logging never fails a turn.
pub struct JsonLinesLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesLogger<W> {
    /// Creates a logger writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the logger and returns the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_record(&self, record: serde_json::Value) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *writer, &record).is_ok() {
            let _ = writer.write_all(b"\n");
            let _ = writer.flush();
        }
    }
}

impl<W: Write + Send> ClientLogger for JsonLinesLogger<W> {
    fn log_request(&self, url: &str, request: &ChatCompletionRequest) {
        self.write_record(json!({
            "kind": "request",
            "url": url,
            "body": request,
        }));
    }

    fn log_stream_chunk(&self, chunk: &ChatCompletionChunk) {
        self.write_record(json!({
            "kind": "chunk",
            "body": chunk,
        }));
    }

    fn log_error(&self, error: &crate::Error) {
        self.write_record(json!({
            "kind": "error",
            "message": error.to_string(),
        }));
    }
}
