//! Incremental decoder for `text/event-stream` payloads.
//!
//! Network chunks arrive at arbitrary boundaries, so the decoder buffers
//! partial lines across `push` calls and emits a frame each time it sees the
//! blank-line dispatch marker. Comment lines (leading `:`) and unknown
//! fields are ignored per the SSE spec; multi-line `data:` fields are joined
//! with newlines.

use std::time::Duration;

/// One decoded SSE frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` field, if any.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
    /// `id:` field, if any.
    pub id: Option<String>,
    /// `retry:` reconnection hint, if any.
    pub retry: Option<Duration>,
}

/// Incremental frame decoder. Feed it raw chunks; collect frames.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    event: Option<String>,
    data_lines: Vec<String>,
    id: Option<String>,
    retry: Option<Duration>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if let Some(frame) = self.dispatch() {
                    frames.push(frame);
                }
            } else {
                self.field(line);
            }
        }
        frames
    }

    /// Blank line: emit the accumulated frame, if it carries anything.
    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let id = self.id.take();
        let retry = self.retry.take();
        let data_lines = std::mem::take(&mut self.data_lines);
        if data_lines.is_empty() && event.is_none() {
            return None;
        }
        Some(SseFrame {
            event,
            data: data_lines.join("\n"),
            id,
            retry,
        })
    }

    fn field(&mut self, line: &str) {
        // Comment line
        if line.starts_with(':') {
            return;
        }
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match name {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            "retry" => {
                if let Ok(millis) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(millis));
                }
                // Non-numeric retry values are ignored per spec
            }
            _ => {}
        }
    }
}
