//! Answer-stream frame decoder
//!
//! The endpoint streams newline-delimited frames; `data: `-prefixed frames
//! carry JSON events and `data: [DONE]` ends the stream. Network reads can
//! split a frame anywhere, so the decoder keeps the trailing incomplete
//! line across feeds and only parses complete lines. State is an explicit
//! struct so the loop is testable with synthetic byte chunks.

use crate::types::StreamEvent;
use serde::Deserialize;
use tracing::warn;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// JSON payload of one `data: ` frame
#[derive(Debug, Deserialize)]
struct FramePayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<FrameDelta>,
}

#[derive(Debug, Deserialize)]
struct FrameDelta {
    #[serde(default)]
    text: Option<String>,
}

/// Carry-over buffer between network reads
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the events completed by one chunk, in frame order. The last
    /// segment without a trailing newline stays buffered for the next feed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].to_string();
            self.buffer.drain(..=pos);
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Best-effort parse of whatever is buffered once the stream has ended
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Parse one complete line. Blank lines and non-data lines yield nothing;
/// malformed JSON is logged and skipped so the stream keeps flowing.
fn parse_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    match serde_json::from_str::<FramePayload>(payload) {
        Ok(frame) if frame.kind == "content_block_delta" => {
            match frame.delta.and_then(|d| d.text) {
                Some(text) => Some(StreamEvent::ContentDelta(text)),
                None => Some(StreamEvent::Unrecognized),
            }
        }
        Ok(_) => Some(StreamEvent::Unrecognized),
        Err(e) => {
            warn!(error = %e, "skipping malformed stream frame");
            None
        }
    }
}
