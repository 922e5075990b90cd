//! Answer endpoint streaming client
//!
//! Sends the conversation plus retrieved context to the answer-generation
//! endpoint and relays the decoded stream as ordered text deltas. Each call
//! is independent; dropping the returned future aborts the read loop and
//! releases the connection.

use crate::errors::{ChatError, Result};
use crate::streaming::decoder::FrameDecoder;
use crate::types::{ChatMessage, Role, StreamEvent};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Connect timeout only; the live token stream itself is unbounded
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Grounding wrapper injected around the last user message. The proxy in
/// front of the model may drop the system field, so the context rides in
/// the message itself.
const CONTEXT_HEADER: &str =
    "Use ONLY these knowledge base articles to answer. NO generic tutorials, NO numbered lists, NO headers.";
const CONTEXT_FOOTER: &str =
    "ANSWER RULES: 2-4 sentences max. KB content only. No Step 1/Step 2. No \"##\" headers.";

/// Wire body of the answer request
#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    messages: Vec<ChatMessage>,
    system: &'a str,
    temperature: f32,
}

/// Streaming client for the answer-generation endpoint
#[derive(Debug, Clone)]
pub struct AnswerClient {
    client: Client,
    endpoint: String,
    system_prompt: String,
    temperature: f32,
}

impl AnswerClient {
    pub fn new(
        endpoint: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f32,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            system_prompt: system_prompt.into(),
            temperature,
        })
    }

    /// Send the conversation and stream the answer back through `on_delta`,
    /// one callback per content delta, in exact frame order. Completes when
    /// the stream signals `[DONE]` or the connection closes.
    pub async fn relay<F>(
        &self,
        messages: Vec<ChatMessage>,
        context: &str,
        mut on_delta: F,
    ) -> Result<()>
    where
        F: FnMut(&str),
    {
        let messages = prepare_messages(messages, context);
        let request = AnswerRequest {
            messages,
            system: &self.system_prompt,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Transport(format!("HTTP {status}: {body}")));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = FrameDecoder::new();
        let mut saw_bytes = false;

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes =
                chunk.map_err(|e| ChatError::Transport(format!("stream read failed: {e}")))?;
            saw_bytes = true;

            for event in decoder.feed(&chunk) {
                match event {
                    StreamEvent::ContentDelta(text) => on_delta(&text),
                    // end sentinel: stop reading and release the connection
                    StreamEvent::Done => return Ok(()),
                    StreamEvent::Unrecognized => {}
                }
            }
        }

        if !saw_bytes {
            return Err(ChatError::Transport("no response body".to_string()));
        }

        // connection closed without the sentinel; flush the leftover frame
        if let Some(StreamEvent::ContentDelta(text)) = decoder.finish() {
            on_delta(&text);
        }

        Ok(())
    }
}

/// Drop empty messages and fold the grounding context into the last user
/// message, leaving earlier history untouched
fn prepare_messages(messages: Vec<ChatMessage>, context: &str) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = messages
        .into_iter()
        .filter(|m| !m.content.trim().is_empty())
        .collect();

    if context.is_empty() {
        return messages;
    }

    if let Some(last) = messages.last_mut() {
        if last.role == Role::User {
            last.content = format!(
                "{CONTEXT_HEADER}\n\n{context}\n\nUSER QUESTION: {}\n\n{CONTEXT_FOOTER}",
                last.content
            );
        }
    }

    messages
}
