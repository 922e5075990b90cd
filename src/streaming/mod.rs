//! Streaming answer relay
//!
//! HTTP client for the answer endpoint and the frame decoder that turns
//! its chunked byte stream into ordered text deltas.

pub mod client;
pub mod decoder;

pub use client::AnswerClient;
pub use decoder::FrameDecoder;
