//! kbassist - hybrid KB retrieval and streaming answer relay
//!
//! The library half of a product-support chatbot: turn a free-text
//! question into a ranked, bounded set of knowledge-base articles (by
//! exact-token lexical scoring or cosine-similarity vector search with
//! product-scoped filtering), format them into a bounded prompt fragment,
//! and relay the model's chunked answer stream as ordered text deltas.
//!
//! # Architecture
//!
//! - `kb`: article store (one-time cached snapshot) + lexical scorer
//! - `embedding`: query-side MiniLM embedder, memoized per process
//! - `vector`: similarity-search contract + RPC client
//! - `retrieval`: engine orchestration and prompt-context assembly
//! - `streaming`: answer endpoint client and frame decoder

pub mod config;
pub mod errors;
pub mod types;

pub mod embedding;
pub mod kb;
pub mod retrieval;
pub mod streaming;
pub mod vector;

// Terminal client
pub mod cli;

// Re-export commonly used types
pub use errors::{ChatError, Result};
