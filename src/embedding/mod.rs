//! Query embedding
//!
//! Text to 384-dimension normalized vectors via a local MiniLM model. The
//! engine is heavy to construct (model download + weight load), so it is
//! initialized once per process behind a single-flight cell.

pub mod engine;

pub use engine::{shared_engine, EmbeddingEngine, MiniLmEmbedder, EMBEDDING_DIM};

use crate::errors::Result;
use async_trait::async_trait;

/// Opaque text-to-vector capability consumed by vector search.
///
/// The same model, pooling, and normalization must be used on the write
/// path that populated the index; a mismatch silently degrades every
/// similarity score and cannot be detected here.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
