//! Retrieval orchestration
//!
//! Chooses the configured search backend, detects product scope, ranks,
//! truncates, and formats the retrieved articles into prompt context.

pub mod context;
pub mod engine;

pub use context::build_context;
pub use engine::{
    LexicalSearcher, RetrievalEngine, SearchMode, Searcher, VectorSearcher, DEFAULT_MAX_RESULTS,
};
