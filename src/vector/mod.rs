//! Similarity-search index
//!
//! The index itself lives in the backing store; this module defines the
//! call contract the retrieval engine consumes and the RPC client that
//! implements it against the hosted store.

pub mod index;

pub use index::{SupabaseIndex, VectorIndex};
