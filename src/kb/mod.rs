//! Knowledge-base store and lexical search
//!
//! The store owns the article snapshot; the scorer is a pure function over
//! it. All network I/O for the KB lives in the store.

pub mod lexical;
pub mod store;

pub use store::ArticleStore;
