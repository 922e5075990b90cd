//! Core data model
//!
//! Articles and snapshots owned by the KB store, conversation messages
//! passed through the relay, and the protocol-level stream events.

pub mod article;
pub mod messages;

pub use article::{Article, KbSnapshot, ScoredArticle, VectorMatch};
pub use messages::{ChatMessage, Role, StreamEvent};
