//! Error types for the kbassist core
//!
//! One enum covers the whole taxonomy: fatal KB-load failures, retrieval
//! collaborator failures, transport failures from the answer endpoint, and
//! the rate-limit case callers render separately. Malformed stream frames
//! are deliberately NOT represented here; the decoder logs and skips them.

use thiserror::Error;

/// Main error type for retrieval and streaming operations
#[derive(Error, Debug)]
pub enum ChatError {
    /// KB document unreachable or malformed
    #[error("KB load failed: {0}")]
    KbLoad(String),

    /// Embedding or similarity-search collaborator failed
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// Non-2xx status or missing body from the answer endpoint
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 429 from the answer endpoint
    #[error("rate limit reached, try again in a moment")]
    RateLimited,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for retrieval and streaming operations
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChatError::KbLoad("missing field `articles`".to_string());
        assert!(err.to_string().contains("KB load failed"));
        assert!(err.to_string().contains("articles"));
    }

    #[test]
    fn test_rate_limit_message_is_distinct() {
        let rate = ChatError::RateLimited.to_string();
        let transport = ChatError::Transport("HTTP 500".to_string()).to_string();
        assert!(rate.contains("try again"));
        assert!(!transport.contains("try again"));
    }
}
