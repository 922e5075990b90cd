//! Prompt context assembly
//!
//! Formats retrieved articles into the bounded grounding block handed to
//! the answer endpoint. Pure; no failure modes.

use crate::types::Article;

/// Characters of article content included per source block
const PREVIEW_CHARS: usize = 1000;

const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Build the grounding context from retrieved articles, in input order.
/// Empty input yields an empty string, with no separator artifacts.
pub fn build_context(articles: &[Article]) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(idx, article)| {
            let preview: String = article.content.chars().take(PREVIEW_CHARS).collect();
            let truncated = article.content.chars().count() > PREVIEW_CHARS;
            format!(
                "[Source {}: {}]\nCategory: {}\n{}{}\nURL: {}",
                idx + 1,
                article.title,
                article.category,
                preview,
                if truncated { "..." } else { "" },
                article.url
            )
        })
        .collect();

    blocks.join(BLOCK_SEPARATOR)
}
