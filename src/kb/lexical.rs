//! Exact-token lexical scoring
//!
//! Pure keyword search over the loaded snapshot: weighted title and content
//! matches, accumulated per token, ranked descending. No I/O.

use crate::types::{Article, ScoredArticle};
use regex::Regex;

/// Product names recognized as scope filters, checked in this order.
/// Shared by lexical and vector search.
pub const PRODUCT_KEYWORDS: [&str; 3] = ["systemize", "inventory", "countergo"];

/// Whole-title exact match bonus
const TITLE_EXACT_BONUS: f64 = 50.0;
/// Title substring match bonus
const TITLE_CONTAINS_BONUS: f64 = 20.0;
/// Extra title bonus for non-product tokens (action verbs like "print")
const ACTION_TITLE_BONUS: f64 = 30.0;
/// Cap on per-token content occurrences counted toward the score
const CONTENT_MATCH_CAP: usize = 10;

/// Detect a product-scope filter from the query text. Pure function of the
/// query alone; first keyword match wins.
pub fn detect_product_filter(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    PRODUCT_KEYWORDS.iter().copied().find(|kw| query.contains(kw))
}

/// Lowercase, split on whitespace, drop tokens of length <= 2
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Score articles against the query and return the ranked head.
///
/// A non-null `product_filter` restricts the candidate set to articles whose
/// url or category contains the filter before any scoring happens; an empty
/// restricted set stays empty rather than falling back to the full KB, so
/// results are deterministic. Ties keep KB order (the sort is stable).
pub fn score(
    query: &str,
    articles: &[Article],
    product_filter: Option<&str>,
    max_results: usize,
) -> Vec<ScoredArticle> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let candidates: Vec<&Article> = match product_filter {
        Some(filter) => {
            let filter = filter.to_lowercase();
            articles
                .iter()
                .filter(|a| {
                    a.url.to_lowercase().contains(&filter)
                        || a.category.to_lowercase().contains(&filter)
                })
                .collect()
        }
        None => articles.iter().collect(),
    };

    let mut scored: Vec<ScoredArticle> = Vec::new();
    for article in candidates {
        let title = article.title.to_lowercase();
        let content = article.content.to_lowercase();

        let mut total = 0.0;
        for token in &tokens {
            if title == *token {
                total += TITLE_EXACT_BONUS;
            }
            if title.contains(token.as_str()) {
                total += TITLE_CONTAINS_BONUS;
                if !PRODUCT_KEYWORDS.contains(&token.as_str()) {
                    total += ACTION_TITLE_BONUS;
                }
            }
            total += word_matches(&content, token).min(CONTENT_MATCH_CAP) as f64;
        }

        if total > 0.0 {
            scored.push(ScoredArticle {
                article: article.clone(),
                score: total,
            });
        }
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(max_results);
    scored
}

/// Whole-word occurrences of `token` in `haystack`
fn word_matches(haystack: &str, token: &str) -> usize {
    match Regex::new(&format!(r"\b{}\b", regex::escape(token))) {
        Ok(re) => re.find_iter(haystack).count(),
        Err(_) => 0,
    }
}
