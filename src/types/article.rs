//! KB article records and the cached snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single scraped KB article. Immutable once the snapshot is loaded;
/// every component past the store sees it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub url: String,
    pub title: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub word_count: usize,
    /// Empty for articles synthesized from similarity-search rows
    #[serde(default)]
    pub scraped_at: String,
}

/// The full KB document as fetched from the configured location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbSnapshot {
    #[serde(default)]
    pub scraped_at: String,
    #[serde(default)]
    pub total_articles: usize,
    #[serde(default)]
    pub categories: Vec<String>,
    pub articles: Vec<Article>,
}

impl KbSnapshot {
    /// Scrape timestamp, if the document carries a parseable one
    pub fn scraped_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.scraped_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Article paired with its lexical score. Transient: created per query,
/// discarded after ranking.
#[derive(Debug, Clone)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: f64,
}

/// Row returned by the similarity-search RPC, already ranked by the store
#[derive(Debug, Clone, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub url: String,
    pub title: String,
    pub category: String,
    pub content: String,
    /// Cosine similarity in [0, 1]
    pub similarity: f32,
}

impl VectorMatch {
    /// Convert to an [`Article`]; similarity is dropped at this boundary.
    /// The store does not return word counts or scrape timestamps, so the
    /// count is recomputed and the timestamp left empty.
    pub fn into_article(self) -> Article {
        let word_count = self.content.split_whitespace().count();
        Article {
            id: self.id,
            url: self.url,
            title: self.title,
            category: self.category,
            content: self.content,
            word_count,
            scraped_at: String::new(),
        }
    }
}
