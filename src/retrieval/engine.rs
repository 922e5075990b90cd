//! Retrieval engine
//!
//! One `search` capability with two variants: exact-token lexical scoring
//! over the cached snapshot, or embedding + similarity search against the
//! backing store. The variant is fixed per engine instance by
//! configuration, never decided per query.

use crate::embedding::Embedder;
use crate::errors::Result;
use crate::kb::lexical::{self, detect_product_filter};
use crate::kb::ArticleStore;
use crate::types::Article;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Result cap when the caller does not supply one
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Minimum candidate count requested from the index, leaving the store
/// headroom before local truncation
const MIN_MATCH_COUNT: usize = 15;

/// Which search backend an engine instance uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Lexical,
    Vector,
}

/// The search capability behind the engine
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Ranked articles for the query, at most `max_results` of them
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Article>>;
}

/// Lexical variant: scores the cached KB snapshot, no collaborators
pub struct LexicalSearcher {
    store: Arc<ArticleStore>,
}

impl LexicalSearcher {
    pub fn new(store: Arc<ArticleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Searcher for LexicalSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Article>> {
        // No usable tokens means no scoring work at all
        if lexical::tokenize(query).is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.store.snapshot().await?;
        let filter = detect_product_filter(query);
        debug!(?filter, articles = snapshot.articles.len(), "lexical search");

        let scored = lexical::score(query, &snapshot.articles, filter, max_results);
        Ok(scored.into_iter().map(|s| s.article).collect())
    }
}

/// Vector variant: embed the query, then ask the store's index. The two
/// awaits are sequential; the search depends on the embedding.
pub struct VectorSearcher {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn crate::vector::VectorIndex>,
    threshold: f32,
}

impl VectorSearcher {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn crate::vector::VectorIndex>,
        threshold: f32,
    ) -> Self {
        Self {
            embedder,
            index,
            threshold,
        }
    }
}

#[async_trait]
impl Searcher for VectorSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Article>> {
        let query_embedding = self.embedder.embed(query).await?;

        let filter = detect_product_filter(query);
        debug!(?filter, threshold = self.threshold, "vector search");

        let rows = self
            .index
            .similarity_search(
                &query_embedding,
                self.threshold,
                max_results.max(MIN_MATCH_COUNT),
                filter,
            )
            .await?;

        // Store order is already by descending similarity; keep it
        let mut articles: Vec<Article> = rows.into_iter().map(|r| r.into_article()).collect();
        articles.truncate(max_results);
        Ok(articles)
    }
}

/// Retrieval engine: a fixed searcher plus the configured result cap
pub struct RetrievalEngine {
    searcher: Box<dyn Searcher>,
    max_results: usize,
}

impl RetrievalEngine {
    /// Engine over the lexical variant
    pub fn lexical(store: Arc<ArticleStore>) -> Self {
        Self {
            searcher: Box::new(LexicalSearcher::new(store)),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Engine over the vector variant
    pub fn vector(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn crate::vector::VectorIndex>,
        threshold: f32,
    ) -> Self {
        Self {
            searcher: Box::new(VectorSearcher::new(embedder, index, threshold)),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Ranked articles for the query, truncated to the configured cap.
    /// Score and similarity metadata are dropped at this boundary.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        self.searcher.search(query, self.max_results).await
    }

    /// Same, with an explicit per-call cap
    pub async fn search_with_limit(&self, query: &str, max_results: usize) -> Result<Vec<Article>> {
        self.searcher.search(query, max_results).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChatError;
    use crate::types::VectorMatch;

    /// Embedder returning a fixed vector, recording nothing
    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; 4])
        }
    }

    /// Embedder that always fails
    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(ChatError::Retrieval("model not available".to_string()))
        }
    }

    /// Index over fixed ranked rows, filtered by threshold server-side
    struct FixedIndex {
        rows: Vec<(&'static str, f32)>,
    }

    #[async_trait]
    impl crate::vector::VectorIndex for FixedIndex {
        async fn similarity_search(
            &self,
            _query_embedding: &[f32],
            threshold: f32,
            limit: usize,
            _product_filter: Option<&str>,
        ) -> Result<Vec<VectorMatch>> {
            Ok(self
                .rows
                .iter()
                .filter(|(_, sim)| *sim >= threshold)
                .take(limit)
                .map(|(id, sim)| VectorMatch {
                    id: id.to_string(),
                    url: format!("https://help.example.com/{id}"),
                    title: id.to_string(),
                    category: "general".to_string(),
                    content: "body".to_string(),
                    similarity: *sim,
                })
                .collect())
        }
    }

    fn ranked_index() -> Arc<FixedIndex> {
        Arc::new(FixedIndex {
            rows: vec![("a1", 0.9), ("a2", 0.6), ("a3", 0.3), ("a4", 0.05)],
        })
    }

    #[tokio::test]
    async fn test_vector_order_preserved_and_truncated() {
        let engine = RetrievalEngine::vector(Arc::new(FixedEmbedder), ranked_index(), 0.0)
            .with_max_results(3);

        let articles = engine.search("cancel an order").await.unwrap();
        let ids: Vec<&str> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[tokio::test]
    async fn test_zero_threshold_is_superset_of_stricter() {
        let loose = RetrievalEngine::vector(Arc::new(FixedEmbedder), ranked_index(), 0.0);
        let strict = RetrievalEngine::vector(Arc::new(FixedEmbedder), ranked_index(), 0.5);

        let loose_ids: Vec<String> = loose
            .search("remnants")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        let strict_ids: Vec<String> = strict
            .search("remnants")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();

        assert!(strict_ids.iter().all(|id| loose_ids.contains(id)));
        assert!(loose_ids.len() >= strict_ids.len());
        // shared prefix keeps the score ordering
        assert_eq!(&loose_ids[..strict_ids.len()], &strict_ids[..]);
    }

    #[tokio::test]
    async fn test_embedder_failure_propagates() {
        let engine = RetrievalEngine::vector(Arc::new(BrokenEmbedder), ranked_index(), 0.1);
        let err = engine.search("anything").await.unwrap_err();
        assert!(matches!(err, ChatError::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_per_call_limit() {
        let engine = RetrievalEngine::vector(Arc::new(FixedEmbedder), ranked_index(), 0.0);
        let articles = engine.search_with_limit("orders", 1).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, "a1");
    }

    #[test]
    fn test_search_mode_wire_format() {
        assert_eq!(serde_json::to_string(&SearchMode::Vector).unwrap(), "\"vector\"");
        let mode: SearchMode = serde_json::from_str("\"lexical\"").unwrap();
        assert_eq!(mode, SearchMode::Lexical);
    }
}
