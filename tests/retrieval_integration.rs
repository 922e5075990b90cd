//! Retrieval integration tests
//!
//! Exercise the engine through the public API against a mock KB host and
//! a mock similarity index; no live store or model required.

use httpmock::prelude::*;
use kbassist::embedding::Embedder;
use kbassist::errors::{ChatError, Result};
use kbassist::kb::ArticleStore;
use kbassist::retrieval::{build_context, RetrievalEngine};
use kbassist::types::VectorMatch;
use kbassist::vector::VectorIndex;
use std::sync::Arc;

const KB_BODY: &str = r#"{
    "scraped_at": "2024-11-02T09:30:00Z",
    "total_articles": 3,
    "categories": ["quoting", "printing", "systemize"],
    "articles": [
        {"id": "a1", "url": "https://help.example.com/quoting/new-quote",
         "title": "Create a quote", "category": "quoting",
         "content": "Click New Quote to begin a quote.", "word_count": 7,
         "scraped_at": "2024-11-02T09:30:00Z"},
        {"id": "a2", "url": "https://help.example.com/printing/print-email",
         "title": "Print or email quotes", "category": "printing",
         "content": "Open the quote, then print it or email it.", "word_count": 9,
         "scraped_at": "2024-11-02T09:30:00Z"},
        {"id": "a3", "url": "https://help.example.com/systemize/connect",
         "title": "Connect to Systemize", "category": "systemize",
         "content": "Enter your credentials to sync jobs.", "word_count": 6,
         "scraped_at": "2024-11-02T09:30:00Z"}
    ]
}"#;

async fn lexical_engine(server: &MockServer) -> RetrievalEngine {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kb-data.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(KB_BODY);
        })
        .await;

    let store = Arc::new(ArticleStore::new(server.url("/kb-data.json")).unwrap());
    RetrievalEngine::lexical(store)
}

#[tokio::test]
async fn test_verbatim_title_ranks_first() {
    let server = MockServer::start_async().await;
    let engine = lexical_engine(&server).await;

    let articles = engine.search("Print or email quotes").await.unwrap();
    assert_eq!(articles[0].id, "a2");
}

#[tokio::test]
async fn test_no_usable_tokens_returns_empty() {
    let server = MockServer::start_async().await;
    let engine = lexical_engine(&server).await;

    let articles = engine.search("a an to").await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_lexical_ranking_is_deterministic() {
    let server = MockServer::start_async().await;
    let engine = lexical_engine(&server).await;

    let first: Vec<String> = engine
        .search("print a quote")
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    let second: Vec<String> = engine
        .search("print a quote")
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_product_scoped_query_restricts_results() {
    let server = MockServer::start_async().await;
    let engine = lexical_engine(&server).await;

    let articles = engine.search("How do I connect to Systemize?").await.unwrap();
    assert!(!articles.is_empty());
    assert!(articles.iter().all(|a| a.category == "systemize"));
}

#[tokio::test]
async fn test_kb_load_failure_propagates() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/kb-data.json");
            then.status(500);
        })
        .await;

    let store = Arc::new(ArticleStore::new(server.url("/kb-data.json")).unwrap());
    let engine = RetrievalEngine::lexical(store);

    let err = engine.search("print a quote").await.unwrap_err();
    assert!(matches!(err, ChatError::KbLoad(_)));
}

#[tokio::test]
async fn test_retrieved_articles_feed_context_builder() {
    let server = MockServer::start_async().await;
    let engine = lexical_engine(&server).await;

    let articles = engine.search("print a quote").await.unwrap();
    let context = build_context(&articles);
    assert!(context.contains("[Source 1:"));
    assert!(context.contains("URL: https://help.example.com/"));
}

// Vector mode against an in-process index

struct FixedEmbedder;

#[async_trait::async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.1; 8])
    }
}

struct FailingIndex;

#[async_trait::async_trait]
impl VectorIndex for FailingIndex {
    async fn similarity_search(
        &self,
        _query_embedding: &[f32],
        _threshold: f32,
        _limit: usize,
        _product_filter: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        Err(ChatError::Retrieval("store unreachable".to_string()))
    }
}

/// Records the limit the engine actually requested
struct LimitProbe {
    seen: std::sync::Mutex<Vec<usize>>,
}

#[async_trait::async_trait]
impl VectorIndex for LimitProbe {
    async fn similarity_search(
        &self,
        _query_embedding: &[f32],
        _threshold: f32,
        limit: usize,
        _product_filter: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        self.seen.lock().unwrap().push(limit);
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_index_failure_is_retrieval_error_not_empty_result() {
    let engine = RetrievalEngine::vector(Arc::new(FixedEmbedder), Arc::new(FailingIndex), 0.1);
    let err = engine.search("remnants").await.unwrap_err();
    assert!(matches!(err, ChatError::Retrieval(_)));
}

#[tokio::test]
async fn test_vector_mode_requests_candidate_headroom() {
    let probe = Arc::new(LimitProbe {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let engine = RetrievalEngine::vector(Arc::new(FixedEmbedder), probe.clone(), 0.1)
        .with_max_results(5);

    let articles = engine.search("remnants").await.unwrap();
    assert!(articles.is_empty());
    // desired 5 is below the floor, so the index sees 15
    assert_eq!(probe.seen.lock().unwrap().as_slice(), &[15]);
}
