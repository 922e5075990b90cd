//! Similarity-search RPC client

use crate::errors::{ChatError, Result};
use crate::types::VectorMatch;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Request timeout for one similarity-search round trip
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Similarity-search capability exposed by the backing store.
///
/// Rows come back already sorted by descending similarity. `limit` is a
/// soft floor for the store; callers truncate locally. Errors are never
/// retried here; they surface as [`ChatError::Retrieval`].
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        limit: usize,
        product_filter: Option<&str>,
    ) -> Result<Vec<VectorMatch>>;
}

/// Wire parameters of the `search_articles` RPC
#[derive(Debug, Serialize)]
struct SearchArticlesParams<'a> {
    /// Postgres vector literal, `[v1,v2,...]`
    query_embedding: String,
    match_threshold: f32,
    match_count: usize,
    product_filter: Option<&'a str>,
}

/// PostgREST client for the store's `search_articles` RPC
#[derive(Debug)]
pub struct SupabaseIndex {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseIndex {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(ChatError::Config(
                "supabase_url is required for vector search".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Retrieval(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Format an embedding as the Postgres vector literal the RPC expects
    fn vector_literal(embedding: &[f32]) -> String {
        let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
        format!("[{}]", parts.join(","))
    }
}

#[async_trait]
impl VectorIndex for SupabaseIndex {
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        limit: usize,
        product_filter: Option<&str>,
    ) -> Result<Vec<VectorMatch>> {
        let url = format!(
            "{}/rest/v1/rpc/search_articles",
            self.base_url.trim_end_matches('/')
        );

        let params = SearchArticlesParams {
            query_embedding: Self::vector_literal(query_embedding),
            match_threshold: threshold,
            match_count: limit,
            product_filter,
        };

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&params)
            .send()
            .await
            .map_err(|e| ChatError::Retrieval(format!("similarity search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Retrieval(format!(
                "similarity search failed: HTTP {status}: {body}"
            )));
        }

        response
            .json::<Vec<VectorMatch>>()
            .await
            .map_err(|e| ChatError::Retrieval(format!("malformed similarity search response: {e}")))
    }
}
