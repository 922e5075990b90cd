//! KB article store
//!
//! Fetches the scraped KB document once and caches the parsed snapshot for
//! the life of the process. Concurrent first callers share one in-flight
//! load; a refresh requires a restart.

use crate::errors::{ChatError, Result};
use crate::types::KbSnapshot;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Request timeout for the one-time KB fetch
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// In-memory KB holding the full article collection
pub struct ArticleStore {
    client: Client,
    kb_url: String,
    snapshot: OnceCell<KbSnapshot>,
}

impl ArticleStore {
    pub fn new(kb_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(LOAD_TIMEOUT)
            .build()
            .map_err(|e| ChatError::KbLoad(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            kb_url: kb_url.into(),
            snapshot: OnceCell::new(),
        })
    }

    /// The cached snapshot, loading it on first call. Load failures are
    /// fatal to the caller and are never swallowed or retried here.
    pub async fn snapshot(&self) -> Result<&KbSnapshot> {
        self.snapshot.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<KbSnapshot> {
        let response = self
            .client
            .get(&self.kb_url)
            .send()
            .await
            .map_err(|e| ChatError::KbLoad(format!("failed to fetch {}: {e}", self.kb_url)))?;

        if !response.status().is_success() {
            return Err(ChatError::KbLoad(format!(
                "failed to fetch {}: HTTP {}",
                self.kb_url,
                response.status()
            )));
        }

        let snapshot: KbSnapshot = response
            .json()
            .await
            .map_err(|e| ChatError::KbLoad(format!("malformed KB document: {e}")))?;

        if snapshot.total_articles != snapshot.articles.len() {
            warn!(
                declared = snapshot.total_articles,
                actual = snapshot.articles.len(),
                "KB document article count mismatch"
            );
        }

        debug!(
            articles = snapshot.articles.len(),
            scraped_at = %snapshot.scraped_at,
            "loaded KB snapshot"
        );

        Ok(snapshot)
    }
}
