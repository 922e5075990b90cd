//! Terminal client
//!
//! Thin command layer over the library: build the configured retrieval
//! engine, fetch context, stream the answer to the terminal.

pub mod args;

pub use args::{Args, Commands};

use crate::config::Config;
use crate::embedding::MiniLmEmbedder;
use crate::errors::{ChatError, Result};
use crate::kb::ArticleStore;
use crate::retrieval::{build_context, RetrievalEngine, SearchMode};
use crate::streaming::AnswerClient;
use crate::types::ChatMessage;
use crate::vector::SupabaseIndex;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// Build the retrieval engine the configuration asks for
fn build_engine(config: &Config, force_lexical: bool) -> Result<RetrievalEngine> {
    let mode = if force_lexical {
        SearchMode::Lexical
    } else {
        config.search_mode
    };

    let engine = match mode {
        SearchMode::Lexical => {
            let store = Arc::new(ArticleStore::new(&config.kb_url)?);
            RetrievalEngine::lexical(store)
        }
        SearchMode::Vector => {
            let index = SupabaseIndex::new(&config.supabase_url, &config.supabase_key)?;
            RetrievalEngine::vector(Arc::new(MiniLmEmbedder), Arc::new(index), config.match_threshold)
        }
    };

    Ok(engine.with_max_results(config.max_results))
}

/// `ask`: retrieve context, then stream the grounded answer to stdout.
///
/// Retrieval failure is not fatal here: the caller-level policy is to warn
/// and answer without context rather than refuse. "No matching articles"
/// (empty success) takes the same path with no warning.
pub async fn run_ask(config: &Config, question: &str, force_lexical: bool) -> Result<()> {
    let engine = build_engine(config, force_lexical)?;

    let articles = match engine.search(question).await {
        Ok(articles) => articles,
        Err(e) => {
            warn!(error = %e, "retrieval failed; answering without context");
            Vec::new()
        }
    };

    if !articles.is_empty() {
        eprintln!(
            "{}",
            format!("Grounding on {} KB article(s)", articles.len()).dimmed()
        );
    }

    let context = build_context(&articles);
    let client = AnswerClient::new(
        &config.answer_endpoint,
        &config.system_prompt,
        config.temperature,
    )?;

    let messages = vec![ChatMessage::user(question)];
    let result = client
        .relay(messages, &context, |delta| {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        })
        .await;

    match result {
        Ok(()) => {
            println!();
            Ok(())
        }
        Err(ChatError::RateLimited) => {
            eprintln!("{}", "Rate limit reached. Please try again in a moment.".yellow());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// `search`: print the ranked articles for a query
pub async fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    force_lexical: bool,
) -> Result<()> {
    let mode = if force_lexical {
        SearchMode::Lexical
    } else {
        config.search_mode
    };

    if mode == SearchMode::Lexical {
        let store = ArticleStore::new(&config.kb_url)?;
        let snapshot = store.snapshot().await?;
        if let Some(when) = snapshot.scraped_at_time() {
            eprintln!(
                "{}",
                format!(
                    "KB snapshot: {} articles, scraped {}",
                    snapshot.articles.len(),
                    when.format("%Y-%m-%d")
                )
                .dimmed()
            );
        }
    }

    let engine = build_engine(config, force_lexical)?;
    let articles = match limit {
        Some(limit) => engine.search_with_limit(query, limit).await?,
        None => engine.search(query).await?,
    };

    if articles.is_empty() {
        println!("{}", "No matching articles.".yellow());
        return Ok(());
    }

    for (idx, article) in articles.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{}.", idx + 1).bold(),
            article.title.green(),
            format!("({})", article.category).dimmed()
        );
        println!("   {}", article.url.blue());
    }

    Ok(())
}

/// `config`: print the resolved configuration as TOML
pub fn run_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ChatError::Config(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}
