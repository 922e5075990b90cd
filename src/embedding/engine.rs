//! Embedding engine - local all-MiniLM-L6-v2 via Candle

use crate::embedding::Embedder;
use crate::errors::{ChatError, Result as ChatResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;

const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimension of the MiniLM sentence encoder
pub const EMBEDDING_DIM: usize = 384;

static SHARED: OnceCell<Arc<EmbeddingEngine>> = OnceCell::const_new();

/// Process-wide engine, initialized on first use. Concurrent first callers
/// await the same in-flight initialization; later callers read the cache.
pub async fn shared_engine() -> Result<Arc<EmbeddingEngine>> {
    SHARED
        .get_or_try_init(|| async {
            tokio::task::spawn_blocking(EmbeddingEngine::new)
                .await
                .map_err(|e| anyhow::anyhow!("embedding init task failed: {e}"))?
                .map(Arc::new)
        })
        .await
        .map(Arc::clone)
}

/// Embedding engine wrapping the MiniLM BERT encoder
pub struct EmbeddingEngine {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
}

impl EmbeddingEngine {
    /// Create a new engine (downloads model files on first use)
    pub fn new() -> Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(MODEL_ID.to_string(), RepoType::Model));

        let config_path = repo.get("config.json").context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json").context("Failed to download tokenizer")?;
        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&config_contents).context("Failed to parse model config")?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], candle_core::DType::F32, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config).context("Failed to create BERT model")?;

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
        })
    }

    /// Generate a normalized embedding for a single text
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text]).map(|mut v| {
            v.pop().unwrap_or_default()
        })
    }

    /// Generate normalized embeddings for multiple texts
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let mut token_ids_vec = Vec::new();
        let mut attention_mask_vec = Vec::new();

        for encoding in &encodings {
            token_ids_vec.push(encoding.get_ids().to_vec());
            attention_mask_vec.push(encoding.get_attention_mask().to_vec());
        }

        let max_len = token_ids_vec.iter().map(|ids| ids.len()).max().unwrap_or(0);
        let batch_size = texts.len();

        // Pad sequences
        let mut padded_ids = vec![vec![0u32; max_len]; batch_size];
        let mut padded_mask = vec![vec![0u32; max_len]; batch_size];

        for (i, (ids, mask)) in token_ids_vec.iter().zip(attention_mask_vec.iter()).enumerate() {
            padded_ids[i][..ids.len()].copy_from_slice(ids);
            padded_mask[i][..mask.len()].copy_from_slice(mask);
        }

        let flat_ids: Vec<u32> = padded_ids.into_iter().flatten().collect();
        let flat_mask: Vec<u32> = padded_mask.into_iter().flatten().collect();

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let embeddings = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean pooling, then L2 normalization - must match the write path
        // that populated the similarity index
        let pooled = Self::mean_pool(&embeddings, &attention_mask)?;
        let normalized = Self::l2_normalize(&pooled)?;

        let embedding_data = normalized.to_vec2::<f32>()?;

        Ok(embedding_data)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        let pooled = sum_embeddings.broadcast_div(&sum_mask)?;

        Ok(pooled)
    }

    /// Row-wise L2 normalization
    fn l2_normalize(pooled: &Tensor) -> Result<Tensor> {
        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        Ok(pooled.broadcast_div(&norm)?)
    }

    /// Output dimension (always 384 for MiniLM-L6-v2)
    pub fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// [`Embedder`] backed by the process-wide MiniLM engine
pub struct MiniLmEmbedder;

#[async_trait]
impl Embedder for MiniLmEmbedder {
    async fn embed(&self, text: &str) -> ChatResult<Vec<f32>> {
        let engine = shared_engine()
            .await
            .map_err(|e| ChatError::Retrieval(format!("embedding model init failed: {e:#}")))?;

        let text = text.to_string();
        tokio::task::spawn_blocking(move || engine.embed(&text))
            .await
            .map_err(|e| ChatError::Retrieval(format!("embedding task failed: {e}")))?
            .map_err(|e| ChatError::Retrieval(format!("embedding failed: {e:#}")))
    }
}
