//! Candle-based text vectorizer.
//!
//! Uses all-MiniLM-L6-v2 for 384-dimensional sentence embeddings with
//! attention-masked mean pooling.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::VectorizeError;
use crate::hub::{fetch_model_files, ModelSource};
use crate::model::{Embedding, ModelInfo, TextVectorizer};

/// Embedding dimension for all-MiniLM-L6-v2.
pub const TEXT_EMBEDDING_DIM: usize = 384;

/// Maximum sequence length in tokens.
pub const MAX_SEQ_LENGTH: usize = 256;

/// BERT sentence embedder.
pub struct BertTextVectorizer {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl BertTextVectorizer {
    /// Load the model from a source, downloading files if needed.
    pub fn load(source: &ModelSource) -> Result<Self, VectorizeError> {
        fetch_model_files(source)?;
        Self::load_from_paths(
            &source.file_path("config.json"),
            &source.file_path("tokenizer.json"),
            &source.file_path("model.safetensors"),
        )
    }

    /// Load from explicit file paths.
    pub fn load_from_paths(
        config_path: &std::path::Path,
        tokenizer_path: &std::path::Path,
        weights_path: &std::path::Path,
    ) -> Result<Self, VectorizeError> {
        info!("Loading text embedding model...");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| VectorizeError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| VectorizeError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(vb, &config)?;

        info!(dim = TEXT_EMBEDDING_DIM, "Text model loaded");

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "all-MiniLM-L6-v2".to_string(),
                dimension: TEXT_EMBEDDING_DIM,
            },
        })
    }

    /// Mean pooling over token embeddings, excluding padding positions.
    fn mean_pool(
        &self,
        token_embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, VectorizeError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(token_embeddings.shape())?
            .to_dtype(DType::F32)?;

        let summed = token_embeddings.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(summed.broadcast_div(&counts)?)
    }
}

impl TextVectorizer for BertTextVectorizer {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn vectorize(&self, text: &str) -> Result<Embedding, VectorizeError> {
        let mut embeddings = self.vectorize_batch(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| VectorizeError::InvalidInput("empty batch result".to_string()))
    }

    fn vectorize_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, VectorizeError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(count = texts.len(), "Vectorizing text batch");

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| VectorizeError::Tokenizer(e.to_string()))?;

        // Pad the batch to a common length, truncating at the model limit
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let batch_size = texts.len();
        let mut ids_flat: Vec<u32> = Vec::with_capacity(batch_size * max_len);
        let mut mask_flat: Vec<u32> = Vec::with_capacity(batch_size * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let keep = ids.len().min(max_len);

            ids_flat.extend_from_slice(&ids[..keep]);
            ids_flat.extend(std::iter::repeat(0).take(max_len - keep));
            mask_flat.extend_from_slice(&mask[..keep]);
            mask_flat.extend(std::iter::repeat(0).take(max_len - keep));
        }

        let input_ids = Tensor::from_vec(ids_flat, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.mean_pool(&output, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;

        debug!(count = rows.len(), dim = TEXT_EMBEDDING_DIM, "Batch complete");

        Ok(rows.into_iter().map(Embedding::new).collect())
    }
}
