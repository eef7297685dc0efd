//! Vectorizer traits and the embedding value type.

use image::DynamicImage;

use crate::error::VectorizeError;

/// A fixed-length numeric embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding values
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding normalized to unit length.
    ///
    /// A zero vector is left untouched rather than divided by zero.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let normalized = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values: normalized }
    }

    /// Create an embedding from raw model output, without normalization.
    pub fn from_raw(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Cosine similarity with another embedding of the same dimension.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }
        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        let norm_a: f32 = self.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = other.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }

    /// Consume the embedding, returning its values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Model identity and output shape.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
}

/// Maps text to an embedding.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
pub trait TextVectorizer: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate an embedding for a single text.
    fn vectorize(&self, text: &str) -> Result<Embedding, VectorizeError>;

    /// Generate embeddings for multiple texts.
    /// Default implementation calls vectorize() for each text.
    fn vectorize_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, VectorizeError> {
        texts.iter().map(|text| self.vectorize(text)).collect()
    }
}

/// Maps a decoded image to an embedding.
pub trait ImageVectorizer: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate an embedding for a decoded image.
    fn vectorize(&self, image: &DynamicImage) -> Result<Embedding, VectorizeError>;
}
