//! Vectorizer error types.

use thiserror::Error;

/// Errors from model loading and vectorization.
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file missing or unreadable
    #[error("Model file not found: {0}")]
    ModelNotFound(String),

    /// Download error
    #[error("Failed to download model: {0}")]
    Download(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image could not be decoded or preprocessed
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
