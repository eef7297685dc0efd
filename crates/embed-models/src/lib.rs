//! # embed-models
//!
//! Vectorizers for the embedding gateway: pretrained models that map text
//! or decoded images to fixed-length numeric embeddings.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - Text: all-MiniLM-L6-v2 (384 dimensions)
//! - Image: pretrained ResNet-50 (1000 dimensions)
//! - Automatic model file caching
//! - Deterministic mock vectorizers for tests
//!
//! Model loading is expensive; vectorization is comparatively cheap per
//! call. Both vectorizers are `Send + Sync` and meant to be loaded once at
//! process startup and shared for the process lifetime.

pub mod error;
pub mod hub;
pub mod image_model;
pub mod mock;
pub mod model;
pub mod registry;
pub mod text;

pub use error::VectorizeError;
pub use hub::{fetch_model_files, ModelSource, IMAGE_MODEL_FILES, TEXT_MODEL_FILES};
pub use image_model::{ResnetImageVectorizer, IMAGE_EMBEDDING_DIM};
pub use mock::{MockImageVectorizer, MockTextVectorizer};
pub use model::{Embedding, ImageVectorizer, ModelInfo, TextVectorizer};
pub use registry::Vectorizers;
pub use text::{BertTextVectorizer, MAX_SEQ_LENGTH, TEXT_EMBEDDING_DIM};
