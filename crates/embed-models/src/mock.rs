//! Deterministic mock vectorizers.
//!
//! Dependency-free stand-ins for tests and local development: the output
//! vector is derived from a blake3 digest of the input, so identical inputs
//! always produce identical embeddings and distinct inputs almost surely
//! differ.

use image::DynamicImage;

use crate::error::VectorizeError;
use crate::model::{Embedding, ImageVectorizer, ModelInfo, TextVectorizer};

/// Dimension of mock embeddings.
pub const MOCK_DIM: usize = 8;

fn digest_embedding(bytes: &[u8]) -> Embedding {
    let digest = blake3::hash(bytes);
    let raw = digest.as_bytes();
    let values = (0..MOCK_DIM)
        .map(|i| {
            let chunk = [raw[i * 4], raw[i * 4 + 1], raw[i * 4 + 2], raw[i * 4 + 3]];
            u32::from_le_bytes(chunk) as f64 / u32::MAX as f64
        })
        .map(|v| v as f32)
        .collect();
    Embedding::from_raw(values)
}

/// Mock text vectorizer.
pub struct MockTextVectorizer {
    info: ModelInfo,
}

impl MockTextVectorizer {
    pub fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "mock-text".to_string(),
                dimension: MOCK_DIM,
            },
        }
    }
}

impl Default for MockTextVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextVectorizer for MockTextVectorizer {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn vectorize(&self, text: &str) -> Result<Embedding, VectorizeError> {
        Ok(digest_embedding(text.as_bytes()))
    }
}

/// Mock image vectorizer, seeded from the decoded pixel data.
pub struct MockImageVectorizer {
    info: ModelInfo,
}

impl MockImageVectorizer {
    pub fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "mock-image".to_string(),
                dimension: MOCK_DIM,
            },
        }
    }
}

impl Default for MockImageVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageVectorizer for MockImageVectorizer {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn vectorize(&self, image: &DynamicImage) -> Result<Embedding, VectorizeError> {
        Ok(digest_embedding(&image.to_rgb8().into_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_text_mock_deterministic() {
        let mock = MockTextVectorizer::new();
        let a = mock.vectorize("hello").unwrap();
        let b = mock.vectorize("hello").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimension(), MOCK_DIM);
    }

    #[test]
    fn test_text_mock_distinct_inputs() {
        let mock = MockTextVectorizer::new();
        let a = mock.vectorize("hello").unwrap();
        let b = mock.vectorize("world").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_image_mock_deterministic() {
        let mock = MockImageVectorizer::new();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3])));
        let a = mock.vectorize(&img).unwrap();
        let b = mock.vectorize(&img).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_bounded() {
        let mock = MockTextVectorizer::new();
        let emb = mock.vectorize("bounds").unwrap();
        assert!(emb.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
