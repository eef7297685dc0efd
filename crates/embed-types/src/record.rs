//! Stored vector record.
//!
//! The value shape written to and read from the cache: an ordered sequence
//! of floats plus optional provenance metadata.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An embedding vector with optional metadata, as cached and as returned
/// to HTTP callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// The embedding values, in model output order
    pub embedding: Vec<f32>,

    /// Identifier of the model that produced the embedding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Generation time, seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl VectorRecord {
    /// Create a record with no metadata.
    pub fn bare(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            model: None,
            timestamp: None,
        }
    }

    /// Create a record stamped with the producing model and the current time.
    pub fn generated(embedding: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            embedding,
            model: Some(model.into()),
            timestamp: Some(Utc::now().timestamp()),
        }
    }

    /// Number of dimensions in the embedding.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_has_no_metadata() {
        let record = VectorRecord::bare(vec![0.1, 0.2]);
        assert!(record.model.is_none());
        assert!(record.timestamp.is_none());
        assert_eq!(record.dimension(), 2);
    }

    #[test]
    fn test_generated_is_stamped() {
        let record = VectorRecord::generated(vec![0.5; 4], "all-MiniLM-L6-v2");
        assert_eq!(record.model.as_deref(), Some("all-MiniLM-L6-v2"));
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let record = VectorRecord::generated(vec![0.1, -2.5, 3.0e-7, f32::MAX], "m");
        let json = serde_json::to_string(&record).unwrap();
        let decoded: VectorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_bare_serializes_without_null_fields() {
        let json = serde_json::to_string(&VectorRecord::bare(vec![1.0])).unwrap();
        assert!(!json.contains("model"));
        assert!(!json.contains("timestamp"));
    }
}
