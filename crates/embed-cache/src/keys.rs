//! Cache key construction.
//!
//! Key format: `{namespace}:{fingerprint}`
//! - text inputs key on the exact text (`text_vector:hello`)
//! - image inputs key on a blake3 digest of the encoded bytes, since raw
//!   image bytes are not key-safe
//!
//! Identical logical inputs always produce identical keys, and the two
//! namespaces can never collide.

use std::fmt;

use crate::error::CacheError;

/// Namespace for text vectorization requests.
pub const TEXT_NAMESPACE: &str = "text_vector";

/// Namespace for image vectorization requests.
pub const IMAGE_NAMESPACE: &str = "image_vector";

/// Deterministic identifier for a vectorization request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a text request.
    ///
    /// Rejects empty input; the store must never be queried with an empty key.
    pub fn text(input: &str) -> Result<Self, CacheError> {
        if input.is_empty() {
            return Err(CacheError::InvalidInput(
                "cache key requires non-empty text".to_string(),
            ));
        }
        Ok(Self(format!("{}:{}", TEXT_NAMESPACE, input)))
    }

    /// Key for an image request, fingerprinting the encoded bytes.
    pub fn image(bytes: &[u8]) -> Result<Self, CacheError> {
        if bytes.is_empty() {
            return Err(CacheError::InvalidInput(
                "cache key requires non-empty image bytes".to_string(),
            ));
        }
        let digest = blake3::hash(bytes);
        Ok(Self(format!("{}:{}", IMAGE_NAMESPACE, digest.to_hex())))
    }

    /// The full key string as sent to the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
