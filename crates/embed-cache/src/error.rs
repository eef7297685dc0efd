//! Cache error taxonomy.
//!
//! `Unavailable` and `Serialization` are deliberately distinct from a miss:
//! a store outage or a corrupt entry must surface to the caller rather than
//! masquerade as a cold cache.

use thiserror::Error;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key-value store could not be reached (connectivity or timeout)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but the operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// A stored entry could not be decoded (corruption or format drift)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller supplied an unusable key or TTL
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CacheError {
    /// True if the error indicates the store itself is unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable(_))
    }
}
