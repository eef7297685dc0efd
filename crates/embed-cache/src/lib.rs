//! # embed-cache
//!
//! Memoization layer for vectorization results, backed by a shared
//! external key-value store.
//!
//! The cache is a thin get/set facade: callers derive a deterministic
//! [`CacheKey`] from the request input, look it up, and on a miss store the
//! freshly computed vector with a time-to-live. Entries expire on their own;
//! there is no explicit invalidation.
//!
//! ## Error contract
//! - An absent or expired entry is `Ok(None)`, never an error.
//! - An unreachable store is [`CacheError::Unavailable`], never a miss.
//! - An undecodable entry is [`CacheError::Serialization`], never a miss.

pub mod cache;
pub mod error;
pub mod keys;
pub mod redis;
pub mod store;

pub use crate::redis::RedisStore;
pub use cache::VectorCache;
pub use error::CacheError;
pub use keys::{CacheKey, IMAGE_NAMESPACE, TEXT_NAMESPACE};
pub use store::{KeyValueStore, MemoryStore};
