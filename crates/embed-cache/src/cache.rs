//! Memoization facade over the key-value store.
//!
//! `VectorCache` is stateless aside from its store handle. It performs no
//! locking around the caller's get-then-set sequence: two concurrent misses
//! for the same key both recompute and both write, and the last write wins.
//! That duplicate work is accepted; the vectorizers are deterministic per
//! model version, so the values agree.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use embed_types::VectorRecord;

use crate::error::CacheError;
use crate::keys::CacheKey;
use crate::store::KeyValueStore;

/// TTL memoization cache for vectorization results.
#[derive(Clone)]
pub struct VectorCache {
    store: Arc<dyn KeyValueStore>,
    default_ttl: Duration,
}

impl VectorCache {
    /// Create a cache over a store with the given default entry lifetime.
    pub fn new(store: Arc<dyn KeyValueStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// The TTL applied by [`VectorCache::set`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a previously stored vector.
    ///
    /// Absent and expired entries are `Ok(None)`. A stored record that is
    /// present in the store is always a hit, whatever its value; empty and
    /// all-zero embeddings are not conflated with misses.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<VectorRecord>, CacheError> {
        match self.store.get(key.as_str()).await? {
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
            Some(bytes) => {
                let record = decode_record(&bytes)?;
                debug!(key = %key, dim = record.dimension(), "Cache hit");
                Ok(Some(record))
            }
        }
    }

    /// Store a vector under the default TTL.
    pub async fn set(&self, key: &CacheKey, record: &VectorRecord) -> Result<(), CacheError> {
        self.set_with_ttl(key, record, self.default_ttl).await
    }

    /// Store a vector with an explicit TTL, overwriting unconditionally.
    pub async fn set_with_ttl(
        &self,
        key: &CacheKey,
        record: &VectorRecord,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if ttl.as_secs() == 0 {
            return Err(CacheError::InvalidInput(
                "TTL must be at least one second".to_string(),
            ));
        }

        let bytes = encode_record(record)?;
        self.store.set_ex(key.as_str(), &bytes, ttl).await?;
        debug!(key = %key, dim = record.dimension(), ttl_secs = ttl.as_secs(), "Cached vector");
        Ok(())
    }

    /// Probe the backing store.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.store.ping().await
    }
}

/// Accepted stored forms: the record object, or a bare array of numbers
/// left by older writers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredForm {
    Record(VectorRecord),
    Bare(Vec<f32>),
}

fn decode_record(bytes: &[u8]) -> Result<VectorRecord, CacheError> {
    let form: StoredForm = serde_json::from_slice(bytes)
        .map_err(|e| CacheError::Serialization(format!("undecodable cache entry: {}", e)))?;
    Ok(match form {
        StoredForm::Record(record) => record,
        StoredForm::Bare(embedding) => VectorRecord::bare(embedding),
    })
}

fn encode_record(record: &VectorRecord) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(record).map_err(|e| CacheError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_cache() -> VectorCache {
        VectorCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let cache = test_cache();
        let key = CacheKey::text("never set").unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get_returns_record() {
        let cache = test_cache();
        let key = CacheKey::text("hello").unwrap();
        let record = VectorRecord::generated(vec![0.1, 0.2, 0.3], "test-model");

        cache.set(&key, &record).await.unwrap();
        let got = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(got, record);
    }

    #[tokio::test]
    async fn test_overwrite_last_writer_wins() {
        let cache = test_cache();
        let key = CacheKey::text("hello").unwrap();

        cache
            .set(&key, &VectorRecord::bare(vec![1.0]))
            .await
            .unwrap();
        cache
            .set(&key, &VectorRecord::bare(vec![2.0]))
            .await
            .unwrap();

        let got = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(got.embedding, vec![2.0]);
    }

    #[tokio::test]
    async fn test_expiry_returns_absent() {
        let cache = test_cache();
        let key = CacheKey::text("short lived").unwrap();
        let record = VectorRecord::bare(vec![0.5]);

        cache
            .set_with_ttl(&key, &record, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let cache = test_cache();
        let key = CacheKey::text("hello").unwrap();
        let result = cache
            .set_with_ttl(&key, &VectorRecord::bare(vec![1.0]), Duration::ZERO)
            .await;
        assert!(matches!(result, Err(CacheError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_empty_and_zero_vectors_are_hits() {
        let cache = test_cache();

        let empty_key = CacheKey::text("empty").unwrap();
        cache
            .set(&empty_key, &VectorRecord::bare(vec![]))
            .await
            .unwrap();
        let got = cache.get(&empty_key).await.unwrap();
        assert_eq!(got, Some(VectorRecord::bare(vec![])));

        let zero_key = CacheKey::text("zeros").unwrap();
        cache
            .set(&zero_key, &VectorRecord::bare(vec![0.0; 8]))
            .await
            .unwrap();
        let got = cache.get(&zero_key).await.unwrap().unwrap();
        assert_eq!(got.embedding, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        let cache = VectorCache::new(store.clone(), Duration::from_secs(3600));
        let key = CacheKey::text("hello").unwrap();

        store
            .set_ex(key.as_str(), b"not json at all", Duration::from_secs(60))
            .await
            .unwrap();

        let result = cache.get(&key).await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_bare_array_form_accepted() {
        let store = Arc::new(MemoryStore::new());
        let cache = VectorCache::new(store.clone(), Duration::from_secs(3600));
        let key = CacheKey::text("legacy").unwrap();

        // Older writers stored the embedding as a bare JSON array
        store
            .set_ex(key.as_str(), b"[0.25, -1.5, 3.0]", Duration::from_secs(60))
            .await
            .unwrap();

        let record = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(record.embedding, vec![0.25, -1.5, 3.0]);
        assert!(record.model.is_none());
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_precision() {
        let cache = test_cache();
        let key = CacheKey::text("precision").unwrap();
        let values = vec![0.1_f32, 1.0 / 3.0, f32::MIN_POSITIVE, 1e-38, 123456.78];
        let record = VectorRecord::generated(values.clone(), "test-model");

        cache.set(&key, &record).await.unwrap();
        let got = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(got.embedding, values);
    }

    #[tokio::test]
    async fn test_cold_key_computed_then_cached() {
        // Never set -> absent -> caller computes -> set -> hit within TTL
        let cache = test_cache();
        let key = CacheKey::text("hello").unwrap();
        assert_eq!(key.as_str(), "text_vector:hello");

        assert!(cache.get(&key).await.unwrap().is_none());

        let fresh = VectorRecord::bare(vec![0.1, 0.2, 0.3]);
        cache
            .set_with_ttl(&key, &fresh, Duration::from_secs(3600))
            .await
            .unwrap();

        let got = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(got.embedding, vec![0.1, 0.2, 0.3]);
    }
}
