//! Key-value store abstraction.
//!
//! The cache only needs three operations from its backing store: a single-key
//! read, a single-key write with expiry, and a liveness probe. Each operation
//! is atomic on its own; no compound atomicity is assumed or provided.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::CacheError;

/// Minimal interface over an external key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for a key. Absent (or expired) keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Write a value with a relative expiry, unconditionally overwriting.
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Probe store liveness.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Process-local store with per-entry deadlines.
///
/// Backs the `memory` cache backend and the test suites. Expiry is enforced
/// lazily on read, which is indistinguishable from eager expiry through the
/// `KeyValueStore` interface.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        entries.values().filter(|(_, dl)| *dl > now).count()
    }

    /// True if no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let deadline = Instant::now() + ttl;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_vec(), deadline));
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store
            .set_ex("k", b"value", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry_honored() {
        let store = MemoryStore::new();
        store
            .set_ex("k", b"v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_wins() {
        let store = MemoryStore::new();
        store
            .set_ex("k", b"first", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_ex("k", b"second", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_ping_always_ok() {
        let store = MemoryStore::new();
        assert!(store.ping().await.is_ok());
    }
}
