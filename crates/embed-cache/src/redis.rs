//! Redis-backed key-value store.
//!
//! Holds one multiplexed connection for the process lifetime; individual
//! get/set operations are atomic per key on the server side. Every call is
//! bounded by the configured operation timeout so a stalled store cannot
//! block a request indefinitely.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use tracing::{debug, info};

use embed_types::CacheSettings;

use crate::error::CacheError;
use crate::store::KeyValueStore;

/// Upper bound on establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store client for a shared redis instance.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Connect using `{host, port, db}` from settings.
    ///
    /// Fails with [`CacheError::Unavailable`] if the store cannot be
    /// reached; the caller decides whether that is fatal.
    pub async fn connect(settings: &CacheSettings) -> Result<Self, CacheError> {
        Self::connect_url(&settings.url(), settings.op_timeout()).await
    }

    /// Connect to an explicit redis URL.
    pub async fn connect_url(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        info!(url = %url, "Connecting to key-value store");

        let client = redis::Client::open(url).map_err(classify)?;
        let conn = match tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(classify(e)),
            Err(_) => {
                return Err(CacheError::Unavailable(format!(
                    "connection attempt exceeded {:?}",
                    CONNECT_TIMEOUT
                )))
            }
        };

        debug!("Key-value store connection established");
        Ok(Self { conn, op_timeout })
    }

    /// Run a store operation under the configured timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(CacheError::Unavailable(format!(
                "store operation exceeded {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        self.bounded(async move { conn.get::<_, Option<Vec<u8>>>(key).await })
            .await
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_vec();
        let seconds = ttl.as_secs();
        self.bounded(async move { conn.set_ex::<_, _, ()>(key, value, seconds).await })
            .await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        self.bounded(async move {
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
        })
        .await
    }
}

/// Sort a redis error into the cache taxonomy.
///
/// Connectivity failures (refused, dropped, timed out, other IO) are
/// `Unavailable`; anything else the store actively returned is `Store`.
fn classify(err: RedisError) -> CacheError {
    if err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || err.is_io_error()
    {
        CacheError::Unavailable(err.to_string())
    } else {
        CacheError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_io_error_as_unavailable() {
        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(classify(err).is_unavailable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // No listener on this port; must surface Unavailable, not a miss
        let result =
            RedisStore::connect_url("redis://127.0.0.1:59999/0", Duration::from_millis(500)).await;
        match result {
            Err(CacheError::Unavailable(_)) => {}
            other => panic!("Expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }

    // Tests against a live store, run with:
    // cargo test -p embed-cache -- --ignored

    #[tokio::test]
    #[ignore = "requires a local redis on 6379"]
    async fn test_live_roundtrip() {
        let store = RedisStore::connect_url("redis://127.0.0.1:6379/0", Duration::from_secs(2))
            .await
            .unwrap();
        store
            .set_ex("embed-cache:test:roundtrip", b"[1.0]", Duration::from_secs(5))
            .await
            .unwrap();
        let value = store.get("embed-cache:test:roundtrip").await.unwrap();
        assert_eq!(value, Some(b"[1.0]".to_vec()));
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires a local redis on 6379"]
    async fn test_live_expiry() {
        let store = RedisStore::connect_url("redis://127.0.0.1:6379/0", Duration::from_secs(2))
            .await
            .unwrap();
        store
            .set_ex("embed-cache:test:expiry", b"[1.0]", Duration::from_secs(1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.get("embed-cache:test:expiry").await.unwrap(), None);
    }
}
