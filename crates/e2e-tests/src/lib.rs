//! End-to-end test infrastructure for the embedding gateway.
//!
//! Provides a shared TestHarness that runs the real HTTP router in-process
//! against the in-memory store and the deterministic mock vectorizers, so
//! the full key->get->compute->set call path is exercised without redis or
//! model downloads.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use embed_cache::{CacheError, KeyValueStore, MemoryStore, VectorCache};
use embed_client::VectorizeClient;
use embed_models::Vectorizers;
use embed_service::{router, AppState};

/// Shared test harness for E2E tests.
///
/// Owns a running in-process gateway; the server task stops when the
/// harness is dropped.
pub struct TestHarness {
    /// Base URL of the running gateway
    pub endpoint: String,
    /// The store backing the gateway's cache, for direct inspection
    pub store: Arc<MemoryStore>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestHarness {
    /// Start a gateway with a fresh memory store and a one-hour TTL.
    pub async fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600)).await
    }

    /// Start a gateway with a specific default TTL.
    pub async fn with_ttl(default_ttl: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache = VectorCache::new(store.clone(), default_ttl);
        let state = AppState::new(cache, Vectorizers::mock(), true);
        let (endpoint, shutdown_tx, server_handle) = spawn_gateway(state).await;

        Self {
            endpoint,
            store,
            shutdown_tx: Some(shutdown_tx),
            _server_handle: server_handle,
        }
    }

    /// Start a gateway whose store refuses every operation.
    pub async fn with_store_down(fail_open: bool) -> Self {
        let cache = VectorCache::new(Arc::new(DownStore), Duration::from_secs(3600));
        let state = AppState::new(cache, Vectorizers::mock(), fail_open);
        let (endpoint, shutdown_tx, server_handle) = spawn_gateway(state).await;

        Self {
            endpoint,
            store: Arc::new(MemoryStore::new()),
            shutdown_tx: Some(shutdown_tx),
            _server_handle: server_handle,
        }
    }

    /// Create a client pointed at this harness.
    pub fn client(&self) -> VectorizeClient {
        VectorizeClient::new(&self.endpoint)
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Bind an ephemeral port and serve the router on it.
async fn spawn_gateway(
    state: AppState,
) -> (
    String,
    tokio::sync::oneshot::Sender<()>,
    tokio::task::JoinHandle<()>,
) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let app = router(state);
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Test server failed");
    });

    (format!("http://{}", addr), shutdown_tx, server_handle)
}

/// Store that refuses every operation, as if the backend were down.
pub struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Encode a small solid-color PNG for image endpoint tests.
pub fn test_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode test PNG");
    bytes.into_inner()
}
