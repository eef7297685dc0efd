//! HTTP service for the embedding gateway.
//!
//! Provides:
//! - POST /vectorize-text for text embeddings
//! - POST /vectorize-image for base64 image payloads
//! - POST /vectorize-image/upload for multipart image payloads
//! - GET /healthz with a store liveness probe
//!
//! Every vectorization request runs the same path: derive a cache key,
//! consult the cache, and only on a miss run the model and write the result
//! back with the default TTL.

pub mod error;
pub mod health;
pub mod server;
pub mod state;
pub mod vectorize;

pub use error::ApiError;
pub use server::{router, run_server, run_server_with_shutdown};
pub use state::AppState;
