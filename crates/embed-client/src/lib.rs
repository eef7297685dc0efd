//! HTTP client for the embedding gateway.
//!
//! Used by the daemon's `query` commands and by end-to-end tests.

pub mod client;
pub mod error;

pub use client::{HealthOutcome, VectorizeClient, VectorizeOutcome, DEFAULT_ENDPOINT};
pub use error::ClientError;
