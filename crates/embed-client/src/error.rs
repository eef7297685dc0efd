//! Error types for the gateway client.

use thiserror::Error;

/// Errors that can occur when calling the gateway.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, protocol)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with an error status
    #[error("Gateway error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
