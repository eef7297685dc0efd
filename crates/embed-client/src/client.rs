//! Gateway client for vectorization requests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::ClientError;

/// Default endpoint for a locally running gateway.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Result of a vectorization call.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizeOutcome {
    /// The embedding values
    pub vector: Vec<f32>,
    /// Producing model, when the gateway reports one
    #[serde(default)]
    pub model: Option<String>,
    /// Embedding dimension
    pub dimension: usize,
    /// "cache" or "computed"
    pub source: String,
}

#[derive(Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ImageBody {
    image_data: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthOutcome {
    pub status: String,
    pub cache: String,
}

/// Client for the embedding gateway's HTTP API.
pub struct VectorizeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl VectorizeClient {
    /// Create a client for the given endpoint (e.g. `http://127.0.0.1:8080`).
    pub fn new(endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client for the default local endpoint.
    pub fn new_default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Vectorize a text input.
    pub async fn vectorize_text(&self, text: &str) -> Result<VectorizeOutcome, ClientError> {
        debug!(chars = text.len(), "vectorize-text request");
        let response = self
            .http
            .post(format!("{}/vectorize-text", self.endpoint))
            .json(&TextBody { text })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Vectorize raw encoded image bytes (base64 transport).
    pub async fn vectorize_image(&self, image_bytes: &[u8]) -> Result<VectorizeOutcome, ClientError> {
        debug!(bytes = image_bytes.len(), "vectorize-image request");
        let response = self
            .http
            .post(format!("{}/vectorize-image", self.endpoint))
            .json(&ImageBody {
                image_data: BASE64.encode(image_bytes),
            })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Vectorize raw encoded image bytes via multipart upload.
    pub async fn vectorize_image_upload(
        &self,
        image_bytes: &[u8],
        filename: &str,
    ) -> Result<VectorizeOutcome, ClientError> {
        debug!(bytes = image_bytes.len(), "vectorize-image upload request");
        let part = reqwest::multipart::Part::bytes(image_bytes.to_vec())
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);
        let response = self
            .http
            .post(format!("{}/vectorize-image/upload", self.endpoint))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Probe gateway health.
    pub async fn health(&self) -> Result<HealthOutcome, ClientError> {
        let response = self
            .http
            .get(format!("{}/healthz", self.endpoint))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = VectorizeClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_default_endpoint() {
        let client = VectorizeClient::new_default();
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
    }
}
