//! HTTP error mapping.
//!
//! Status codes: 400 for malformed input, 503 for an unreachable store in
//! strict mode, 500 for everything else. A store failure is never reported
//! as a cache miss.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use ulid::Ulid;

use embed_cache::CacheError;
use embed_models::VectorizeError;

/// Error body returned to HTTP callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub request_id: String,
}

/// A request-scoped error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    request_id: Ulid,
}

impl ApiError {
    /// 400: the caller sent something unusable.
    pub fn invalid_input(request_id: Ulid, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            request_id,
        }
    }

    /// 500: something on our side broke.
    pub fn internal(request_id: Ulid, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            request_id,
        }
    }

    /// Map a cache failure surfaced in strict mode.
    pub fn cache(request_id: Ulid, err: CacheError) -> Self {
        let status = match &err {
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CacheError::Store(_) | CacheError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
            request_id,
        }
    }

    /// Map a vectorizer failure.
    pub fn vectorize(request_id: Ulid, err: VectorizeError) -> Self {
        let status = match &err {
            VectorizeError::InvalidInput(_) | VectorizeError::Image(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
            request_id,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                request_id = %self.request_id,
                status = %self.status,
                error = %self.message,
                "Request failed"
            );
        }
        let body = ErrorBody {
            error: self.message,
            request_id: self.request_id.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}
