//! Vectorization handlers.
//!
//! Each request: derive the cache key, consult the cache, and on a miss run
//! the model under `spawn_blocking` and write the result back. Two
//! concurrent misses for the same key both compute and both write; the
//! cache documents that race as accepted.

use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ulid::Ulid;

use embed_cache::CacheKey;
use embed_types::VectorRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// Text vectorization request body.
#[derive(Debug, Deserialize)]
pub struct VectorizeTextRequest {
    pub text: String,
}

/// Base64 image vectorization request body.
#[derive(Debug, Deserialize)]
pub struct VectorizeImageRequest {
    pub image_data: String,
}

/// Where the returned vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Computed,
}

/// Vectorization response body.
#[derive(Debug, Serialize)]
pub struct VectorizeResponse {
    pub vector: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub dimension: usize,
    pub source: Source,
}

impl VectorizeResponse {
    fn from_record(record: VectorRecord, source: Source) -> Self {
        Self {
            dimension: record.embedding.len(),
            vector: record.embedding,
            model: record.model,
            source,
        }
    }
}

/// POST /vectorize-text
pub async fn vectorize_text(
    State(state): State<AppState>,
    Json(req): Json<VectorizeTextRequest>,
) -> Result<Json<VectorizeResponse>, ApiError> {
    let request_id = Ulid::new();

    if req.text.is_empty() {
        return Err(ApiError::invalid_input(request_id, "text must not be empty"));
    }

    debug!(request_id = %request_id, chars = req.text.len(), "Text request");

    let key = CacheKey::text(&req.text).map_err(|e| ApiError::cache(request_id, e))?;
    let vectorizer = state.vectorizers.text.clone();
    let text = req.text;

    let (record, source) = cached_or_compute(&state, request_id, key, move || {
        let name = vectorizer.info().name.clone();
        let embedding = vectorizer.vectorize(&text)?;
        Ok(VectorRecord::generated(embedding.into_values(), name))
    })
    .await?;

    Ok(Json(VectorizeResponse::from_record(record, source)))
}

/// POST /vectorize-image
pub async fn vectorize_image(
    State(state): State<AppState>,
    Json(req): Json<VectorizeImageRequest>,
) -> Result<Json<VectorizeResponse>, ApiError> {
    let request_id = Ulid::new();

    let bytes = BASE64
        .decode(req.image_data.as_bytes())
        .map_err(|e| ApiError::invalid_input(request_id, format!("invalid base64: {}", e)))?;

    vectorize_image_bytes(state, request_id, bytes).await
}

/// POST /vectorize-image/upload
///
/// Multipart alternative; the first part carrying data is taken as the
/// encoded image.
pub async fn vectorize_image_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VectorizeResponse>, ApiError> {
    let request_id = Ulid::new();

    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_input(request_id, format!("invalid multipart: {}", e)))?
        .ok_or_else(|| ApiError::invalid_input(request_id, "missing image part"))?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::invalid_input(request_id, format!("unreadable image part: {}", e)))?
        .to_vec();

    vectorize_image_bytes(state, request_id, bytes).await
}

async fn vectorize_image_bytes(
    state: AppState,
    request_id: Ulid,
    bytes: Vec<u8>,
) -> Result<Json<VectorizeResponse>, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::invalid_input(request_id, "empty image payload"));
    }

    debug!(request_id = %request_id, bytes = bytes.len(), "Image request");

    // Decode before touching the cache so malformed payloads are 400s
    let decoded: DynamicImage = image::load_from_memory(&bytes)
        .map_err(|e| ApiError::invalid_input(request_id, format!("invalid image data: {}", e)))?;

    let key = CacheKey::image(&bytes).map_err(|e| ApiError::cache(request_id, e))?;
    let vectorizer = state.vectorizers.image.clone();

    let (record, source) = cached_or_compute(&state, request_id, key, move || {
        let name = vectorizer.info().name.clone();
        let embedding = vectorizer.vectorize(&decoded)?;
        Ok(VectorRecord::generated(embedding.into_values(), name))
    })
    .await?;

    Ok(Json(VectorizeResponse::from_record(record, source)))
}

/// The memoized call path shared by all vectorization endpoints.
///
/// On a cache hit the vectorizer is never invoked. On a store failure with
/// `fail_open` set, the request degrades to compute-without-cache; the
/// degradation is logged per request, never silent, and a store failure is
/// never treated as a miss.
async fn cached_or_compute<F>(
    state: &AppState,
    request_id: Ulid,
    key: CacheKey,
    compute: F,
) -> Result<(VectorRecord, Source), ApiError>
where
    F: FnOnce() -> Result<VectorRecord, embed_models::VectorizeError> + Send + 'static,
{
    let mut skip_write = false;
    match state.cache.get(&key).await {
        Ok(Some(record)) => {
            debug!(request_id = %request_id, key = %key, "Serving from cache");
            return Ok((record, Source::Cache));
        }
        Ok(None) => {}
        Err(err) if state.fail_open => {
            warn!(
                request_id = %request_id,
                key = %key,
                error = %err,
                "Cache read failed; computing fresh and skipping cache for this request"
            );
            skip_write = true;
        }
        Err(err) => return Err(ApiError::cache(request_id, err)),
    }

    // CPU-bound inference off the async runtime
    let record = tokio::task::spawn_blocking(compute)
        .await
        .map_err(|e| ApiError::internal(request_id, format!("vectorizer task failed: {}", e)))?
        .map_err(|e| ApiError::vectorize(request_id, e))?;

    if !skip_write {
        match state.cache.set(&key, &record).await {
            Ok(()) => {}
            Err(err) if state.fail_open => {
                warn!(
                    request_id = %request_id,
                    key = %key,
                    error = %err,
                    "Cache write failed; serving uncached result"
                );
            }
            Err(err) => return Err(ApiError::cache(request_id, err)),
        }
    }

    Ok((record, Source::Computed))
}
