//! Shared request-handling state.

use embed_cache::VectorCache;
use embed_models::Vectorizers;

/// State shared by all handlers: the cache facade, the loaded models, and
/// the degradation policy for store failures.
#[derive(Clone)]
pub struct AppState {
    /// Memoization cache over the shared key-value store
    pub cache: VectorCache,
    /// Loaded vectorizer pair
    pub vectorizers: Vectorizers,
    /// When true, a failing store degrades the request to
    /// compute-without-cache instead of surfacing an error
    pub fail_open: bool,
}

impl AppState {
    pub fn new(cache: VectorCache, vectorizers: Vectorizers, fail_open: bool) -> Self {
        Self {
            cache,
            vectorizers,
            fail_open,
        }
    }
}
