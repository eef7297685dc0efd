//! Process-wide vectorizer registry.
//!
//! Both models are loaded once at daemon startup and shared behind `Arc`
//! for the process lifetime; dropping the registry (on shutdown) releases
//! the model weights.

use std::sync::Arc;

use tracing::info;

use embed_types::ModelSettings;

use crate::error::VectorizeError;
use crate::hub::{ModelSource, IMAGE_MODEL_FILES, TEXT_MODEL_FILES};
use crate::image_model::ResnetImageVectorizer;
use crate::mock::{MockImageVectorizer, MockTextVectorizer};
use crate::model::{ImageVectorizer, TextVectorizer};
use crate::text::BertTextVectorizer;

/// The loaded vectorizer pair.
#[derive(Clone)]
pub struct Vectorizers {
    /// Text embedding model
    pub text: Arc<dyn TextVectorizer>,
    /// Image embedding model
    pub image: Arc<dyn ImageVectorizer>,
}

impl Vectorizers {
    /// Load both models per the settings, downloading files on first use.
    ///
    /// This is the expensive step (model weights); call it once at startup,
    /// not per request.
    pub fn load(settings: &ModelSettings) -> Result<Self, VectorizeError> {
        let text_source = ModelSource::new(&settings.dir, &settings.text_repo, TEXT_MODEL_FILES);
        let image_source = ModelSource::new(&settings.dir, &settings.image_repo, IMAGE_MODEL_FILES);

        info!(
            text_repo = %settings.text_repo,
            image_repo = %settings.image_repo,
            "Loading vectorizers"
        );

        let text = BertTextVectorizer::load(&text_source)?;
        let image = ResnetImageVectorizer::load(&image_source)?;

        info!("Vectorizers ready");

        Ok(Self {
            text: Arc::new(text),
            image: Arc::new(image),
        })
    }

    /// Registry backed by the deterministic mock models.
    pub fn mock() -> Self {
        Self {
            text: Arc::new(MockTextVectorizer::new()),
            image: Arc::new(MockImageVectorizer::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_registry() {
        let vectorizers = Vectorizers::mock();
        assert_eq!(vectorizers.text.info().name, "mock-text");
        assert_eq!(vectorizers.image.info().name, "mock-image");
    }
}
