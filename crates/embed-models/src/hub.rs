//! Model file caching.
//!
//! Downloads model files from HuggingFace Hub into a local directory so the
//! gateway works offline after the first run.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::VectorizeError;

/// Files required by the text model.
pub const TEXT_MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Files required by the image model.
pub const IMAGE_MODEL_FILES: &[&str] = &["resnet50.safetensors"];

/// Where a model's files live locally and which repository provides them.
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Root directory for downloaded model files
    pub cache_dir: PathBuf,
    /// Model repository ID on HuggingFace Hub
    pub repo_id: String,
    /// Files the model needs
    pub files: &'static [&'static str],
}

impl ModelSource {
    /// Describe a model source under a cache directory.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        repo_id: impl Into<String>,
        files: &'static [&'static str],
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
            files,
        }
    }

    /// Default cache directory when none is configured.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("embedding-gateway")
            .join("models")
    }

    /// Directory holding this model's files.
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    /// Check whether every required file is present locally.
    pub fn is_cached(&self) -> bool {
        let model_dir = self.model_dir();
        self.files.iter().all(|f| model_dir.join(f).exists())
    }

    /// Path to a specific model file.
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }
}

/// Ensure all files for a model are present locally, downloading if needed.
pub fn fetch_model_files(source: &ModelSource) -> Result<(), VectorizeError> {
    if source.is_cached() {
        debug!(path = ?source.model_dir(), "Using cached model files");
        return Ok(());
    }

    info!(repo = %source.repo_id, "Downloading model files...");
    download_model_files(source)
}

fn download_model_files(source: &ModelSource) -> Result<(), VectorizeError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| VectorizeError::Download(e.to_string()))?;
    let repo = api.model(source.repo_id.clone());

    std::fs::create_dir_all(source.model_dir())?;

    for filename in source.files {
        info!(file = filename, "Downloading...");
        let fetched = repo
            .get(filename)
            .map_err(|e| VectorizeError::Download(format!("{}: {}", filename, e)))?;

        let dest = source.file_path(filename);
        std::fs::copy(&fetched, &dest)?;
        debug!(file = filename, "Downloaded to {:?}", dest);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_dir_flattens_repo_id() {
        let source = ModelSource::new("/tmp/models", "org/model", TEXT_MODEL_FILES);
        assert!(source.model_dir().ends_with("org_model"));
    }

    #[test]
    fn test_is_cached_empty_dir() {
        let temp = TempDir::new().unwrap();
        let source = ModelSource::new(temp.path(), "test/model", TEXT_MODEL_FILES);
        assert!(!source.is_cached());
    }

    #[test]
    fn test_is_cached_when_files_present() {
        let temp = TempDir::new().unwrap();
        let source = ModelSource::new(temp.path(), "test/model", IMAGE_MODEL_FILES);

        std::fs::create_dir_all(source.model_dir()).unwrap();
        for f in source.files {
            std::fs::write(source.file_path(f), b"stub").unwrap();
        }
        assert!(source.is_cached());
    }

    #[test]
    fn test_default_cache_dir_is_namespaced() {
        let dir = ModelSource::default_cache_dir();
        assert!(dir.to_string_lossy().contains("embedding-gateway"));
    }
}
