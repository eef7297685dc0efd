//! Configuration loading for the embedding gateway.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! Config file lives at ~/.config/embedding-gateway/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::GatewayError;

/// Which key-value backend the cache uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Shared redis instance (default)
    #[default]
    Redis,
    /// Process-local store, for development and tests
    Memory,
}

/// Key-value store and memoization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Cache backend selection
    #[serde(default)]
    pub backend: CacheBackend,

    /// Store host
    #[serde(default = "default_cache_host")]
    pub host: String,

    /// Store TCP port
    #[serde(default = "default_cache_port")]
    pub port: u16,

    /// Logical database index within the store
    #[serde(default)]
    pub db: u32,

    /// Default entry lifetime in seconds
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Upper bound on a single store operation, in milliseconds
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,

    /// When true, a failing store degrades requests to compute-without-cache
    /// (logged). When false, store failures surface to the caller.
    #[serde(default = "default_fail_open")]
    pub fail_open: bool,
}

fn default_cache_host() -> String {
    "localhost".to_string()
}

fn default_cache_port() -> u16 {
    6379
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_op_timeout_ms() -> u64 {
    2000
}

fn default_fail_open() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            host: default_cache_host(),
            port: default_cache_port(),
            db: 0,
            default_ttl_secs: default_ttl_secs(),
            op_timeout_ms: default_op_timeout_ms(),
            fail_open: default_fail_open(),
        }
    }
}

impl CacheSettings {
    /// Connection URL for the redis backend.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }

    /// Default TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Per-operation timeout as a duration.
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl_secs == 0 {
            return Err("default_ttl_secs must be > 0".to_string());
        }
        if self.op_timeout_ms == 0 {
            return Err("op_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Bind host
    #[serde(default = "default_http_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_http_port")]
    pub port: u16,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

/// Model file locations and repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Directory for downloaded model files
    #[serde(default = "default_model_dir")]
    pub dir: String,

    /// HuggingFace repository for the text model
    #[serde(default = "default_text_repo")]
    pub text_repo: String,

    /// HuggingFace repository for the image model
    #[serde(default = "default_image_repo")]
    pub image_repo: String,
}

fn default_model_dir() -> String {
    ProjectDirs::from("", "", "embedding-gateway")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from(".cache/models"))
        .to_string_lossy()
        .to_string()
}

fn default_text_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_image_repo() -> String {
    "lmz/candle-resnet".to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            text_repo: default_text_repo(),
            image_repo: default_image_repo(),
        }
    }
}

/// Main application settings.
///
/// `log_level` precedes the nested sections so the TOML rendering of the
/// defaults is valid (values before tables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Key-value store and memoization settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Model file settings
    #[serde(default)]
    pub models: ModelSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            cache: CacheSettings::default(),
            http: HttpSettings::default(),
            models: ModelSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/embedding-gateway/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (EMBED_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, GatewayError> {
        let config_dir = ProjectDirs::from("", "", "embedding-gateway")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("cache.host", default_cache_host())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("cache.port", default_cache_port() as i64)
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("cache.db", 0i64)
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("http.host", default_http_host())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("http.port", default_http_port() as i64)
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("models.dir", default_model_dir())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("models.text_repo", default_text_repo())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .set_default("models.image_repo", default_image_repo())
            .map_err(|e| GatewayError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: EMBED_CACHE_HOST, EMBED_CACHE_PORT, EMBED_HTTP_PORT, etc.
        builder = builder.add_source(
            Environment::with_prefix("EMBED")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        settings
            .cache
            .validate()
            .map_err(GatewayError::Config)?;

        Ok(settings)
    }

    /// Socket address string for the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}
