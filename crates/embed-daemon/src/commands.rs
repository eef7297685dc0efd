//! Command implementations for the gateway daemon.
//!
//! Handles:
//! - start: load config, connect store, load models, start HTTP server
//! - stop: signal running daemon to stop (via PID file)
//! - status: check if daemon is running
//! - query: call a running gateway over HTTP
//! - config: generate a default config file

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tokio::signal;
use tracing::{info, warn};

use embed_cache::{KeyValueStore, MemoryStore, RedisStore, VectorCache};
use embed_client::VectorizeClient;
use embed_models::Vectorizers;
use embed_service::{run_server_with_shutdown, AppState};
use embed_types::{CacheBackend, Settings};

use crate::cli::{ConfigCommands, QueryCommands};

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("embedding-gateway")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("Wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    let pid_path = pid_file_path();
    fs::read_to_string(&pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // On Unix, sending signal 0 checks if process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // Assume running if PID file exists
    true
}

/// Start the gateway daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Connect to the key-value store
/// 3. Load vectorizer models (downloading on first run)
/// 4. Start the HTTP server
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    port_override: Option<u16>,
    cache_host_override: Option<&str>,
    cache_port_override: Option<u16>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    // Apply CLI overrides (highest precedence)
    if let Some(port) = port_override {
        settings.http.port = port;
    }
    if let Some(host) = cache_host_override {
        settings.cache.host = host.to_string();
    }
    if let Some(port) = cache_port_override {
        settings.cache.port = port;
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Embedding gateway starting...");
    info!("Configuration:");
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Store: {}", settings.cache.url());
    info!("  Default TTL: {}s", settings.cache.default_ttl_secs);
    info!("  Fail open: {}", settings.cache.fail_open);
    info!("  Log level: {}", settings.log_level);

    if !foreground {
        warn!("Background mode not yet implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    // Connect the store (long-lived, shared across requests)
    let store: Arc<dyn KeyValueStore> = match settings.cache.backend {
        CacheBackend::Redis => Arc::new(
            RedisStore::connect(&settings.cache)
                .await
                .context("Failed to connect to key-value store")?,
        ),
        CacheBackend::Memory => {
            warn!("Using in-process memory store; cached vectors are not shared or persistent");
            Arc::new(MemoryStore::new())
        }
    };
    let cache = VectorCache::new(store, settings.cache.default_ttl());

    // Load models once, up front; requests only run inference
    let vectorizers = tokio::task::spawn_blocking({
        let model_settings = settings.models.clone();
        move || Vectorizers::load(&model_settings)
    })
    .await
    .context("Model loading task failed")?
    .context("Failed to load vectorizer models")?;

    let state = AppState::new(cache, vectorizers, settings.cache.fail_open);

    write_pid_file()?;

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    // Create shutdown signal handler
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    };

    let result = run_server_with_shutdown(addr, state, shutdown_signal).await;

    // Cleanup; dropping the state releases the model weights
    remove_pid_file();

    result.map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Daemon not running (stale PID file removed)");
    }

    info!("Stopping daemon (PID {})", pid);

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not yet implemented on this platform");
    }

    Ok(())
}

/// Show daemon status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Embedding gateway is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
            Ok(())
        }
        Some(pid) => {
            println!(
                "Embedding gateway is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
            Ok(())
        }
        None => {
            println!("Embedding gateway is NOT running (no PID file)");
            Ok(())
        }
    }
}

/// Query a running gateway over HTTP.
pub async fn handle_query(endpoint: &str, command: QueryCommands) -> Result<()> {
    let client = VectorizeClient::new(endpoint);

    match command {
        QueryCommands::Text { text } => {
            let outcome = client
                .vectorize_text(&text)
                .await
                .context("Vectorize request failed")?;
            print_outcome(&outcome);
        }
        QueryCommands::Image { path } => {
            let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path))?;
            let outcome = client
                .vectorize_image(&bytes)
                .await
                .context("Vectorize request failed")?;
            print_outcome(&outcome);
        }
        QueryCommands::Health => {
            let health = client.health().await.context("Health request failed")?;
            println!("gateway: {}", health.status);
            println!("cache:   {}", health.cache);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &embed_client::VectorizeOutcome) {
    println!("source:    {}", outcome.source);
    if let Some(model) = &outcome.model {
        println!("model:     {}", model);
    }
    println!("dimension: {}", outcome.dimension);

    // Print a preview rather than hundreds of floats
    let preview: Vec<String> = outcome
        .vector
        .iter()
        .take(8)
        .map(|v| format!("{:.5}", v))
        .collect();
    let suffix = if outcome.vector.len() > 8 { ", ..." } else { "" };
    println!("vector:    [{}{}]", preview.join(", "), suffix);
}

/// Configuration management commands.
pub fn handle_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init { force } => {
            let config_dir = ProjectDirs::from("", "", "embedding-gateway")
                .map(|p| p.config_dir().to_path_buf())
                .context("Could not determine config directory")?;
            let config_path = config_dir.join("config.toml");

            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {:?} (use --force to overwrite)",
                    config_path
                );
            }

            fs::create_dir_all(&config_dir)?;
            let rendered = toml::to_string_pretty(&Settings::default())
                .context("Failed to render default config")?;
            fs::write(&config_path, rendered)?;

            println!("Wrote default config to {:?}", config_path);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_path() {
        let path = pid_file_path();
        assert!(path.ends_with("daemon.pid"));
        assert!(path
            .parent()
            .unwrap()
            .to_string_lossy()
            .contains("embedding-gateway"));
    }

    #[test]
    fn test_default_config_renders() {
        let rendered = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(rendered.contains("[cache]"));
        assert!(rendered.contains("[http]"));
        assert!(rendered.contains("[models]"));
    }
}
