//! Embedding Gateway Daemon
//!
//! Serves text and image embeddings over HTTP, memoized in a shared
//! key-value store.
//!
//! # Usage
//!
//! ```bash
//! embed-daemon start [--foreground] [--port PORT] [--cache-host HOST]
//! embed-daemon stop
//! embed-daemon status
//! embed-daemon query text "some input"
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/embedding-gateway/config.toml)
//! 3. Environment variables (EMBED_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use embed_daemon::{
    handle_config, handle_query, show_status, start_daemon, stop_daemon, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            foreground,
            port,
            cache_host,
            cache_port,
        } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                port,
                cache_host.as_deref(),
                cache_port,
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::Query { endpoint, command } => {
            handle_query(&endpoint, command).await?;
        }
        Commands::Config { command } => {
            handle_config(command)?;
        }
    }

    Ok(())
}
