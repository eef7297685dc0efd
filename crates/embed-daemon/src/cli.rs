//! CLI argument parsing for the embedding gateway daemon.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Embedding Gateway Daemon
///
/// Serves text and image embeddings over HTTP, memoized in a shared
/// key-value store.
#[derive(Parser, Debug)]
#[command(name = "embed-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/embedding-gateway/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override key-value store host
        #[arg(long)]
        cache_host: Option<String>,

        /// Override key-value store port
        #[arg(long)]
        cache_port: Option<u16>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status
    Status,

    /// Query a running gateway
    Query {
        /// HTTP endpoint (default: http://127.0.0.1:8080)
        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        endpoint: String,

        #[command(subcommand)]
        command: QueryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Query subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommands {
    /// Vectorize a text input
    Text {
        /// The text to vectorize
        text: String,
    },

    /// Vectorize an image file
    Image {
        /// Path to the encoded image file
        path: String,
    },

    /// Check gateway and store health
    Health,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_start_foreground() {
        let cli = Cli::parse_from(["embed-daemon", "start", "--foreground"]);
        match cli.command {
            Commands::Start { foreground, .. } => assert!(foreground),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_start_with_port() {
        let cli = Cli::parse_from(["embed-daemon", "start", "-p", "9999"]);
        match cli.command {
            Commands::Start { port, .. } => assert_eq!(port, Some(9999)),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_start_with_cache_overrides() {
        let cli = Cli::parse_from([
            "embed-daemon",
            "start",
            "--cache-host",
            "redis.internal",
            "--cache-port",
            "6380",
        ]);
        match cli.command {
            Commands::Start {
                cache_host,
                cache_port,
                ..
            } => {
                assert_eq!(cache_host, Some("redis.internal".to_string()));
                assert_eq!(cache_port, Some(6380));
            }
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["embed-daemon", "--config", "/path/to/config.toml", "start"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
    }

    #[test]
    fn test_cli_status_and_stop() {
        assert!(matches!(
            Cli::parse_from(["embed-daemon", "status"]).command,
            Commands::Status
        ));
        assert!(matches!(
            Cli::parse_from(["embed-daemon", "stop"]).command,
            Commands::Stop
        ));
    }

    #[test]
    fn test_cli_query_text() {
        let cli = Cli::parse_from(["embed-daemon", "query", "text", "hello world"]);
        match cli.command {
            Commands::Query { command, .. } => match command {
                QueryCommands::Text { text } => assert_eq!(text, "hello world"),
                _ => panic!("Expected Text query"),
            },
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_query_with_endpoint() {
        let cli = Cli::parse_from([
            "embed-daemon",
            "query",
            "-e",
            "http://localhost:9999",
            "health",
        ]);
        match cli.command {
            Commands::Query { endpoint, .. } => {
                assert_eq!(endpoint, "http://localhost:9999");
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_config_init() {
        let cli = Cli::parse_from(["embed-daemon", "config", "init", "--force"]);
        match cli.command {
            Commands::Config { command } => match command {
                ConfigCommands::Init { force } => assert!(force),
            },
            _ => panic!("Expected Config command"),
        }
    }
}
