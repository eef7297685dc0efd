//! Embedding gateway daemon library exports.
//!
//! This crate provides the CLI daemon binary for the embedding gateway.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, stop, status, query, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ConfigCommands, QueryCommands};
pub use commands::{
    handle_config, handle_query, show_status, start_daemon, stop_daemon,
};
