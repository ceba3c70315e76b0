//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Owner id used by commands when `--owner` is not given
pub const DEFAULT_CLI_OWNER: &str = "cli";

/// Shortener - shortlink persistence and generation engine
#[derive(Parser)]
#[command(name = "shortener")]
#[command(version)]
#[command(about = "Shortlink persistence and generation engine", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the engine until Ctrl+C (default)
    Serve,

    /// Shorten a single URL
    Shorten {
        /// The long URL
        url: String,

        #[arg(long, default_value = DEFAULT_CLI_OWNER)]
        owner: String,

        /// Code length; 0 or negative uses the configured default
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        length: i32,
    },

    /// Shorten every URL in a JSON file of `[{"url": ..., "correlation_id": ...}]`
    ShortenBatch {
        file_path: String,

        #[arg(long, default_value = DEFAULT_CLI_OWNER)]
        owner: String,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        length: i32,
    },

    /// Look up a code across all owners
    Resolve { uid: String },

    /// List an owner's links
    List {
        #[arg(long, default_value = DEFAULT_CLI_OWNER)]
        owner: String,
    },

    /// Soft-delete links owned by `--owner`
    Delete {
        #[arg(required = true)]
        uids: Vec<String>,

        #[arg(long, default_value = DEFAULT_CLI_OWNER)]
        owner: String,
    },

    /// Check that the storage backend is reachable
    Ping,

    /// Generate an example configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
