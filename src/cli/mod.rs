//! CLI module for Postvote
//!
//! Provides command-line interface parsing and handling for the postvote-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Postvote - blogging and voting REST API
#[derive(Parser, Debug)]
#[command(
    name = "postvote-server",
    version,
    about = "Postvote - blogging and voting REST API",
    long_about = "A blogging and voting REST API with Argon2id password storage and\n\
                  HS256 bearer sessions.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  postvote-server                      # Start the server (reads postvote.toml)\n    \
                  postvote-server --config my.toml     # Use a custom config file\n    \
                  postvote-server config --validate    # Check the configuration and secret\n    \
                  postvote-server migrate              # Apply pending database migrations"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "postvote.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Show configuration information
    Config {
        /// Validate the configuration file and the signing secret
        #[arg(long)]
        validate: bool,
    },

    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
