//! Command definitions and structures for the CLI
//!
//! This module contains all the clap-based command line argument definitions,
//! including the main CLI structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "wrapped-error")]
#[command(about = "Build, encode and inspect context-carrying error chains")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user configuration directory)
    #[arg(long, global = true, env = "WRAPPED_ERROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a chain from contexts and write its binary encoding
    Encode {
        /// Link contexts, outermost first
        #[arg(required = true)]
        contexts: Vec<String>,

        /// Message of an opaque error at the end of the chain
        #[arg(long)]
        cause: Option<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Compress the encoding with zlib (default)
        #[arg(long, overrides_with = "no_compress")]
        compress: bool,

        /// Write the encoding without compression
        #[arg(long, overrides_with = "compress")]
        no_compress: bool,
    },

    /// Decode a file and print its chain
    Inspect {
        /// Encoded chain
        file: PathBuf,

        /// Print JSON instead of the trace
        #[arg(long)]
        json: bool,

        /// Use the full JSON shape
        #[arg(long, requires = "json")]
        full: bool,
    },

    /// Parse a rendered message into a chain
    Parse {
        /// Rendered message, links separated by ": "
        text: String,

        /// Print JSON instead of the trace
        #[arg(long)]
        json: bool,
    },

    /// Decode a file and render it through a template
    Format {
        /// Encoded chain
        file: PathBuf,

        /// Template containing ${{XXX}} tokens
        template: String,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set configuration value
    Set {
        /// Configuration key (e.g., capture_process)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
}
