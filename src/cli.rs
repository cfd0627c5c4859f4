//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Check and normalize JSON vehicle messages
#[derive(Parser, Debug)]
#[command(name = "vjson")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./vjson.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Encode buffer capacity in bytes (overrides config)
    #[arg(long, value_name = "BYTES", global = true)]
    pub buffer_size: Option<usize>,

    /// Split input on NUL bytes instead of newlines (overrides config)
    #[arg(long, global = true)]
    pub nul: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode every message and report the ones that are rejected
    Check {
        /// Input file (default: stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Decode then re-encode every message in canonical key order
    Canon {
        /// Input file (default: stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Write a config file with default values
    InitConfig {
        /// Destination (default: ./vjson.toml)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

// =============================================================================
// Tests
// =============================================================================
