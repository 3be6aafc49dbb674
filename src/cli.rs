//! Command-line interface definitions for dupewalk.
//!
//! This module defines all CLI arguments using the clap derive API.
//! Every scan option can also come from the configuration file or the
//! environment; flags given here take precedence.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and print duplicate groups
//! dupewalk ~/Downloads
//!
//! # Limit concurrency and emit JSON
//! dupewalk -j 2 --output json ~/Downloads
//!
//! # Verbose mode for debugging
//! dupewalk -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Concurrent content-based duplicate file finder.
///
/// dupewalk walks a directory tree with a bounded pool of workers, hashes
/// every file with BLAKE3 and reports files that share identical content.
#[derive(Debug, Parser)]
#[command(name = "dupewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH", required_unless_present = "print_config")]
    pub path: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Maximum number of directories processed concurrently
    #[arg(short, long, value_name = "N", value_parser = parse_positive)]
    pub jobs: Option<usize>,

    /// Capacity of the queue between walkers and the aggregator (0 = rendezvous)
    #[arg(long, value_name = "N")]
    pub channel_capacity: Option<usize>,

    /// Follow symbolic links during scan
    ///
    /// Directories reached through links are visited at most once.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Do not descend more than N directories below PATH
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parse a strictly positive integer.
///
/// # Errors
///
/// Returns an error message for zero or non-numeric input.
pub fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid number '{}': {}", s, e)),
    }
}
