//! Logging infrastructure for dupewalk.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Recoverable scan errors are logged as warnings while the scan runs. With
//! the text report they go to stdout so they interleave with the report;
//! the JSON report keeps stdout clean and logs to stderr instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupewalk::logging::{init_logging, LogTarget};
//!
//! // Initialize with verbose mode (-v)
//! init_logging(1, false, LogTarget::Stdout);
//! log::debug!("Debug info here");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Standard output, interleaved with the text report
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

impl From<LogTarget> for Target {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Stdout => Target::Stdout,
            LogTarget::Stderr => Target::Stderr,
        }
    }
}

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Safe to call more than once; only the first call installs a logger.
/// Returns `true` if this call installed it.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `target` - Output stream for log records
pub fn init_logging(verbose: u8, quiet: bool, target: LogTarget) -> bool {
    let rust_log = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    match rust_log {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }
    builder.target(target.into());
    configure_format(&mut builder, verbose);

    let installed = builder.try_init().is_ok();
    if installed {
        match rust_log {
            Some(spec) => log::debug!("Logging initialized from RUST_LOG: {}", spec),
            None => log::debug!(
                "Logging initialized at level: {:?}",
                determine_level(verbose, quiet)
            ),
        }
    }
    installed
}

/// Determine the log level from CLI flags.
///
/// `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Configure the log format based on build type and verbosity.
///
/// - Debug builds: timestamp and level, plus module path with `-v`
/// - Release builds: compact format (level + message only)
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}
