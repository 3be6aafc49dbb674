//! dupewalk - Concurrent content-based duplicate file finder
//!
//! Walks a directory tree with a bounded pool of workers, hashes every
//! regular file with BLAKE3 and groups files whose content is identical.
//!
//! The pipeline lives in [`scanner`] (traversal and hashing) and
//! [`duplicates`] (aggregation and the finder). [`run_app`] is the
//! command-line entry point used by the binary.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::logging::{init_logging, LogTarget};
use crate::output::write_report;
use crate::signal::{install_handler, ShutdownHandler};

/// Run the application, writing the report to stdout.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the root path cannot
/// be scanned, or the report cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    run_with_output(cli, &mut io::stdout())
}

/// Run the application, writing the report to `writer`.
///
/// Log records are not written to `writer`; with the text report they go
/// to stdout, with the JSON report to stderr.
///
/// # Errors
///
/// Same as [`run_app`].
pub fn run_with_output<W: Write>(cli: Cli, writer: &mut W) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let target = match config.output {
        OutputFormat::Text => LogTarget::Stdout,
        OutputFormat::Json => LogTarget::Stderr,
    };
    init_logging(cli.verbose, cli.quiet, target);
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        writer.write_all(config.to_toml()?.as_bytes())?;
        writer.flush()?;
        return Ok(ExitCode::Success);
    }

    let root = cli.path.as_deref().context("No directory to scan")?;

    let handler = install_handler().unwrap_or_else(|e| {
        log::warn!("{}; Ctrl+C will terminate immediately", e);
        ShutdownHandler::new()
    });

    let finder = DuplicateFinder::new(config.finder_config(handler.flag()));
    let (index, summary) = finder.find_duplicates(root)?;

    let exit_code = if summary.interrupted {
        ExitCode::Interrupted
    } else {
        ExitCode::Success
    };
    write_report(writer, config.output, &index, &summary, exit_code)?;
    Ok(exit_code)
}
