//! Output formatters for duplicate scan results.
//!
//! This module provides the report formats:
//! - Plain text for terminals
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupewalk::cli::OutputFormat;
//! use dupewalk::duplicates::DuplicateFinder;
//! use dupewalk::error::ExitCode;
//! use dupewalk::output::write_report;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (index, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let mut stdout = std::io::stdout().lock();
//! write_report(&mut stdout, OutputFormat::Text, &index, &summary, ExitCode::Success).unwrap();
//! ```

pub mod json;
pub mod text;

use std::io::Write;

pub use json::JsonOutput;
pub use text::write_text;

use crate::cli::OutputFormat;
use crate::duplicates::{DuplicateIndex, ScanSummary};
use crate::error::ExitCode;

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the report in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    index: &DuplicateIndex,
    summary: &ScanSummary,
    exit_code: ExitCode,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => write_text(writer, index, summary)?,
        OutputFormat::Json => JsonOutput::new(index, summary, exit_code).write_to(writer, true)?,
    }
    writer.flush()?;
    Ok(())
}
