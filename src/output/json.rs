//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "representative": "/path/to/file1.txt",
//!       "duplicates": ["/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_bytes": 1048576,
//!     "directories": 12,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "errors": ["Failed to read directory /private: Permission denied"],
//!     "tasks": 12,
//!     "peak_active_tasks": 4,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DW000"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::OutputError;
use crate::duplicates::{DuplicateGroup, DuplicateIndex, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// First file seen with this content
    pub representative: String,
    /// The other files with this content
    pub duplicates: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            representative: path_string(&group.representative),
            duplicates: group.members.iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files successfully digested
    pub total_files: usize,
    /// Bytes digested
    pub total_bytes: u64,
    /// Directories successfully listed
    pub directories: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies (excluding representatives)
    pub duplicate_files: usize,
    /// Total space held by redundant copies (bytes)
    pub reclaimable_space: u64,
    /// Recoverable errors, as messages
    pub errors: Vec<String>,
    /// Traversal tasks run
    pub tasks: usize,
    /// Highest number of traversal tasks running at once
    pub peak_active_tasks: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DW000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_bytes: summary.total_bytes,
            directories: summary.directories,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            errors: summary.errors.iter().map(ToString::to_string).collect(),
            tasks: summary.tasks.completed,
            peak_active_tasks: summary.tasks.peak_active,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups, sorted by representative path
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document from a scan result.
    ///
    /// # Example
    ///
    /// ```
    /// use dupewalk::duplicates::{DuplicateGroup, DuplicateIndex, ScanSummary};
    /// use dupewalk::output::json::JsonOutput;
    /// use dupewalk::error::ExitCode;
    /// use std::path::PathBuf;
    ///
    /// let mut group = DuplicateGroup::new([0u8; 32], 1024, PathBuf::from("/file1.txt"));
    /// group.push(PathBuf::from("/file2.txt"));
    /// let index: DuplicateIndex = vec![group].into_iter().collect();
    ///
    /// let output = JsonOutput::new(&index, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(index: &DuplicateIndex, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: index
                .duplicates()
                .into_iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
