//! Process exit codes and machine-readable error reports.

use serde::Serialize;

/// Exit codes for dupewalk.
///
/// Recoverable scan errors (unreadable directories or files) do not change
/// the exit code. Usage errors exit with 2 through clap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The scan completed and a report was printed.
    Success = 0,
    /// The scan could not run (bad root path, invalid configuration, internal failure).
    GeneralError = 1,
    /// Ctrl+C stopped the scan; a partial report was printed.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DW000",
            Self::GeneralError => "DW001",
            Self::Interrupted => "DW130",
        }
    }
}

/// Fatal error rendered as JSON on stderr when the JSON report was requested.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
