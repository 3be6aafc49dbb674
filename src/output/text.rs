//! Plain-text report.
//!
//! Each duplicate group prints its representative on one line and every
//! other copy on the following lines, indented by a tab. Groups are
//! separated by a blank line and sorted by representative path. A summary
//! block closes the report.

use std::io::{self, Write};

use crate::duplicates::{DuplicateIndex, ScanSummary};

/// Write the text report.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_text<W: Write>(
    writer: &mut W,
    index: &DuplicateIndex,
    summary: &ScanSummary,
) -> io::Result<()> {
    for group in index.duplicates() {
        writeln!(writer, "{}", group.representative.display())?;
        for member in &group.members {
            writeln!(writer, "\t{}", member.display())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "Files scanned: {}", summary.total_files)?;
    writeln!(writer, "Total size: {}", summary.total_size_display())?;
    writeln!(writer, "Duplicate groups: {}", summary.duplicate_groups)?;
    writeln!(writer, "Duplicate files: {}", summary.duplicate_files)?;
    writeln!(
        writer,
        "Reclaimable space: {}",
        summary.reclaimable_display()
    )?;
    writeln!(writer, "Errors: {}", summary.error_count())?;
    if summary.interrupted {
        writeln!(writer, "Scan interrupted; results are partial")?;
    }
    writeln!(writer, "Elapsed: {:.2?}", summary.scan_duration)?;
    Ok(())
}
