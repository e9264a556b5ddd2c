//! `deadends validate`: check every canon file under the data directory.

use super::CliResult;
use crate::validation::{DirectoryReport, Validator, validate_directory};
use std::io::{self, Write};
use std::path::Path;

/// Writes a directory report: one line per issue, freshness, then totals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report<W: Write>(writer: &mut W, report: &DirectoryReport) -> io::Result<()> {
    for issue in &report.issues {
        writeln!(writer, "{issue}")?;
    }
    if let Some(freshness) = &report.freshness {
        if !report.issues.is_empty() {
            writeln!(writer)?;
        }
        write!(writer, "{freshness}")?;
    }

    let verdict = if report.passed() { "PASSED" } else { "FAILED" };
    writeln!(
        writer,
        "\n{verdict}: {} files, {} canons, {} errors, {} warnings",
        report.files_checked,
        report.canons_parsed,
        report.error_count(),
        report.warning_count()
    )
}

/// Executes the validate command. Returns whether validation passed.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked or output fails.
pub fn cmd_validate(root: &Path, validator: &Validator) -> CliResult<bool> {
    let report = validate_directory(root, validator)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, &report)?;
    Ok(report.passed())
}
