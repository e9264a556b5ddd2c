//! `deadends stats`: per-domain statistics.

use super::{CliResult, OutputFormat, write_json, write_yaml};
use crate::models::{Domain, DomainStats};
use crate::services::KnowledgeBase;
use std::io::{self, Write};

/// Writes domain statistics as a table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(writer: &mut W, stats: &DomainStats) -> io::Result<()> {
    writeln!(writer, "Domain:           {}", stats.domain)?;
    writeln!(writer, "Errors:           {}", stats.total)?;
    writeln!(writer, "Avg fix rate:     {:.2}", stats.avg_fix_rate)?;
    writeln!(
        writer,
        "Resolvable:       true {} / partial {} / false {}",
        stats.resolvable.yes, stats.resolvable.partial, stats.resolvable.no
    )?;
    writeln!(
        writer,
        "Confidence:       high {} / medium {} / low {}",
        stats.confidence.high, stats.confidence.medium, stats.confidence.low
    )?;
    if !stats.top_categories.is_empty() {
        writeln!(writer, "\n{:<24}COUNT", "CATEGORY")?;
        for c in &stats.top_categories {
            writeln!(writer, "{:<24}{}", c.category, c.count)?;
        }
    }
    Ok(())
}

/// Executes the stats command.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or output fails.
pub fn cmd_stats(kb: &KnowledgeBase, domain: Domain, format: OutputFormat) -> CliResult {
    let stats = kb.domain_stats(domain)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            write_table(&mut handle, &stats)?;
            Ok(())
        },
        OutputFormat::Json => write_json(&mut handle, &stats),
        OutputFormat::Yaml => write_yaml(&mut handle, &stats),
    }
}
