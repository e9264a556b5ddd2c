//! `deadends search`: weighted keyword search.

use super::{CliResult, OutputFormat, write_json, write_yaml};
use crate::models::{Domain, ScoredSummary, whole_percent};
use crate::services::KnowledgeBase;
use std::io::{self, Write};

/// Writes search results as a table.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(writer: &mut W, results: &[ScoredSummary]) -> io::Result<()> {
    if results.is_empty() {
        writeln!(writer, "No results.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{:<7}{:<10}{:<12}{:<9}SIGNATURE",
        "SCORE", "FIX RATE", "DOMAIN", "RES"
    )?;
    for r in results {
        writeln!(
            writer,
            "{:<7}{:<10}{:<12}{:<9}{}",
            r.score,
            format!("{}%", whole_percent(r.fix_success_rate)),
            r.domain.as_str(),
            r.resolvable.as_str(),
            r.signature
        )?;
        writeln!(writer, "{:<38}{}", "", r.id)?;
    }
    Ok(())
}

/// Executes the search command.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or output fails.
pub fn cmd_search(
    kb: &KnowledgeBase,
    query: &str,
    domain: Option<Domain>,
    limit: usize,
    format: OutputFormat,
) -> CliResult {
    let results = kb.search(query, domain, limit)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            write_table(&mut handle, &results)?;
            Ok(())
        },
        OutputFormat::Json => write_json(&mut handle, &results),
        OutputFormat::Yaml => write_yaml(&mut handle, &results),
    }
}
