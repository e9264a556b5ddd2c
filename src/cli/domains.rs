//! `deadends domains`: list domains with counts.

use super::{CliResult, OutputFormat, write_json, write_yaml};
use crate::models::DomainSummary;
use crate::services::KnowledgeBase;
use std::io::{self, Write};

/// Writes domains as a table, with signatures underneath when present.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(writer: &mut W, domains: &[DomainSummary]) -> io::Result<()> {
    let total: usize = domains.iter().map(|d| d.count).sum();
    writeln!(writer, "{:<14}ERRORS", "DOMAIN")?;
    for d in domains {
        writeln!(writer, "{:<14}{}", d.domain.as_str(), d.count)?;
        for entry in &d.signatures {
            writeln!(writer, "    {}  ({})", entry.signature, entry.id)?;
        }
    }
    writeln!(writer, "\nTotal: {total} errors in {} domains", domains.len())?;
    Ok(())
}

/// Executes the domains command.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or output fails.
pub fn cmd_domains(kb: &KnowledgeBase, with_signatures: bool, format: OutputFormat) -> CliResult {
    let domains = kb.list_domains(with_signatures)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            write_table(&mut handle, &domains)?;
            Ok(())
        },
        OutputFormat::Json => write_json(&mut handle, &domains),
        OutputFormat::Yaml => write_yaml(&mut handle, &domains),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonId, Domain, SignatureEntry};

    #[test]
    fn test_write_table() {
        let domains = vec![
            DomainSummary {
                domain: Domain::Docker,
                count: 1,
                signatures: vec![SignatureEntry {
                    id: CanonId::from("docker/oom/env"),
                    signature: "OOMKilled".to_string(),
                }],
            },
            DomainSummary {
                domain: Domain::Python,
                count: 2,
                signatures: Vec::new(),
            },
        ];
        let mut out = Vec::new();
        write_table(&mut out, &domains).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "DOMAIN        ERRORS\n\
             docker        1\n    OOMKilled  (docker/oom/env)\n\
             python        2\n\
             \nTotal: 3 errors in 2 domains\n"
        );
    }
}
