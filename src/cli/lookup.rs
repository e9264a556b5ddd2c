//! `deadends lookup`: match an error message and print the best matches.

use super::{CliResult, OutputFormat, write_json, write_yaml};
use crate::models::whole_percent;
use crate::services::{KnowledgeBase, MatchOutcome, UNKNOWN_DOMAIN};
use std::io::{self, Write};

/// Matches printed by the table format.
pub const LOOKUP_TOP_MATCHES: usize = 3;

const RULE_WIDTH: usize = 60;

/// Writes the top matches of `outcome` as a report.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_lookup<W: Write>(
    writer: &mut W,
    text: &str,
    outcome: &MatchOutcome,
    top: usize,
) -> io::Result<()> {
    if outcome.is_empty() {
        writeln!(writer, "No matches for: {text}")?;
        if let Some(domains) = outcome
            .suggested_domains
            .as_deref()
            .filter(|d| *d != UNKNOWN_DOMAIN)
        {
            writeln!(writer, "Likely domains: {domains}")?;
        }
        return Ok(());
    }

    let rule = "=".repeat(RULE_WIDTH);
    for m in outcome.matches.iter().take(top) {
        writeln!(writer, "\n{rule}")?;
        writeln!(writer, "  {}", m.signature)?;
        writeln!(
            writer,
            "  Resolvable: {} | Fix rate: {}%",
            m.resolvable,
            whole_percent(m.fix_success_rate)
        )?;
        writeln!(writer, "  {}", m.summary)?;
        writeln!(writer, "{rule}")?;

        writeln!(writer, "\n  DEAD ENDS (do NOT try):")?;
        for d in &m.dead_ends {
            writeln!(
                writer,
                "    X {} \u{2014} fails {}%",
                d.action,
                whole_percent(d.fail_rate)
            )?;
            writeln!(writer, "      {}", d.why_fails)?;
        }

        writeln!(writer, "\n  WORKAROUNDS (try these):")?;
        for w in &m.workarounds {
            writeln!(
                writer,
                "    > {} \u{2014} works {}%",
                w.action,
                whole_percent(w.success_rate)
            )?;
            if !w.how.is_empty() {
                writeln!(writer, "      {}", w.how)?;
            }
        }

        writeln!(writer, "\n  Details: {}", m.url)?;
    }
    Ok(())
}

/// Executes the lookup command. Returns whether anything matched.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or output fails.
pub fn cmd_lookup(kb: &KnowledgeBase, text: &str, format: OutputFormat) -> CliResult<bool> {
    let outcome = kb.lookup_all(text)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => write_lookup(&mut handle, text, &outcome, LOOKUP_TOP_MATCHES)?,
        OutputFormat::Json => write_json(&mut handle, &outcome)?,
        OutputFormat::Yaml => write_yaml(&mut handle, &outcome)?,
    }
    Ok(!outcome.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;
    use crate::models::testing::canon;

    fn render(outcome: &MatchOutcome) -> String {
        let mut out = Vec::new();
        write_lookup(&mut out, "boom", outcome, LOOKUP_TOP_MATCHES).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_no_match() {
        let text = render(&MatchOutcome {
            matches: Vec::new(),
            suggested_domains: Some("docker, git".to_string()),
        });
        assert_eq!(text, "No matches for: boom\nLikely domains: docker, git\n");

        let unknown = render(&MatchOutcome {
            matches: Vec::new(),
            suggested_domains: Some(UNKNOWN_DOMAIN.to_string()),
        });
        assert_eq!(unknown, "No matches for: boom\n");
    }

    #[test]
    fn test_report_shows_top_three() {
        let matches: Vec<MatchResult> = (0..5)
            .map(|i| MatchResult::from(&canon(&format!("python/e{i}/env"), "Boom", 0.85)))
            .collect();
        let text = render(&MatchOutcome {
            matches,
            suggested_domains: None,
        });
        assert_eq!(text.matches("  Details: ").count(), 3);
        assert!(text.contains("  Resolvable: partial | Fix rate: 85%"));
        assert!(text.contains("    X Reinstall everything \u{2014} fails 80%"));
        assert!(text.contains("    > Try this instead \u{2014} works 60%\n      Run the fix command"));
    }
}
