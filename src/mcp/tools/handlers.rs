//! Tool execution handlers.
//!
//! Every handler renders markdown-ish text for an agent to read; structured
//! JSON is only returned by `get_error_detail`.

use super::ToolResult;
use crate::mcp::tool_types::{
    DomainStatsArgs, GetErrorDetailArgs, LookupErrorArgs, SearchErrorsArgs,
};
use crate::models::{MatchResult, whole_percent as percent};
use crate::services::{CanonLookup, KnowledgeBase, UNKNOWN_DOMAIN, suggest_domains};
use crate::{Error, Result};
use std::fmt::Write as _;

/// Renders one match: verdict, dead ends, workarounds, follow-on errors.
#[must_use]
pub fn render_match(m: &MatchResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}", m.signature);
    let _ = writeln!(
        out,
        "Resolvable: {} | Fix rate: {}",
        m.resolvable, m.fix_success_rate
    );
    let _ = writeln!(out, "Summary: {}", m.summary);
    out.push_str("\n### Dead Ends (DO NOT TRY):\n");
    for d in &m.dead_ends {
        let _ = writeln!(
            out,
            "- {} (fails {}%): {}",
            d.action,
            percent(d.fail_rate),
            d.why_fails
        );
    }
    out.push_str("\n### Workarounds (TRY THESE):\n");
    for w in &m.workarounds {
        let _ = write!(out, "- {} (works {}%)", w.action, percent(w.success_rate));
        if !w.how.is_empty() {
            let _ = write!(out, " \u{2014} `{}`", w.how);
        }
        out.push('\n');
    }
    if !m.leads_to.is_empty() {
        out.push_str("\n### Next Errors (after fixing this):\n");
        for id in &m.leads_to {
            let _ = writeln!(out, "- {id}");
        }
    }
    let _ = writeln!(out, "\nFull details: {}", m.url);
    out
}

/// Renders up to `max` matches, separated by a blank line.
#[must_use]
pub fn render_lookup(matches: &[MatchResult], max: usize) -> String {
    matches
        .iter()
        .take(max)
        .map(render_match)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn lookup_error(kb: &KnowledgeBase, args: &LookupErrorArgs, max: usize) -> Result<ToolResult> {
    let outcome = kb.lookup_all(&args.error_message)?;
    if !outcome.is_empty() {
        return Ok(ToolResult::text(render_lookup(&outcome.matches, max)));
    }

    let corpus = kb.corpus()?;
    let suggested = outcome
        .suggested_domains
        .unwrap_or_else(|| suggest_domains(&args.error_message));

    let mut text = format!(
        "No matching errors found in the deadends database.\n\n\
         Searched {} error patterns across {} domains.\n",
        corpus.len(),
        corpus.domain_counts().len()
    );
    if suggested != UNKNOWN_DOMAIN {
        let _ = write!(
            text,
            "Likely domains based on keywords: {suggested}\n\
             The error may not be in our database yet.\n"
        );
    }
    text.push_str(
        "\nTip: Try the full error message including the error type \
         (e.g., 'ModuleNotFoundError: ...').",
    );
    Ok(ToolResult::text(text))
}

pub fn get_error_detail(kb: &KnowledgeBase, args: &GetErrorDetailArgs) -> Result<ToolResult> {
    let text = match kb.get(&args.error_id)? {
        CanonLookup::Found(canon) => serde_json::to_string_pretty(canon)
            .map_err(|e| Error::operation("render_canon", e))?,
        CanonLookup::NotFound { suggestions } if !suggestions.is_empty() => {
            let list: Vec<String> = suggestions.iter().map(|s| format!("- {s}")).collect();
            format!(
                "Error ID not found: {}\n\nDid you mean one of these?\n{}",
                args.error_id,
                list.join("\n")
            )
        },
        CanonLookup::NotFound { .. } => format!(
            "Error ID not found: {}\n\n\
             Use list_error_domains to see available domains, \
             or lookup_error to search by error message.",
            args.error_id
        ),
    };
    Ok(ToolResult::text(text))
}

pub fn list_error_domains(kb: &KnowledgeBase) -> Result<ToolResult> {
    let corpus = kb.corpus()?;
    let mut text = format!("Total errors: {}\n\n", corpus.len());
    for summary in kb.list_domains(false)? {
        let _ = writeln!(text, "- {}: {} errors", summary.domain, summary.count);
    }
    text.push_str(
        "\nUse lookup_error to search by error message, or get_error_detail \
         with an ID like 'python/modulenotfounderror/py311-linux'.",
    );
    Ok(ToolResult::text(text))
}

pub fn search_errors(
    kb: &KnowledgeBase,
    args: &SearchErrorsArgs,
    default_limit: usize,
) -> Result<ToolResult> {
    let limit = args.limit.unwrap_or(default_limit);
    let results = kb.search(&args.query, args.domain, limit)?;
    if results.is_empty() {
        return Ok(ToolResult::text(format!(
            "No errors matched '{}'.\n\nTip: lookup_error matches a full error message \
             against known patterns.",
            args.query
        )));
    }

    let mut text = format!("Found {} errors for '{}':\n", results.len(), args.query);
    for r in &results {
        let _ = write!(
            text,
            "\n- {} [{}] (score {}, resolvable: {}, fix rate: {}%)\n  {}\n",
            r.signature,
            r.id,
            r.score,
            r.resolvable,
            percent(r.fix_success_rate),
            r.summary
        );
    }
    Ok(ToolResult::text(text))
}

pub fn domain_stats(kb: &KnowledgeBase, args: &DomainStatsArgs) -> Result<ToolResult> {
    let stats = kb.domain_stats(args.domain)?;
    if stats.total == 0 {
        return Ok(ToolResult::text(format!(
            "No errors recorded for domain: {}",
            args.domain
        )));
    }

    let mut text = format!("## {}\n", stats.domain);
    let _ = writeln!(text, "Total errors: {}", stats.total);
    let _ = writeln!(text, "Average fix rate: {:.2}", stats.avg_fix_rate);
    let _ = writeln!(
        text,
        "\nResolvable: true {} | partial {} | false {}",
        stats.resolvable.yes, stats.resolvable.partial, stats.resolvable.no
    );
    let _ = writeln!(
        text,
        "Confidence: high {} | medium {} | low {}",
        stats.confidence.high, stats.confidence.medium, stats.confidence.low
    );
    text.push_str("\nTop categories:\n");
    for c in &stats.top_categories {
        let _ = writeln!(text, "- {}: {}", c.category, c.count);
    }
    Ok(ToolResult::text(text))
}
