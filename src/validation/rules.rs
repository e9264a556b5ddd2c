//! Cross-field business rules.

use super::{IssueKind, ValidationIssue, ValidationReport};
use crate::models::{ErrorCanon, Resolvable};
use crate::storage::build_matcher;

/// `resolvable = "true"` needs at least this fix rate.
pub const TRUE_MIN_FIX_RATE: f64 = 0.7;
/// `resolvable = "false"` needs a fix rate below this.
pub const FALSE_MAX_FIX_RATE: f64 = 0.2;
/// `true` and `false` verdicts need at least this confidence.
pub const DECISIVE_MIN_CONFIDENCE: f64 = 0.6;
/// Below this many evidence items confidence is capped.
pub const LOW_EVIDENCE_THRESHOLD: u64 = 3;
/// Confidence cap for low-evidence canons.
pub const LOW_EVIDENCE_MAX_CONFIDENCE: f64 = 0.3;
/// Evidence counts above this should come with sources.
pub const SOURCED_EVIDENCE_THRESHOLD: u64 = 10;

fn in_unit_range(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

/// Checks the business rules of one well-typed canon.
///
/// Every violated rule is reported. Range checks on rates are repeated here
/// so canons built in memory, which never passed the schema, are covered.
#[must_use]
pub fn check_business_rules(canon: &ErrorCanon, base_url: &str) -> ValidationReport {
    let mut report = ValidationReport::new();
    let verdict = &canon.verdict;
    let rate = verdict.fix_success_rate;
    let conf = verdict.confidence;

    if canon.dead_ends.is_empty() {
        report.push(
            ValidationIssue::error(IssueKind::EmptyDeadEnds, "dead_ends must contain at least 1 item")
                .at("dead_ends"),
        );
    }

    let expected_url = canon.expected_url(base_url);
    if canon.url != expected_url {
        report.push(
            ValidationIssue::error(
                IssueKind::UrlMismatch,
                format!("URL mismatch: expected {expected_url}, got {}", canon.url),
            )
            .at("url"),
        );
    }

    match verdict.resolvable {
        Resolvable::True if rate < TRUE_MIN_FIX_RATE || conf < DECISIVE_MIN_CONFIDENCE => {
            report.push(
                ValidationIssue::error(
                    IssueKind::VerdictConsistency,
                    format!(
                        "verdict 'true' requires fix_success_rate >= {TRUE_MIN_FIX_RATE} and confidence >= {DECISIVE_MIN_CONFIDENCE}, got rate={rate}, confidence={conf}"
                    ),
                )
                .at("verdict.resolvable"),
            );
        },
        Resolvable::False if rate >= FALSE_MAX_FIX_RATE || conf < DECISIVE_MIN_CONFIDENCE => {
            report.push(
                ValidationIssue::error(
                    IssueKind::VerdictConsistency,
                    format!(
                        "verdict 'false' requires fix_success_rate < {FALSE_MAX_FIX_RATE} and confidence >= {DECISIVE_MIN_CONFIDENCE}, got rate={rate}, confidence={conf}"
                    ),
                )
                .at("verdict.resolvable"),
            );
        },
        _ => {},
    }

    let evidence = canon.metadata.evidence_count;
    if evidence < LOW_EVIDENCE_THRESHOLD && conf > LOW_EVIDENCE_MAX_CONFIDENCE {
        report.push(
            ValidationIssue::error(
                IssueKind::EvidenceConfidence,
                format!(
                    "evidence_count={evidence} < {LOW_EVIDENCE_THRESHOLD} but confidence={conf} > {LOW_EVIDENCE_MAX_CONFIDENCE}. Low evidence should have confidence <= {LOW_EVIDENCE_MAX_CONFIDENCE}."
                ),
            )
            .at("metadata.evidence_count"),
        );
    }

    for (field, value) in [("verdict.fix_success_rate", rate), ("verdict.confidence", conf)] {
        if !in_unit_range(value) {
            report.push(
                ValidationIssue::error(IssueKind::RateOutOfRange, format!("{field} out of range: {value}"))
                    .at(field),
            );
        }
    }
    for (i, de) in canon.dead_ends.iter().enumerate() {
        if !in_unit_range(de.fail_rate) {
            let field = format!("dead_ends[{i}].fail_rate");
            report.push(
                ValidationIssue::error(
                    IssueKind::RateOutOfRange,
                    format!("{field} out of range: {}", de.fail_rate),
                )
                .at(field),
            );
        }
    }
    for (i, wa) in canon.workarounds.iter().enumerate() {
        if !in_unit_range(wa.success_rate) {
            let field = format!("workarounds[{i}].success_rate");
            report.push(
                ValidationIssue::error(
                    IssueKind::RateOutOfRange,
                    format!("{field} out of range: {}", wa.success_rate),
                )
                .at(field),
            );
        }
    }

    if let Err(e) = build_matcher(&canon.error.regex) {
        report.push(
            ValidationIssue::error(IssueKind::InvalidRegex, format!("Invalid error regex: {e}"))
                .at("error.regex"),
        );
    }

    for (i, de) in canon.dead_ends.iter().enumerate() {
        if de.sources.is_empty() {
            report.push(
                ValidationIssue::warning(
                    IssueKind::MissingSources,
                    format!(
                        "dead_ends[{i}] '{}' has no sources; consider adding evidence URLs",
                        de.action
                    ),
                )
                .at(format!("dead_ends[{i}].sources")),
            );
        }
    }
    for (i, wa) in canon.workarounds.iter().enumerate() {
        if wa.sources.is_empty() {
            report.push(
                ValidationIssue::warning(
                    IssueKind::MissingSources,
                    format!(
                        "workarounds[{i}] '{}' has no sources; consider adding evidence URLs",
                        wa.action
                    ),
                )
                .at(format!("workarounds[{i}].sources")),
            );
        }
    }

    if canon.source_count() == 0 && evidence > SOURCED_EVIDENCE_THRESHOLD {
        report.push(
            ValidationIssue::warning(
                IssueKind::EvidenceWithoutSources,
                format!("evidence_count={evidence} but no source URLs provided"),
            )
            .at("metadata.evidence_count"),
        );
    }

    report
}
