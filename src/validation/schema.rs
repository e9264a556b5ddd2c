//! Structural schema for canon records.
// Allow expect() on the embedded schema - it is a constant and always compiles
#![allow(clippy::expect_used)]

use super::{IssueKind, ValidationIssue};
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Current record format version.
pub const CANON_SCHEMA_VERSION: &str = "1.0.0";

const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

static CANON_VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&canon_schema()).expect("embedded canon schema compiles")
});

fn rate() -> Value {
    json!({"type": "number", "minimum": 0.0, "maximum": 1.0})
}

fn counter() -> Value {
    json!({"type": "integer", "minimum": 0})
}

/// The JSON Schema (draft 2020-12) every canon record must satisfy.
///
/// `dead_ends` emptiness is left to the business rules, which report it as
/// its own error kind.
#[must_use]
pub fn canon_schema() -> Value {
    let domains: Vec<&str> = crate::models::Domain::all()
        .iter()
        .map(crate::models::Domain::as_str)
        .collect();
    let review_statuses: Vec<&str> = crate::models::ReviewStatus::all()
        .iter()
        .map(crate::models::ReviewStatus::as_str)
        .collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": [
            "schema_version", "id", "url", "error", "environment", "verdict",
            "dead_ends", "workarounds", "transition_graph", "metadata"
        ],
        "properties": {
            "schema_version": {"type": "string", "pattern": r"^\d+\.\d+\.\d+$"},
            "id": {"type": "string", "pattern": r"^[a-z0-9-]+/[a-z0-9-]+/[a-z0-9._-]+$"},
            "url": {"type": "string", "minLength": 1},
            "error": {
                "type": "object",
                "required": ["signature", "regex", "domain", "category"],
                "properties": {
                    "signature": {"type": "string", "minLength": 1},
                    "regex": {"type": "string", "minLength": 1},
                    "domain": {"type": "string", "enum": domains},
                    "category": {"type": "string", "minLength": 1},
                    "first_seen": {"type": "string", "pattern": DATE_PATTERN},
                    "last_confirmed": {"type": "string", "pattern": DATE_PATTERN}
                }
            },
            "environment": {
                "type": "object",
                "required": ["runtime", "os"],
                "properties": {
                    "runtime": {
                        "type": "object",
                        "required": ["name", "version_range"],
                        "properties": {
                            "name": {"type": "string"},
                            "version_range": {"type": "string"}
                        }
                    },
                    "hardware": {"type": "object"},
                    "os": {"type": "string"},
                    "python": {"type": "string"},
                    "language": {"type": "string"},
                    "additional": {"type": "object"}
                }
            },
            "verdict": {
                "type": "object",
                "required": ["resolvable", "fix_success_rate", "confidence", "last_updated", "summary"],
                "properties": {
                    "resolvable": {"type": "string", "enum": ["true", "partial", "false"]},
                    "fix_success_rate": rate(),
                    "confidence": rate(),
                    "last_updated": {"type": "string", "pattern": DATE_PATTERN},
                    "summary": {"type": "string", "minLength": 1}
                }
            },
            "dead_ends": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["action", "why_fails", "fail_rate"],
                    "properties": {
                        "action": {"type": "string", "minLength": 1},
                        "why_fails": {"type": "string", "minLength": 1},
                        "fail_rate": rate(),
                        "condition": {"type": "string"},
                        "common_misconception": {"type": "string"},
                        "sources": {"type": "array", "items": {"type": "string"}}
                    }
                }
            },
            "workarounds": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["action", "success_rate"],
                    "properties": {
                        "action": {"type": "string", "minLength": 1},
                        "how": {"type": "string"},
                        "success_rate": rate(),
                        "tradeoff": {"type": "string"},
                        "condition": {"type": "string"},
                        "sources": {"type": "array", "items": {"type": "string"}}
                    }
                }
            },
            "transition_graph": {
                "type": "object",
                "required": ["leads_to", "preceded_by", "frequently_confused_with"],
                "properties": {
                    "leads_to": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["error_id", "probability"],
                            "properties": {
                                "error_id": {"type": "string"},
                                "probability": rate(),
                                "condition": {"type": "string"},
                                "typical_delay": {"type": "string"}
                            }
                        }
                    },
                    "preceded_by": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["error_id", "probability"],
                            "properties": {
                                "error_id": {"type": "string"},
                                "probability": rate(),
                                "condition": {"type": "string"}
                            }
                        }
                    },
                    "frequently_confused_with": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["error_id", "distinction"],
                            "properties": {
                                "error_id": {"type": "string"},
                                "distinction": {"type": "string"}
                            }
                        }
                    }
                }
            },
            "metadata": {
                "type": "object",
                "required": ["generated_by", "generation_date", "review_status", "evidence_count"],
                "properties": {
                    "generated_by": {"type": "string"},
                    "generation_date": {"type": "string"},
                    "review_status": {"type": "string", "enum": review_statuses},
                    "evidence_count": counter(),
                    "page_views": counter(),
                    "ai_agent_hits": counter(),
                    "human_hits": counter(),
                    "last_verification": {"type": "string"}
                }
            }
        }
    })
}

/// Converts a JSON pointer (`/dead_ends/0/fail_rate`) into a field path
/// (`dead_ends[0].fail_rate`).
fn field_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
        }
    }
    path
}

/// Checks a raw record against [`canon_schema`], returning every violation.
#[must_use]
pub fn check_schema(value: &Value) -> Vec<ValidationIssue> {
    CANON_VALIDATOR
        .iter_errors(value)
        .map(|e| {
            let field = field_path(&e.instance_path.to_string());
            let message = if field.is_empty() {
                format!("Schema validation error: {e}")
            } else {
                format!("Schema validation error at {field}: {e}")
            };
            let issue = ValidationIssue::error(IssueKind::Schema, message);
            if field.is_empty() { issue } else { issue.at(field) }
        })
        .collect()
}
