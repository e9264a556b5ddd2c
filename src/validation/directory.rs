//! Validation of a whole data directory.

use super::{
    DuplicateIdError, FreshnessSummary, GraphNode, IssueKind, Severity, ValidationIssue,
    Validator, validate_cross_references, validate_unique_ids,
};
use crate::models::ErrorCanon;
use crate::storage::discover_canon_files;
use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// A validation issue attributed to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIssue {
    /// The file the issue was found in.
    pub path: PathBuf,
    /// The issue.
    pub issue: ValidationIssue,
}

impl fmt::Display for FileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.path.display(),
            self.issue.severity,
            self.issue.message
        )
    }
}

/// Outcome of [`validate_directory`].
#[derive(Debug, Clone, Default)]
pub struct DirectoryReport {
    /// Files examined.
    pub files_checked: usize,
    /// Files that parsed into a canon (whether or not they validated).
    pub canons_parsed: usize,
    /// Every issue, in file order, followed by corpus-wide issues.
    pub issues: Vec<FileIssue>,
    /// Freshness over the parsed canons, when freshness checks are enabled.
    pub freshness: Option<FreshnessSummary>,
}

impl DirectoryReport {
    /// Number of error issues.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.issue.is_error()).count()
    }

    /// Number of warning issues.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.issue.severity == Severity::Warning)
            .count()
    }

    /// True when no error was found. Warnings never fail.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

/// Validates every canon file under `root`.
///
/// A file that is not valid JSON is an error for that file and validation
/// continues. Duplicate-id and cross-reference checks then run over every
/// file that is valid JSON with an `id`, including files that fail the
/// schema.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] only when the directory itself cannot be
/// walked. Problems in individual files are reported, not returned.
#[instrument(skip(root, validator), fields(root = %root.display()))]
pub fn validate_directory(root: &Path, validator: &Validator) -> Result<DirectoryReport> {
    let files = discover_canon_files(root)?;
    if files.is_empty() {
        tracing::warn!("No canon JSON files found");
    }

    let mut report = DirectoryReport {
        files_checked: files.len(),
        ..DirectoryReport::default()
    };
    let mut parsed: Vec<ErrorCanon> = Vec::new();
    let mut nodes: Vec<(PathBuf, GraphNode)> = Vec::new();

    for path in files {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                let err = Error::operation("read_canon", e);
                report.issues.push(FileIssue {
                    path,
                    issue: ValidationIssue::error(IssueKind::InvalidJson, err.to_string()),
                });
                continue;
            },
        };
        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                report.issues.push(FileIssue {
                    path,
                    issue: ValidationIssue::error(IssueKind::InvalidJson, format!("Invalid JSON: {e}")),
                });
                continue;
            },
        };

        let file_report = validator.validate_value(&value);
        if file_report.is_valid() {
            tracing::debug!(path = %path.display(), warnings = file_report.warnings.len(), "Canon OK");
        }
        report.issues.extend(file_report.issues().cloned().map(|issue| FileIssue {
            path: path.clone(),
            issue,
        }));

        if let Some(node) = GraphNode::from_value(&value) {
            nodes.push((path, node));
        }
        if let Ok(canon) = serde_json::from_value::<ErrorCanon>(value) {
            parsed.push(canon);
        }
    }

    report.canons_parsed = parsed.len();
    let graph: Vec<GraphNode> = nodes.iter().map(|(_, n)| n.clone()).collect();

    for dup in validate_unique_ids(&graph) {
        report.issues.push(duplicate_issue(&dup, &nodes));
    }
    for xref in validate_cross_references(&graph) {
        report.issues.push(FileIssue {
            path: nodes[xref.source_index].0.clone(),
            issue: xref.to_issue(),
        });
    }

    report.freshness = validator
        .freshness()
        .map(|policy| policy.summarize(parsed.iter(), validator.reference_date()));

    let errors = report.error_count();
    metrics::counter!("validation_errors_total").increment(errors as u64);
    tracing::info!(
        files = report.files_checked,
        errors,
        warnings = report.warning_count(),
        "Validated data directory"
    );
    Ok(report)
}

fn duplicate_issue(dup: &DuplicateIdError, nodes: &[(PathBuf, GraphNode)]) -> FileIssue {
    let first = nodes[dup.first_index].0.display();
    let mut issue = dup.to_issue();
    issue.message = format!("{} (first defined in {first})", issue.message);
    FileIssue {
        path: nodes[dup.index].0.clone(),
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{canon, with_leads_to};
    use crate::storage::{canon_path, write_canon};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn validator() -> Validator {
        Validator::new().with_reference_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    }

    #[test]
    fn test_clean_directory_passes() {
        let dir = TempDir::new().unwrap();
        for c in [
            with_leads_to(canon("python/a/env", "a", 0.5), "python/b/env"),
            canon("python/b/env", "b", 0.5),
        ] {
            write_canon(&canon_path(dir.path(), &c), &c).unwrap();
        }
        let report = validate_directory(dir.path(), &validator()).unwrap();
        assert!(report.passed(), "{:?}", report.issues);
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.canons_parsed, 2);
        assert_eq!(report.freshness.unwrap().fresh, 2);
    }

    #[test]
    fn test_invalid_json_reported_and_continues() {
        let dir = TempDir::new().unwrap();
        let c = canon("python/a/env", "a", 0.5);
        write_canon(&canon_path(dir.path(), &c), &c).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();

        let report = validate_directory(dir.path(), &validator()).unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.canons_parsed, 1);
        let issue = &report.issues[0];
        assert_eq!(issue.issue.kind, IssueKind::InvalidJson);
        assert!(issue.to_string().contains("broken.json: error: Invalid JSON"));
    }

    #[test]
    fn test_duplicate_and_dangling_attributed_to_files() {
        let dir = TempDir::new().unwrap();
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/zzz/env");
        write_canon(&dir.path().join("one.json"), &a).unwrap();
        write_canon(&dir.path().join("two.json"), &canon("python/a/env", "a", 0.5)).unwrap();

        let report = validate_directory(dir.path(), &validator()).unwrap();
        let kinds: Vec<_> = report.issues.iter().map(|i| i.issue.kind).collect();
        assert_eq!(kinds, vec![IssueKind::DuplicateId, IssueKind::CrossReference]);
        assert!(report.issues[0].path.ends_with("two.json"));
        assert!(report.issues[1].path.ends_with("one.json"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let dir = TempDir::new().unwrap();
        let mut c = canon("python/a/env", "a", 0.5);
        c.dead_ends[0].sources.clear();
        write_canon(&canon_path(dir.path(), &c), &c).unwrap();
        let report = validate_directory(dir.path(), &validator()).unwrap();
        assert!(report.passed());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_schema_invalid_record_still_counts_as_present() {
        let dir = TempDir::new().unwrap();
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/b/env");
        write_canon(&canon_path(dir.path(), &a), &a).unwrap();

        let mut b = serde_json::to_value(canon("python/b/env", "b", 0.5)).unwrap();
        b["metadata"]["review_status"] = serde_json::json!("pending");
        fs::create_dir_all(dir.path().join("python/b")).unwrap();
        fs::write(dir.path().join("python/b/env.json"), b.to_string()).unwrap();
        fs::write(dir.path().join("python/b/copy.json"), b.to_string()).unwrap();

        let report = validate_directory(dir.path(), &validator()).unwrap();
        assert_eq!(report.canons_parsed, 1);
        let kinds: Vec<_> = report.issues.iter().map(|i| i.issue.kind).collect();
        assert!(!kinds.contains(&IssueKind::CrossReference), "{:?}", report.issues);
        assert_eq!(
            kinds.iter().filter(|k| **k == IssueKind::DuplicateId).count(),
            1
        );
    }
}
