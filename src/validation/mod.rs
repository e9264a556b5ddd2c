//! Canon validation.
//!
//! Validation runs in layers:
//!
//! 1. **Schema**: structural conformance of the raw JSON, every violation
//!    reported with its field path. Schema errors supersede everything else.
//! 2. **Business rules**: cross-field invariants on a well-typed canon.
//! 3. **Freshness**: advisory warnings on old `last_confirmed` dates.
//! 4. **Corpus-wide**: duplicate ids and dangling transition-graph edges.
//!
//! The validator reports every problem it finds instead of stopping at the
//! first. Errors fail a corpus; warnings never do.

mod directory;
mod freshness;
mod rules;
mod schema;
mod xref;

pub use directory::{DirectoryReport, FileIssue, validate_directory};
pub use freshness::{FreshnessPolicy, FreshnessSummary, StaleEntry, canon_age_days};
pub use rules::check_business_rules;
pub use schema::{CANON_SCHEMA_VERSION, canon_schema, check_schema};
pub use xref::{
    CrossReferenceError, DuplicateIdError, EdgeKind, GraphNode, validate_cross_references,
    validate_unique_ids,
};

use crate::models::ErrorCanon;
use crate::storage::Corpus;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::fmt;

/// Default base url canon urls derive from.
pub const DEFAULT_BASE_URL: &str = "https://deadends.dev";

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Advisory; never fails validation.
    Warning,
    /// Fails validation.
    Error,
}

impl Severity {
    /// Returns the severity as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of rule an issue violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Not valid JSON at all.
    InvalidJson,
    /// Structural schema violation.
    Schema,
    /// `dead_ends` is empty.
    EmptyDeadEnds,
    /// `url` differs from `base_url/id`.
    UrlMismatch,
    /// `resolvable` disagrees with fix rate and confidence.
    VerdictConsistency,
    /// Low evidence with high confidence.
    EvidenceConfidence,
    /// A rate outside `[0, 1]`.
    RateOutOfRange,
    /// The canon regex does not compile.
    InvalidRegex,
    /// A dead end or workaround without sources.
    MissingSources,
    /// High evidence count with no sources anywhere.
    EvidenceWithoutSources,
    /// `last_confirmed` older than the stale threshold.
    Stale,
    /// `last_confirmed` older than the aging threshold.
    Aging,
    /// Same id in more than one record.
    DuplicateId,
    /// Transition-graph edge to an unknown id.
    CrossReference,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Error or warning.
    pub severity: Severity,
    /// The violated rule.
    pub kind: IssueKind,
    /// Field path the issue refers to, when it refers to one.
    pub field: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an error issue.
    #[must_use]
    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            field: None,
            message: message.into(),
        }
    }

    /// Creates a warning issue.
    #[must_use]
    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            field: None,
            message: message.into(),
        }
    }

    /// Attaches a field path.
    #[must_use]
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Whether this issue fails validation.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors and warnings for one record or one corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Issues that fail validation.
    pub errors: Vec<ValidationIssue>,
    /// Advisory issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes an issue by its severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    /// Appends every issue from `other`.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// True when there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any error is of the given kind.
    #[must_use]
    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Whether any warning is of the given kind.
    #[must_use]
    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    /// Error and warning issues in report order, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

impl Extend<ValidationIssue> for ValidationReport {
    fn extend<T: IntoIterator<Item = ValidationIssue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}

/// Validates canons against schema, business rules and freshness.
#[derive(Debug, Clone)]
pub struct Validator {
    base_url: String,
    freshness: Option<FreshnessPolicy>,
    reference_date: Option<NaiveDate>,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            freshness: Some(FreshnessPolicy::default()),
            reference_date: None,
        }
    }
}

impl Validator {
    /// Creates a validator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base url canon urls must derive from.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets or disables (`None`) freshness checks.
    #[must_use]
    pub const fn with_freshness(mut self, policy: Option<FreshnessPolicy>) -> Self {
        self.freshness = policy;
        self
    }

    /// Fixes "today" for freshness checks.
    #[must_use]
    pub const fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// The configured base url.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The freshness policy, if freshness checks are enabled.
    #[must_use]
    pub const fn freshness(&self) -> Option<FreshnessPolicy> {
        self.freshness
    }

    /// The date freshness is measured against.
    #[must_use]
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Validates a raw JSON record.
    ///
    /// Business rules and freshness run only when the schema check passes.
    #[must_use]
    pub fn validate_value(&self, value: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.extend(check_schema(value));
        if !report.is_valid() {
            return report;
        }

        match serde_json::from_value::<ErrorCanon>(value.clone()) {
            Ok(canon) => report.merge(self.check_typed(&canon)),
            Err(e) => report.push(ValidationIssue::error(
                IssueKind::Schema,
                format!("Schema validation error: {e}"),
            )),
        }
        report
    }

    /// Validates a typed canon.
    #[must_use]
    pub fn validate(&self, canon: &ErrorCanon) -> ValidationReport {
        match serde_json::to_value(canon) {
            Ok(value) => self.validate_value(&value),
            Err(e) => {
                tracing::debug!(id = %canon.id, error = %e, "Canon did not serialize; skipping schema check");
                self.check_typed(canon)
            },
        }
    }

    /// Duplicate-id and cross-reference checks over a whole corpus.
    #[must_use]
    pub fn validate_corpus(&self, corpus: &Corpus) -> ValidationReport {
        let nodes: Vec<GraphNode> = corpus.canons().map(GraphNode::from_canon).collect();
        let mut report = ValidationReport::new();
        report.extend(validate_unique_ids(&nodes).iter().map(DuplicateIdError::to_issue));
        report.extend(
            validate_cross_references(&nodes)
                .iter()
                .map(CrossReferenceError::to_issue),
        );
        report
    }

    /// Per-record and corpus-wide validation of an already loaded corpus.
    #[must_use]
    pub fn validate_loaded(&self, corpus: &Corpus) -> ValidationReport {
        let mut report = ValidationReport::new();
        for canon in corpus.canons() {
            report.merge(self.validate(canon));
        }
        report.merge(self.validate_corpus(corpus));
        metrics::counter!("validation_errors_total").increment(report.errors.len() as u64);
        report
    }

    fn check_typed(&self, canon: &ErrorCanon) -> ValidationReport {
        let mut report = check_business_rules(canon, &self.base_url);
        if let Some(policy) = self.freshness {
            report.extend(policy.check(canon, self.reference_date()));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resolvable;
    use crate::models::testing::{canon, with_leads_to};

    fn validator() -> Validator {
        Validator::new().with_reference_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
    }

    #[test]
    fn test_valid_canon_passes() {
        let report = validator().validate(&canon("python/test-error/env1", "TestError: .+", 0.5));
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_verdict_error_not_masked() {
        let mut c = canon("python/test-error/env1", "TestError: .+", 0.5);
        c.verdict.resolvable = Resolvable::True;
        c.verdict.confidence = 0.8;
        let report = validator().validate(&c);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, IssueKind::VerdictConsistency);
    }

    #[test]
    fn test_schema_supersedes_rules() {
        let mut value = serde_json::to_value(canon("python/test-error/env1", "x", 0.5)).unwrap();
        value["verdict"]["fix_success_rate"] = serde_json::json!("high");
        value["url"] = serde_json::json!("https://wrong.example/x");
        let report = validator().validate_value(&value);
        assert!(!report.is_valid());
        assert!(report.errors.iter().all(|e| e.kind == IssueKind::Schema));
    }

    #[test]
    fn test_reports_every_schema_violation() {
        let mut value = serde_json::to_value(canon("python/test-error/env1", "x", 0.5)).unwrap();
        value["verdict"]["fix_success_rate"] = serde_json::json!(1.5);
        value["metadata"]["evidence_count"] = serde_json::json!(-1);
        let report = validator().validate_value(&value);
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
    }

    #[test]
    fn test_freshness_can_be_disabled() {
        let mut c = canon("python/test-error/env1", "x", 0.5);
        c.error.last_confirmed = Some("2020-01-01".to_string());
        assert!(validator().validate(&c).has_warning(IssueKind::Stale));
        let report = validator().with_freshness(None).validate(&c);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validate_loaded_corpus() {
        let corpus = Corpus::from_canons(vec![
            with_leads_to(canon("python/a/env", "a", 0.5), "python/missing/env"),
            canon("python/b/env", "b", 0.5),
        ]);
        let report = validator().validate_loaded(&corpus);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, IssueKind::CrossReference);
    }

    #[test]
    fn test_report_routing() {
        let mut report = ValidationReport::new();
        report.push(ValidationIssue::warning(IssueKind::MissingSources, "w"));
        assert!(report.is_valid());
        report.push(ValidationIssue::error(IssueKind::InvalidRegex, "e").at("error.regex"));
        assert!(!report.is_valid());
        assert_eq!(report.issues().count(), 2);
        assert_eq!(report.errors[0].field.as_deref(), Some("error.regex"));
    }
}
