//! Freshness of `last_confirmed` dates.

use super::{IssueKind, ValidationIssue};
use crate::models::{CanonId, ErrorCanon};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Number of stalest canons listed in a [`FreshnessSummary`].
const MAX_STALE_LISTED: usize = 10;

/// Age thresholds, in days since `last_confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Older than this is stale.
    pub stale_after_days: i64,
    /// Older than this (and not stale) is aging.
    pub aging_after_days: i64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            stale_after_days: 365,
            aging_after_days: 180,
        }
    }
}

/// Days between `last_confirmed` and `today`.
///
/// `None` when the date is missing or not `YYYY-MM-DD`.
#[must_use]
pub fn canon_age_days(canon: &ErrorCanon, today: NaiveDate) -> Option<i64> {
    let confirmed = canon.error.last_confirmed.as_deref()?;
    let date = NaiveDate::parse_from_str(confirmed, "%Y-%m-%d").ok()?;
    Some((today - date).num_days())
}

impl FreshnessPolicy {
    /// Stale or aging warning for one canon, if any.
    #[must_use]
    pub fn check(&self, canon: &ErrorCanon, today: NaiveDate) -> Option<ValidationIssue> {
        let age = canon_age_days(canon, today)?;
        let confirmed = canon.error.last_confirmed.as_deref().unwrap_or_default();
        let stale = self.stale_after_days;

        let issue = if age > stale {
            ValidationIssue::warning(
                IssueKind::Stale,
                format!(
                    "Stale canon: last_confirmed {confirmed} ({age} days ago, threshold: {stale} days). Consider re-verifying this error."
                ),
            )
        } else if age > self.aging_after_days {
            ValidationIssue::warning(
                IssueKind::Aging,
                format!(
                    "Aging canon: last_confirmed {confirmed} ({age} days ago). Consider re-verification before {stale} days."
                ),
            )
        } else {
            return None;
        };
        Some(issue.at("error.last_confirmed"))
    }

    /// Freshness counts over a set of canons.
    #[must_use]
    pub fn summarize<'a>(
        &self,
        canons: impl IntoIterator<Item = &'a ErrorCanon>,
        today: NaiveDate,
    ) -> FreshnessSummary {
        let mut summary = FreshnessSummary {
            reference_date: today,
            stale_after_days: self.stale_after_days,
            ..FreshnessSummary::default()
        };
        let mut stale = Vec::new();

        for canon in canons {
            summary.total += 1;
            match canon_age_days(canon, today) {
                None => summary.unknown += 1,
                Some(age) if age > self.stale_after_days => {
                    summary.stale += 1;
                    stale.push(StaleEntry {
                        id: canon.id.clone(),
                        age_days: age,
                    });
                },
                Some(age) if age > self.aging_after_days => summary.aging += 1,
                Some(_) => summary.fresh += 1,
            }
        }

        stale.sort_by(|a, b| b.age_days.cmp(&a.age_days));
        summary.stale_overflow = stale.len().saturating_sub(MAX_STALE_LISTED);
        stale.truncate(MAX_STALE_LISTED);
        summary.stalest = stale;
        summary
    }
}

/// A stale canon and its age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleEntry {
    /// Canon id.
    pub id: CanonId,
    /// Days since `last_confirmed`.
    pub age_days: i64,
}

/// Freshness counts across a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FreshnessSummary {
    /// Date ages are measured against.
    pub reference_date: NaiveDate,
    /// Stale threshold used.
    pub stale_after_days: i64,
    /// Canons counted.
    pub total: usize,
    /// Within the aging threshold.
    pub fresh: usize,
    /// Past aging, within stale.
    pub aging: usize,
    /// Past the stale threshold.
    pub stale: usize,
    /// Missing or unparseable `last_confirmed`.
    pub unknown: usize,
    /// The stalest canons, oldest first.
    pub stalest: Vec<StaleEntry>,
    /// Stale canons not listed in `stalest`.
    pub stale_overflow: usize,
}

impl fmt::Display for FreshnessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FRESHNESS REPORT ({})", self.reference_date)?;
        write!(
            f,
            "Total: {} | Fresh: {} | Aging: {} | Stale: {} | Unknown: {}",
            self.total, self.fresh, self.aging, self.stale, self.unknown
        )?;
        if !self.stalest.is_empty() {
            write!(f, "\nTop stale canons (>{} days):", self.stale_after_days)?;
            for entry in &self.stalest {
                write!(f, "\n  {} ({} days)", entry.id, entry.age_days)?;
            }
            if self.stale_overflow > 0 {
                write!(f, "\n  ... and {} more", self.stale_overflow)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::canon;
    use test_case::test_case;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn confirmed(id: &str, date: Option<&str>) -> ErrorCanon {
        let mut c = canon(id, "x", 0.5);
        c.error.last_confirmed = date.map(str::to_string);
        c
    }

    #[test_case(Some("2025-05-01"), None; "fresh")]
    #[test_case(Some("2024-10-01"), Some(IssueKind::Aging); "aging")]
    #[test_case(Some("2023-01-01"), Some(IssueKind::Stale); "stale")]
    #[test_case(Some("2024-06-01"), Some(IssueKind::Aging); "exactly one year is aging")]
    #[test_case(None, None; "missing")]
    #[test_case(Some("not-a-date"), None; "unparseable")]
    fn test_check(date: Option<&str>, expected: Option<IssueKind>) {
        let c = confirmed("python/a/env", date);
        let issue = FreshnessPolicy::default().check(&c, today());
        assert_eq!(issue.map(|i| i.kind), expected);
    }

    #[test]
    fn test_stale_message() {
        let c = confirmed("python/a/env", Some("2023-06-01"));
        let issue = FreshnessPolicy::default().check(&c, today()).unwrap();
        assert!(issue.message.starts_with("Stale canon: last_confirmed 2023-06-01 (731 days ago"));
        assert!(!issue.is_error());
    }

    #[test]
    fn test_summary_counts_and_order() {
        let canons = vec![
            confirmed("python/a/env", Some("2025-05-01")),
            confirmed("python/b/env", Some("2024-10-01")),
            confirmed("python/c/env", Some("2023-01-01")),
            confirmed("python/d/env", Some("2020-01-01")),
            confirmed("python/e/env", None),
        ];
        let summary = FreshnessPolicy::default().summarize(&canons, today());
        assert_eq!(
            (summary.total, summary.fresh, summary.aging, summary.stale, summary.unknown),
            (5, 1, 1, 2, 1)
        );
        assert_eq!(summary.stalest[0].id, "python/d/env");
        assert_eq!(summary.stale_overflow, 0);
        assert!(summary.to_string().contains("Stale: 2"));
    }

    #[test]
    fn test_summary_lists_at_most_ten() {
        let canons: Vec<_> = (0..12)
            .map(|i| confirmed(&format!("python/s{i}/env"), Some("2020-01-01")))
            .collect();
        let summary = FreshnessPolicy::default().summarize(&canons, today());
        assert_eq!(summary.stalest.len(), 10);
        assert_eq!(summary.stale_overflow, 2);
        assert!(summary.to_string().ends_with("... and 2 more"));
    }
}
