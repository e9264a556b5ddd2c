//! Per-domain rollups.

use crate::models::{
    CategoryCount, ConfidenceBreakdown, Domain, DomainStats, ErrorCanon, Resolvable,
    ResolvableBreakdown,
};
use std::collections::HashMap;

/// Number of categories listed in [`DomainStats::top_categories`].
pub const TOP_CATEGORIES: usize = 5;

/// Upper bound of the `low` confidence bucket (inclusive).
pub const LOW_CONFIDENCE_MAX: f64 = 0.3;
/// Lower bound of the `high` confidence bucket (inclusive).
pub const HIGH_CONFIDENCE_MIN: f64 = 0.6;

/// Reduces the canons of one domain to [`DomainStats`].
#[must_use]
pub fn domain_stats(domain: Domain, canons: &[&ErrorCanon]) -> DomainStats {
    let mut resolvable = ResolvableBreakdown::default();
    let mut confidence = ConfidenceBreakdown::default();
    let mut categories: HashMap<&str, usize> = HashMap::new();
    let mut fix_rate_sum = 0.0;

    for canon in canons {
        match canon.verdict.resolvable {
            Resolvable::True => resolvable.yes += 1,
            Resolvable::Partial => resolvable.partial += 1,
            Resolvable::False => resolvable.no += 1,
        }

        let conf = canon.verdict.confidence;
        if conf <= LOW_CONFIDENCE_MAX {
            confidence.low += 1;
        } else if conf < HIGH_CONFIDENCE_MIN {
            confidence.medium += 1;
        } else {
            confidence.high += 1;
        }

        *categories.entry(canon.error.category.as_str()).or_default() += 1;
        fix_rate_sum += canon.verdict.fix_success_rate;
    }

    let mut top_categories: Vec<CategoryCount> = categories
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    top_categories.truncate(TOP_CATEGORIES);

    #[allow(clippy::cast_precision_loss)]
    let avg_fix_rate = if canons.is_empty() {
        0.0
    } else {
        (fix_rate_sum / canons.len() as f64 * 100.0).round() / 100.0
    };

    DomainStats {
        domain,
        total: canons.len(),
        avg_fix_rate,
        resolvable,
        confidence,
        top_categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::canon;

    #[test]
    fn test_domain_stats() {
        let mut a = canon("docker/a/env", "a", 0.9);
        a.verdict.resolvable = Resolvable::True;
        a.verdict.confidence = 0.9;
        a.error.category = "storage".to_string();
        let mut b = canon("docker/b/env", "b", 0.1);
        b.verdict.resolvable = Resolvable::False;
        b.verdict.confidence = 0.3;
        b.error.category = "network".to_string();
        let mut c = canon("docker/c/env", "c", 0.5);
        c.verdict.confidence = 0.45;
        c.error.category = "storage".to_string();

        let stats = domain_stats(Domain::Docker, &[&a, &b, &c]);
        assert_eq!(stats.total, 3);
        assert!((stats.avg_fix_rate - 0.5).abs() < 1e-9);
        assert_eq!(
            stats.resolvable,
            ResolvableBreakdown { yes: 1, partial: 1, no: 1 }
        );
        assert_eq!(
            stats.confidence,
            ConfidenceBreakdown { low: 1, medium: 1, high: 1 }
        );
        assert_eq!(stats.top_categories[0].category, "storage");
        assert_eq!(stats.top_categories[0].count, 2);
    }

    #[test]
    fn test_empty_domain() {
        let stats = domain_stats(Domain::Llm, &[]);
        assert_eq!(stats.total, 0);
        assert!(stats.avg_fix_rate.abs() < f64::EPSILON);
        assert!(stats.top_categories.is_empty());
    }
}
