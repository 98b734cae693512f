//! Field-level merge of overlapping statement series. The freshly
//! fetched value wins whenever it is non-zero; order matters and the
//! merge is deliberately not commutative.

use std::collections::BTreeMap;

use valuation_core::{DateKey, Statement};

/// Merge two statements field by field: keep `a`'s value when non-zero,
/// fall back to `b` otherwise. Provenance metadata merges the same way.
pub fn merge_statements<S: Statement>(a: &S, b: &S) -> S {
    let mut merged = S::default();
    for field in S::FIELD_NAMES {
        let value = a.get(field);
        merged.set(field, if value != 0.0 { value } else { b.get(field) });
    }
    merged.set_estimate(a.estimate() || b.estimate());
    merged.set_source(a.source().or(b.source()));
    merged
}

/// For every quarter date, merge the freshly fetched statement (either
/// cadence) with the previously reconciled one.
///
/// Reconciled entries marked `estimate` are not used as a merge source:
/// extrapolated values are re-derived on every run instead of being
/// compounded, so repeated runs refine rather than entrench estimates.
pub fn merged_statements_for_dates<S: Statement>(
    dates: &[DateKey],
    latest: &BTreeMap<DateKey, S>,
    existing: &BTreeMap<DateKey, S>,
) -> BTreeMap<DateKey, S> {
    let mut merged = BTreeMap::new();

    for date in dates {
        let candidate_latest = latest.get(date).cloned().unwrap_or_default();
        let candidate_existing = existing
            .get(date)
            .filter(|statement| !statement.estimate())
            .cloned()
            .unwrap_or_default();

        merged.insert(
            date.clone(),
            merge_statements(&candidate_latest, &candidate_existing),
        );
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{IncomeStatement, Provenance};

    #[test]
    fn test_merge_keeps_truthy_values() {
        let a = IncomeStatement {
            total_revenue: 10000.0,
            ..Default::default()
        };
        let b = IncomeStatement::default();
        assert_eq!(merge_statements(&a, &b).total_revenue, 10000.0);
    }

    #[test]
    fn test_merge_fills_falsy_values() {
        let a = IncomeStatement::default();
        let b = IncomeStatement {
            total_revenue: 10000.0,
            ..Default::default()
        };
        assert_eq!(merge_statements(&a, &b).total_revenue, 10000.0);
    }

    #[test]
    fn test_merge_is_field_level_not_statement_level() {
        let a = IncomeStatement {
            total_revenue: 500.0,
            ..Default::default()
        };
        let b = IncomeStatement {
            total_revenue: 900.0,
            net_income: 50.0,
            ..Default::default()
        };
        let merged = merge_statements(&a, &b);
        assert_eq!(merged.total_revenue, 500.0);
        assert_eq!(merged.net_income, 50.0);
    }

    #[test]
    fn test_merge_order_matters() {
        let a = IncomeStatement {
            total_revenue: 1.0,
            ..Default::default()
        };
        let b = IncomeStatement {
            total_revenue: 2.0,
            ..Default::default()
        };
        assert_eq!(merge_statements(&a, &b).total_revenue, 1.0);
        assert_eq!(merge_statements(&b, &a).total_revenue, 2.0);
    }

    #[test]
    fn test_estimated_existing_entries_are_discarded() {
        let dates = vec!["2020-03-31".to_string()];
        let latest: BTreeMap<String, IncomeStatement> = BTreeMap::new();

        let mut existing = BTreeMap::new();
        existing.insert(
            "2020-03-31".to_string(),
            IncomeStatement {
                total_revenue: 123.0,
                estimate: true,
                source: Some(Provenance::Trend),
                ..Default::default()
            },
        );

        let merged = merged_statements_for_dates(&dates, &latest, &existing);
        assert_eq!(merged["2020-03-31"], IncomeStatement::default());
    }

    #[test]
    fn test_actual_existing_entries_are_carried_forward() {
        let dates = vec!["2020-03-31".to_string()];
        let latest: BTreeMap<String, IncomeStatement> = BTreeMap::new();

        let mut existing = BTreeMap::new();
        existing.insert(
            "2020-03-31".to_string(),
            IncomeStatement {
                total_revenue: 123.0,
                source: Some(Provenance::Actual),
                ..Default::default()
            },
        );

        let merged = merged_statements_for_dates(&dates, &latest, &existing);
        assert_eq!(merged["2020-03-31"].total_revenue, 123.0);
    }
}
