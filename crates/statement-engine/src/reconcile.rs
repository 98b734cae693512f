//! Reconciliation entry point: one gap-free quarterly series per
//! statement type, built from the previous cycle's reconciled maps and a
//! freshly fetched dual-cadence batch.

use tracing::debug;

use valuation_core::{DualCadenceStatements, FinancialStatements, ValidityPolicy};

use crate::gapfill::fill_series;
use crate::merge::merged_statements_for_dates;
use crate::quarterly::quarterly_dates;

/// Rebuild the reconciled statement maps for one company.
///
/// Returns `None` when neither input contains a usable date. That is
/// the caller-visible no-op signal, not an error.
pub fn make_financial_statements(
    existing: &FinancialStatements,
    latest: &DualCadenceStatements,
    policy: &ValidityPolicy,
) -> Option<FinancialStatements> {
    let dates = quarterly_dates(existing, latest)?;
    debug!(quarters = dates.len(), "reconciling statement series");

    let income_quarterly = merged_statements_for_dates(
        &dates,
        &latest.income_statements.quarterly,
        &existing.income_statements,
    );
    let income_yearly = merged_statements_for_dates(
        &dates,
        &latest.income_statements.yearly,
        &existing.income_statements,
    );

    let balance_quarterly = merged_statements_for_dates(
        &dates,
        &latest.balance_sheets.quarterly,
        &existing.balance_sheets,
    );
    let balance_yearly = merged_statements_for_dates(
        &dates,
        &latest.balance_sheets.yearly,
        &existing.balance_sheets,
    );

    let cash_flow_quarterly = merged_statements_for_dates(
        &dates,
        &latest.cash_flow_statements.quarterly,
        &existing.cash_flow_statements,
    );
    let cash_flow_yearly = merged_statements_for_dates(
        &dates,
        &latest.cash_flow_statements.yearly,
        &existing.cash_flow_statements,
    );

    Some(FinancialStatements {
        income_statements: fill_series(&dates, &income_quarterly, &income_yearly, policy),
        balance_sheets: fill_series(&dates, &balance_quarterly, &balance_yearly, policy),
        cash_flow_statements: fill_series(
            &dates,
            &cash_flow_quarterly,
            &cash_flow_yearly,
            policy,
        ),
    })
}
