//! Quarter-end date universe for a reconciliation run.

use valuation_core::dates::{format_date, next_quarter_end, parse_date};
use valuation_core::{DateKey, DualCadenceStatements, FinancialStatements};

fn note_date<'a>(
    date: &'a str,
    earliest: &mut Option<&'a str>,
    latest: &mut Option<&'a str>,
) {
    match earliest {
        Some(e) if *e <= date => {}
        _ => *earliest = Some(date),
    }
    match latest {
        Some(l) if *l >= date => {}
        _ => *latest = Some(date),
    }
}

/// The inclusive list of quarter-end dates spanning the earliest to the
/// latest date observed across the existing reconciled series and the
/// freshly fetched series (both cadences, all three statement types).
///
/// Stepping starts at the earliest observed date (which may not itself
/// fall on a month end) and repeatedly adds three calendar months,
/// snapping to month end. Returns `None` when no dates were observed at
/// all (or none parse), the caller-visible "nothing to reconcile" signal.
pub fn quarterly_dates(
    existing: &FinancialStatements,
    latest: &DualCadenceStatements,
) -> Option<Vec<DateKey>> {
    let mut earliest: Option<&str> = None;
    let mut newest: Option<&str> = None;

    for date in existing
        .income_statements
        .keys()
        .chain(existing.balance_sheets.keys())
        .chain(existing.cash_flow_statements.keys())
    {
        note_date(date, &mut earliest, &mut newest);
    }

    for date in latest
        .income_statements
        .quarterly
        .keys()
        .chain(latest.income_statements.yearly.keys())
    {
        note_date(date, &mut earliest, &mut newest);
    }
    for date in latest
        .balance_sheets
        .quarterly
        .keys()
        .chain(latest.balance_sheets.yearly.keys())
    {
        note_date(date, &mut earliest, &mut newest);
    }
    for date in latest
        .cash_flow_statements
        .quarterly
        .keys()
        .chain(latest.cash_flow_statements.yearly.keys())
    {
        note_date(date, &mut earliest, &mut newest);
    }

    let start = parse_date(earliest?)?;
    let end = parse_date(newest?)?;

    let mut dates = Vec::new();
    let mut next = start;
    while next <= end {
        dates.push(format_date(next));
        next = match next_quarter_end(next) {
            Some(date) => date,
            None => break,
        };
    }

    Some(dates)
}
