//! Date-key helpers. Statement maps are keyed by ISO `YYYY-MM-DD`
//! strings, stepped at quarter-end intervals.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::types::DateKey;

pub fn parse_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

pub fn format_date(date: NaiveDate) -> DateKey {
    date.format("%Y-%m-%d").to_string()
}

pub fn is_end_of_month(date: NaiveDate) -> bool {
    (date + Duration::days(1)).month() != date.month()
}

/// Last day of `date`'s month.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of a month always exists; its predecessor is the month end.
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.pred_opt().unwrap_or(date))
        .unwrap_or(date)
}

/// Step three calendar months forward (day clamped) and snap to the end
/// of the resulting month.
pub fn next_quarter_end(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(3)).map(end_of_month)
}

/// Numeric encoding of a date for regression: days since the Common Era.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}
