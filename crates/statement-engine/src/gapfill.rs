//! Gap filling: turns a merged-but-holey quarterly series into a
//! complete one. For each empty quarter, in order of preference:
//! substitute the yearly statement at that date, interpolate between the
//! nearest known neighbours, or project a fitted trend from prior
//! history.

use std::collections::BTreeMap;

use tracing::debug;

use valuation_core::dates::{day_number, parse_date};
use valuation_core::math::{round2, trend_estimate};
use valuation_core::{DateKey, Provenance, Statement, ValidityPolicy};

/// Produce a complete series over `dates`.
///
/// Chronologically ascending; a gap filled at quarter *i* is visible as
/// known history when later gaps look backwards, so a run of trailing
/// gaps extends the trend rather than restarting it.
pub fn fill_series<S: Statement>(
    dates: &[DateKey],
    merged_quarterly: &BTreeMap<DateKey, S>,
    merged_yearly: &BTreeMap<DateKey, S>,
    policy: &ValidityPolicy,
) -> BTreeMap<DateKey, S> {
    let mut series: Vec<S> = Vec::with_capacity(dates.len());

    // First pass: reported quarterly values, then yearly substitution.
    for date in dates {
        let quarterly = merged_quarterly.get(date).cloned().unwrap_or_default();

        if !quarterly.is_empty_or_invalid(policy) {
            let mut statement = quarterly;
            statement.set_source(Some(Provenance::Actual));
            statement.set_estimate(false);
            series.push(statement);
            continue;
        }

        match merged_yearly.get(date) {
            Some(yearly) if !yearly.is_empty_or_invalid(policy) => {
                let mut statement = S::default();
                for field in S::FIELD_NAMES {
                    statement.set(field, yearly.get(field) / S::YEARLY_DIVISOR);
                }
                statement.set_source(Some(Provenance::YearlyDerived));
                statement.set_estimate(false);
                series.push(statement);
            }
            _ => series.push(S::default()),
        }
    }

    // Second pass: interpolate or extrapolate the remaining holes.
    for i in 0..series.len() {
        if !series[i].is_empty() {
            continue;
        }

        let prev = (0..i).rev().find(|&j| !series[j].is_empty());
        let next = ((i + 1)..series.len()).find(|&j| !series[j].is_empty());

        let filled = match (prev, next) {
            (Some(p), Some(n)) => interpolate(&series[p], &series[n], p, i, n),
            _ => extrapolate(&series, dates, i),
        };

        debug!(
            date = dates[i].as_str(),
            source = ?filled.source(),
            "filled statement gap"
        );
        series[i] = filled;
    }

    dates.iter().cloned().zip(series).collect()
}

/// Linear interpolation between the statements at indices `p` and `n`,
/// proportional to index distance.
fn interpolate<S: Statement>(prev: &S, next: &S, p: usize, i: usize, n: usize) -> S {
    let fraction = (i - p) as f64 / (n - p) as f64;

    let mut statement = S::default();
    for field in S::FIELD_NAMES {
        let a = prev.get(field);
        let b = next.get(field);
        statement.set(field, round2(a + (b - a) * fraction));
    }
    statement.set_source(Some(Provenance::Interpolated));
    statement.set_estimate(true);
    statement
}

/// Trend projection from all known prior values of each field. Fields
/// with fewer than three prior observations stay at zero; nothing is
/// trended from nothing.
fn extrapolate<S: Statement>(series: &[S], dates: &[DateKey], i: usize) -> S {
    let mut statement = S::default();
    let target = date_coordinate(dates, i);

    for field in S::FIELD_NAMES {
        let points: Vec<(f64, f64)> = (0..i)
            .filter(|&j| !series[j].is_empty())
            .filter_map(|j| {
                let value = series[j].get(field);
                (value != 0.0).then(|| (date_coordinate(dates, j), value))
            })
            .collect();

        statement.set(field, trend_estimate(&points, target));
    }
    statement.set_source(Some(Provenance::Trend));
    statement.set_estimate(true);
    statement
}

fn date_coordinate(dates: &[DateKey], i: usize) -> f64 {
    parse_date(&dates[i]).map(day_number).unwrap_or(i as f64)
}
