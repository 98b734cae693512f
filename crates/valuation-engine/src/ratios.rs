//! Fundamental ratios and the trailing-window aggregates they are built
//! from. All divisions that can legitimately hit a zero denominator go
//! through `safe_divide`.

use std::collections::BTreeMap;

use chrono::Duration;

use valuation_core::dates::{format_date, parse_date};
use valuation_core::math::{growth_rate, safe_divide};
use valuation_core::{Currency, DateKey, Ratio, Shares, Statement, Stock};

pub fn equity(assets: Currency, liabilities: Currency) -> Currency {
    assets - liabilities
}

pub fn roe(net_income: Currency, equity: Currency) -> Ratio {
    safe_divide(net_income, equity)
}

pub fn roa(net_income: Currency, assets: Currency) -> Ratio {
    safe_divide(net_income, assets)
}

pub fn dte(total_debt: Currency, equity: Currency) -> Ratio {
    safe_divide(total_debt, equity)
}

pub fn current_ratio(current_assets: Currency, current_liabilities: Currency) -> Ratio {
    safe_divide(current_assets, current_liabilities)
}

/// Free cash flow for one quarter. Capex is reported with provider-
/// dependent sign, so its magnitude is always subtracted.
pub fn fcf(cash_from_operations: Currency, capex: Currency) -> Currency {
    cash_from_operations - capex.abs()
}

pub fn eps(net_income: Currency, shares_outstanding: Shares) -> Ratio {
    safe_divide(net_income, shares_outstanding as f64)
}

pub fn pe(current_price: Currency, eps: Ratio) -> Ratio {
    safe_divide(current_price, eps)
}

/// P/E over growth (growth expressed as a fraction, hence the x100).
/// Sign-corrected: a negative P/E divided by negative growth would read
/// as spuriously positive.
pub fn peg(pe: Ratio, growth_rate: Ratio) -> Ratio {
    if growth_rate == 0.0 {
        return 0.0;
    }

    let peg = pe / (100.0 * growth_rate);
    if pe < 0.0 && growth_rate < 0.0 {
        return -peg;
    }
    peg
}

pub fn pb(current_price: Currency, equity: Currency, shares_outstanding: Shares) -> Ratio {
    safe_divide(
        current_price,
        safe_divide(equity, shares_outstanding as f64),
    )
}

pub fn dividend_yield(
    dividends_paid: Currency,
    shares_outstanding: Shares,
    current_price: Currency,
) -> Ratio {
    safe_divide(
        safe_divide(dividends_paid, shares_outstanding as f64),
        current_price,
    )
}

pub fn market_cap(shares_outstanding: Shares, current_price: Currency) -> Currency {
    shares_outstanding as f64 * current_price
}

/// Altman Z-score over five balance-sheet/income ratios. Zero when
/// liabilities or revenue is zero, since the score is meaningless
/// without them.
pub fn altman_z_score(
    assets: Currency,
    liabilities: Currency,
    retained_earnings: Currency,
    ebit: Currency,
    total_revenue: Currency,
) -> Ratio {
    if liabilities == 0.0 || total_revenue == 0.0 {
        return 0.0;
    }

    let equity = equity(assets, liabilities);

    1.2 * equity / assets
        + 1.4 * retained_earnings / assets
        + 3.3 * ebit / assets
        + 0.6 * equity / liabilities
        + 1.0 * total_revenue / assets
}

/// The most recent `limit` non-zero values of one field, in ascending
/// date order. `None` takes the full history.
pub fn trailing_values<S: Statement>(
    statements: &BTreeMap<DateKey, S>,
    field: &str,
    limit: Option<usize>,
) -> Vec<f64> {
    let values: Vec<f64> = statements
        .values()
        .map(|statement| statement.get(field))
        .filter(|value| *value != 0.0)
        .collect();

    match limit {
        Some(n) if values.len() > n => values[values.len() - n..].to_vec(),
        _ => values,
    }
}

/// Average annualized net income over the trailing `years` window.
pub fn net_income_for_years(stock: &Stock, years: i32) -> Currency {
    let quarters = (years * 4).max(0) as usize;
    let total: f64 = trailing_values(
        &stock.financial_statements.income_statements,
        "net_income",
        Some(quarters),
    )
    .iter()
    .sum();

    safe_divide(total, years as f64)
}

/// Trailing-year free cash flow: the last four quarters of
/// operations-minus-capex.
pub fn fcf_for_year(stock: &Stock) -> Currency {
    stock
        .financial_statements
        .cash_flow_statements
        .values()
        .rev()
        .take(4)
        .map(|statement| fcf(statement.cash_from_operations, statement.capex))
        .sum()
}

pub fn dividends_paid_for_year(stock: &Stock) -> Currency {
    trailing_values(
        &stock.financial_statements.cash_flow_statements,
        "dividends_paid",
        Some(4),
    )
    .iter()
    .sum()
}

pub fn total_revenue_for_year(stock: &Stock) -> Currency {
    trailing_values(
        &stock.financial_statements.income_statements,
        "total_revenue",
        Some(4),
    )
    .iter()
    .sum()
}

/// Trailing-year EBIT.
///
/// Each quarter contributes the first non-zero of income-before-tax,
/// |interest expense|, |interest income|. The interest legs do not sum
/// with the pre-tax figure. Kept for parity with previously stored
/// valuations. TODO: rebaseline stored valuations, then switch to
/// income_before_tax - |interest_expense| + |interest_income|.
pub fn ebit_for_year(stock: &Stock) -> Currency {
    stock
        .financial_statements
        .income_statements
        .values()
        .rev()
        .take(4)
        .map(|statement| {
            if statement.income_before_tax != 0.0 {
                statement.income_before_tax
            } else if statement.interest_expense != 0.0 {
                statement.interest_expense.abs()
            } else if statement.interest_income != 0.0 {
                statement.interest_income.abs()
            } else {
                0.0
            }
        })
        .sum()
}

/// Mean of the per-quarter P/Es implied by quarterly EPS at the current
/// price, annualized x4.
pub fn avg_pe(stock: &Stock, quarters: usize) -> Ratio {
    let net_incomes = trailing_values(
        &stock.financial_statements.income_statements,
        "net_income",
        Some(quarters),
    );

    let pe_values: Vec<f64> = net_incomes
        .iter()
        .map(|net_income| {
            let quarterly_eps = eps(*net_income, stock.shares_outstanding);
            pe(stock.current_price, quarterly_eps)
        })
        .collect();

    if pe_values.is_empty() {
        return 0.0;
    }
    4.0 * pe_values.iter().sum::<f64>() / pe_values.len() as f64
}

/// Mean per-quarter return on equity, annualized x4.
pub fn avg_roe(stock: &Stock, quarters: usize) -> Ratio {
    let net_incomes = trailing_values(
        &stock.financial_statements.income_statements,
        "net_income",
        Some(quarters),
    );
    let assets = trailing_values(
        &stock.financial_statements.balance_sheets,
        "assets",
        Some(quarters),
    );
    let liabilities = trailing_values(
        &stock.financial_statements.balance_sheets,
        "liabilities",
        Some(quarters),
    );

    let len = net_incomes.len().min(assets.len()).min(liabilities.len());
    let mut roe_values = Vec::with_capacity(len);
    for i in 0..len {
        let quarter_equity = equity(assets[i], liabilities[i]);
        if quarter_equity != 0.0 {
            roe_values.push(roe(net_incomes[i], quarter_equity));
        }
    }

    if roe_values.is_empty() {
        return 0.0;
    }
    4.0 * roe_values.iter().sum::<f64>() / roe_values.len() as f64
}

/// Mean per-quarter return on assets, annualized x4.
pub fn avg_roa(stock: &Stock, quarters: usize) -> Ratio {
    let net_incomes = trailing_values(
        &stock.financial_statements.income_statements,
        "net_income",
        Some(quarters),
    );
    let assets = trailing_values(
        &stock.financial_statements.balance_sheets,
        "assets",
        Some(quarters),
    );

    let len = net_incomes.len().min(assets.len());
    let roa_values: Vec<f64> = (0..len).map(|i| roa(net_incomes[i], assets[i])).collect();

    if roa_values.is_empty() {
        return 0.0;
    }
    4.0 * roa_values.iter().sum::<f64>() / roa_values.len() as f64
}

/// Implied growth of one statement field over its trailing window.
pub fn value_growth_rate<S: Statement>(
    statements: &BTreeMap<DateKey, S>,
    field: &str,
    limit: usize,
) -> Ratio {
    growth_rate(&trailing_values(statements, field, Some(limit)))
}

/// Growth of the open price over the 365 days preceding the most recent
/// priced date. Anchored at the data, not the wall clock, so snapshot
/// replays are deterministic.
pub fn price_growth_rate(stock: &Stock) -> Ratio {
    let anchor = match stock
        .historical_pricing
        .keys()
        .next_back()
        .and_then(|key| parse_date(key))
    {
        Some(date) => date,
        None => return 0.0,
    };
    let cutoff = format_date(anchor - Duration::days(365));

    let opens: Vec<f64> = stock
        .historical_pricing
        .iter()
        .filter(|(date, price)| date.as_str() > cutoff.as_str() && price.open != 0.0)
        .map(|(_, price)| price.open)
        .collect();

    growth_rate(&opens)
}

/// Whole years of statement coverage: the thinnest statement series
/// governs.
pub fn statement_years(stock: &Stock) -> i32 {
    let statements = &stock.financial_statements;
    let quarters = statements
        .income_statements
        .len()
        .min(statements.balance_sheets.len())
        .min(statements.cash_flow_statements.len());

    (quarters / 4) as i32
}
