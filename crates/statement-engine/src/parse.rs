//! Conversion of raw provider rows (string currency fields, separate
//! quarterly/yearly maps) into typed dual-cadence statements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use valuation_core::math::parse_currency;
use valuation_core::{
    BalanceSheet, CadencePair, CashFlowStatement, Currency, DateKey, DualCadenceStatements,
    FinancialStatements, IncomeStatement,
};

/// Provider income-statement row. All fields arrive as numeric strings;
/// anything unparseable is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIncomeStatement {
    pub total_revenue: String,
    pub net_income: String,
    pub net_income_from_continuing_ops: String,
    pub discontinued_operations: String,
    pub income_before_tax: String,
    pub interest_income: String,
    pub interest_expense: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBalanceSheet {
    pub total_assets: String,
    pub total_current_assets: String,
    pub total_liabilities: String,
    pub total_current_liabilities: String,
    pub retained_earnings: String,
    pub cash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCashFlowStatement {
    pub dividends_paid: String,
    pub cash_from_operations: String,
    pub capex: String,
    pub free_cash_flow: String,
}

/// One provider batch: per statement type, raw quarterly and yearly maps
/// keyed by ISO date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFinancialStatements {
    pub income_statements: CadencePair<RawIncomeStatement>,
    pub balance_sheets: CadencePair<RawBalanceSheet>,
    pub cash_flow_statements: CadencePair<RawCashFlowStatement>,
}

fn parse_income_statement(raw: &RawIncomeStatement) -> IncomeStatement {
    // Windfalls from discontinued operations shouldn't flatter the
    // valuation: when they exceed reported net income, use the
    // continuing-operations figure instead.
    let net_income = parse_currency(&raw.net_income);
    let discontinued = parse_currency(&raw.discontinued_operations);
    let net_income = if discontinued > net_income {
        parse_currency(&raw.net_income_from_continuing_ops)
    } else {
        net_income
    };

    IncomeStatement {
        total_revenue: parse_currency(&raw.total_revenue),
        net_income,
        income_before_tax: parse_currency(&raw.income_before_tax),
        interest_income: parse_currency(&raw.interest_income),
        interest_expense: parse_currency(&raw.interest_expense),
        ..Default::default()
    }
}

fn parse_balance_sheet(raw: &RawBalanceSheet) -> BalanceSheet {
    BalanceSheet {
        assets: parse_currency(&raw.total_assets),
        current_assets: parse_currency(&raw.total_current_assets),
        liabilities: parse_currency(&raw.total_liabilities),
        current_liabilities: parse_currency(&raw.total_current_liabilities),
        retained_earnings: parse_currency(&raw.retained_earnings),
        cash: parse_currency(&raw.cash),
        ..Default::default()
    }
}

fn parse_cash_flow_statement(raw: &RawCashFlowStatement) -> CashFlowStatement {
    let cash_from_operations = parse_currency(&raw.cash_from_operations);

    // Some providers omit capex; back it out of free cash flow instead.
    let capex = if raw.capex.trim().is_empty() {
        cash_from_operations - parse_currency(&raw.free_cash_flow)
    } else {
        parse_currency(&raw.capex)
    };

    CashFlowStatement {
        // Reported as an outflow; stored as a magnitude.
        dividends_paid: parse_currency(&raw.dividends_paid).abs(),
        cash_from_operations,
        capex,
        ..Default::default()
    }
}

fn parse_map<R, S>(raw: &BTreeMap<DateKey, R>, parser: fn(&R) -> S) -> BTreeMap<DateKey, S> {
    raw.iter()
        .map(|(date, row)| (date.clone(), parser(row)))
        .collect()
}

/// Parse a full provider batch into typed statements.
pub fn parse_provider_statements(raw: &RawFinancialStatements) -> DualCadenceStatements {
    DualCadenceStatements {
        income_statements: CadencePair {
            quarterly: parse_map(&raw.income_statements.quarterly, parse_income_statement),
            yearly: parse_map(&raw.income_statements.yearly, parse_income_statement),
        },
        balance_sheets: CadencePair {
            quarterly: parse_map(&raw.balance_sheets.quarterly, parse_balance_sheet),
            yearly: parse_map(&raw.balance_sheets.yearly, parse_balance_sheet),
        },
        cash_flow_statements: CadencePair {
            quarterly: parse_map(
                &raw.cash_flow_statements.quarterly,
                parse_cash_flow_statement,
            ),
            yearly: parse_map(&raw.cash_flow_statements.yearly, parse_cash_flow_statement),
        },
    }
}

/// Fill zero `dividends_paid` entries from an average annual figure
/// (spread across four quarters). Providers frequently omit dividends
/// from cash-flow statements.
pub fn backfill_dividends_paid(
    statements: &mut FinancialStatements,
    avg_annual_dividends: Currency,
) {
    for statement in statements.cash_flow_statements.values_mut() {
        if statement.dividends_paid == 0.0 {
            statement.dividends_paid = avg_annual_dividends / 4.0;
        }
    }
}
