use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Symbol = String;
/// ISO calendar date string (`YYYY-MM-DD`). Lexicographic order is
/// chronological order, so these double as sortable map keys.
pub type DateKey = String;
pub type Currency = f64;
pub type Ratio = f64;
pub type Shares = i64;

/// Where a reconciled statement's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Reported quarterly figures.
    Actual,
    /// Derived from a yearly statement at the same date.
    YearlyDerived,
    /// Linearly interpolated between two known statements.
    Interpolated,
    /// Projected from a fitted trend of prior statements.
    Trend,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeStatement {
    pub total_revenue: Currency,
    pub net_income: Currency,
    pub income_before_tax: Currency,
    pub interest_income: Currency,
    pub interest_expense: Currency,
    pub estimate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSheet {
    pub assets: Currency,
    pub current_assets: Currency,
    pub liabilities: Currency,
    pub current_liabilities: Currency,
    pub retained_earnings: Currency,
    pub cash: Currency,
    pub estimate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowStatement {
    pub dividends_paid: Currency,
    pub cash_from_operations: Currency,
    pub capex: Currency,
    pub estimate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Provenance>,
}

/// One reconciled, quarterly series per statement type, keyed by
/// quarter-end date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialStatements {
    pub income_statements: BTreeMap<DateKey, IncomeStatement>,
    pub balance_sheets: BTreeMap<DateKey, BalanceSheet>,
    pub cash_flow_statements: BTreeMap<DateKey, CashFlowStatement>,
}

impl FinancialStatements {
    /// True when every statement type has at least one entry.
    pub fn is_complete(&self) -> bool {
        !self.income_statements.is_empty()
            && !self.balance_sheets.is_empty()
            && !self.cash_flow_statements.is_empty()
    }
}

/// A statement series as fetched from a provider: quarterly and yearly
/// cadences kept separate, prior to reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadencePair<S> {
    pub quarterly: BTreeMap<DateKey, S>,
    pub yearly: BTreeMap<DateKey, S>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualCadenceStatements {
    pub income_statements: CadencePair<IncomeStatement>,
    pub balance_sheets: CadencePair<BalanceSheet>,
    pub cash_flow_statements: CadencePair<CashFlowStatement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalPrice {
    pub open: Currency,
    pub close: Currency,
}

pub type HistoricalPricing = BTreeMap<DateKey, HistoricalPrice>;

/// BUY/HOLD/SELL decision derived from a valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instruction {
    Buy,
    Hold,
    Sell,
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Buy => write!(f, "BUY"),
            Instruction::Hold => write!(f, "HOLD"),
            Instruction::Sell => write!(f, "SELL"),
        }
    }
}

/// Bankruptcy-risk bucket from the Altman Z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthCategory {
    Healthy,
    Average,
    Dying,
}

impl HealthCategory {
    /// < 1.8 distressed, >= 3.0 safe, grey zone in between.
    pub fn from_z_score(z: Ratio) -> Self {
        if z < 1.8 {
            HealthCategory::Dying
        } else if z >= 3.0 {
            HealthCategory::Healthy
        } else {
            HealthCategory::Average
        }
    }
}

/// Everything computed for one company in one evaluation run. Recomputed
/// each cycle, never treated as a source of truth. A default (all-zero)
/// valuation is the "cannot value" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Valuation {
    pub dividend_yield: Ratio,
    pub market_cap: Currency,
    pub roe: Ratio,
    pub roa: Ratio,
    pub growth_rate: Ratio,
    pub price_growth_rate: Ratio,
    pub dte: Ratio,
    pub cr: Ratio,
    pub eps: Currency,
    pub pe: Ratio,
    pub peg: Ratio,
    pub pb: Ratio,
    pub blended_multiplier: Ratio,
    pub fcf: Currency,
    pub liquidation_iv: Currency,
    pub pe_multiple_iv: Currency,
    pub graham_iv: Currency,
    pub dcf_iv: Currency,
    pub roe_iv: Currency,
    pub altman_z_score: Ratio,
    pub statement_years: i32,
    pub fair_value: Currency,
    pub expected_return: Ratio,
    pub mos: Ratio,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<Instruction>,
}

/// Which balance-sheet fields must be non-zero for a statement to count
/// as valid. Some companies legitimately report zero retained earnings,
/// so the strict check is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityPolicy {
    pub require_retained_earnings: bool,
    pub require_current_liabilities: bool,
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            require_retained_earnings: false,
            require_current_liabilities: true,
        }
    }
}

/// A named bundle of valuation thresholds and simulation knobs. Several
/// models can be evaluated against the same company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationModel {
    pub name: String,
    pub discount_rate: Ratio,
    pub decline_rate: Ratio,
    pub tax_rate: Ratio,
    /// Margin of safety, applied as a haircut on the growth rate.
    pub min_mos: Ratio,
    pub top_up: Currency,
    pub buy_limit: Currency,
    pub start_date: DateKey,
    pub min_roe: Ratio,
    pub min_roa: Ratio,
    pub min_growth_rate: Ratio,
    pub max_price_growth_rate: Ratio,
    pub max_dte: Ratio,
    pub min_cr: Ratio,
    pub min_eps: Currency,
    pub max_pe: Ratio,
    pub max_peg: Ratio,
    pub max_pb: Ratio,
    pub min_altman_z_score: Ratio,
    pub min_statement_years: i32,
    pub max_blended_multiplier: Ratio,
    /// Smoothing window (years) for earnings-derived ratios.
    pub years_for_earnings_calcs: i32,
    pub validity: ValidityPolicy,
}

impl Default for ValuationModel {
    fn default() -> Self {
        Self {
            name: String::new(),
            discount_rate: 0.07,
            decline_rate: 0.056,
            tax_rate: 0.18,
            min_mos: 0.25,
            top_up: 1000.00,
            buy_limit: 1000.00,
            start_date: String::new(),
            min_roe: 0.15,
            min_roa: 0.02,
            min_growth_rate: 0.03,
            max_price_growth_rate: 0.00,
            max_dte: 0.5,
            min_cr: 2.0,
            min_eps: 0.00,
            max_pe: 25.0,
            max_peg: 1.0,
            max_pb: 1.0,
            min_altman_z_score: 3.0,
            min_statement_years: 3,
            max_blended_multiplier: 22.5,
            years_for_earnings_calcs: 3,
            validity: ValidityPolicy::default(),
        }
    }
}

/// Aggregate root for one listed company. Reconciliation works on a copy
/// and only replaces these maps once a pipeline run completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stock {
    pub symbol: Symbol,
    pub current_price: Currency,
    pub shares_outstanding: Shares,
    pub historical_pricing: HistoricalPricing,
    pub financial_statements: FinancialStatements,
    pub valuation: Valuation,
    pub last_updated: DateKey,
}

pub type Stocks = BTreeMap<Symbol, Stock>;
