use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use valuation_core::{Currency, DateKey, Ratio, Shares, Symbol, ValuationModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
    Deposit,
}

/// One ledger entry, keyed in the portfolio by a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTransaction {
    pub date: DateKey,
    pub amount: Currency,
    pub kind: TransactionKind,
    #[serde(default)]
    pub symbol: Symbol,
    #[serde(default)]
    pub price: Currency,
    #[serde(default)]
    pub shares: Shares,
}

/// A holding: running average entry price and share count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioStock {
    pub avg_price: Currency,
    pub shares: Shares,
}

/// Simulated portfolio state, carried forward day to day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub cash: Currency,
    pub transaction_history: BTreeMap<String, PortfolioTransaction>,
    pub stocks: BTreeMap<Symbol, PortfolioStock>,
    pub roi: Ratio,
    pub model: ValuationModel,
}
