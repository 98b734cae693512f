pub mod gapfill;
pub mod merge;
pub mod parse;
pub mod quarterly;
pub mod reconcile;

pub use gapfill::fill_series;
pub use merge::{merge_statements, merged_statements_for_dates};
pub use parse::{
    backfill_dividends_paid, parse_provider_statements, RawBalanceSheet, RawCashFlowStatement,
    RawFinancialStatements, RawIncomeStatement,
};
pub use quarterly::quarterly_dates;
pub use reconcile::make_financial_statements;
