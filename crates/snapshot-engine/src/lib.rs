//! Point-in-time stock snapshots: reconstruct the view of a company's
//! data that was available on a given historical date, so the valuation
//! engine can be replayed without look-ahead bias.

use chrono::{Duration, NaiveDate};

use valuation_core::dates::format_date;
use valuation_core::{Currency, FinancialStatements, Stock};

/// The open price on `date`, walking back one day at a time when the
/// market was closed. The walk is bounded by the earliest priced date;
/// beyond it there is no price, and the result is 0.
pub fn historical_price(stock: &Stock, date: NaiveDate) -> Currency {
    let earliest = match stock.historical_pricing.keys().next() {
        Some(key) => key.clone(),
        None => return 0.0,
    };

    let mut cursor = date;
    loop {
        let key = format_date(cursor);
        if key < earliest {
            return 0.0;
        }
        if let Some(price) = stock.historical_pricing.get(&key) {
            // Open, not an open/close average: the simulation trades at
            // the start of the day.
            return price.open;
        }
        cursor -= Duration::days(1);
    }
}

/// All statements dated on or before `date`.
pub fn statements_as_of(stock: &Stock, date: NaiveDate) -> FinancialStatements {
    let cutoff = format_date(date);
    let statements = &stock.financial_statements;

    FinancialStatements {
        income_statements: statements
            .income_statements
            .range(..=cutoff.clone())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        balance_sheets: statements
            .balance_sheets
            .range(..=cutoff.clone())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        cash_flow_statements: statements
            .cash_flow_statements
            .range(..=cutoff)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

/// The stock as it looked on `date`: price as of that day, statements
/// filtered to what had been published, share count carried unchanged
/// (share-count history is not tracked). `None` when no price exists at
/// or before the date, or when any statement series ends up empty.
pub fn snapshot(stock: &Stock, date: NaiveDate) -> Option<Stock> {
    let current_price = historical_price(stock, date);
    if current_price == 0.0 {
        return None;
    }

    let financial_statements = statements_as_of(stock, date);
    if !financial_statements.is_complete() {
        return None;
    }

    Some(Stock {
        symbol: stock.symbol.clone(),
        current_price,
        shares_outstanding: stock.shares_outstanding,
        historical_pricing: stock.historical_pricing.clone(),
        financial_statements,
        valuation: Default::default(),
        last_updated: format_date(date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{
        BalanceSheet, CashFlowStatement, HistoricalPrice, IncomeStatement,
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn priced_stock() -> Stock {
        let mut stock = Stock {
            symbol: "IND".to_string(),
            shares_outstanding: 1_000_000,
            ..Default::default()
        };
        for (day, open) in [
            ("2020-03-02", 10.0),
            ("2020-03-03", 11.0),
            ("2020-03-06", 12.0),
        ] {
            stock.historical_pricing.insert(
                day.to_string(),
                HistoricalPrice { open, close: open },
            );
        }
        stock
            .financial_statements
            .income_statements
            .insert("2019-12-31".to_string(), IncomeStatement::default());
        stock
            .financial_statements
            .balance_sheets
            .insert("2019-12-31".to_string(), BalanceSheet::default());
        stock
            .financial_statements
            .cash_flow_statements
            .insert("2019-12-31".to_string(), CashFlowStatement::default());
        stock
            .financial_statements
            .income_statements
            .insert("2020-03-31".to_string(), IncomeStatement::default());
        stock
    }

    #[test]
    fn test_historical_price_exact_day() {
        let stock = priced_stock();
        assert_eq!(historical_price(&stock, date("2020-03-03")), 11.0);
    }

    #[test]
    fn test_historical_price_walks_back_over_closed_days() {
        let stock = priced_stock();
        // 4th and 5th have no bar; the walk lands on the 3rd.
        assert_eq!(historical_price(&stock, date("2020-03-05")), 11.0);
    }

    #[test]
    fn test_historical_price_before_range_is_zero() {
        let stock = priced_stock();
        assert_eq!(historical_price(&stock, date("2020-03-01")), 0.0);
        assert_eq!(historical_price(&stock, date("2019-06-01")), 0.0);
    }

    #[test]
    fn test_snapshot_before_earliest_price_is_none() {
        let stock = priced_stock();
        assert!(snapshot(&stock, date("2020-03-01")).is_none());
    }

    #[test]
    fn test_snapshot_filters_future_statements() {
        let stock = priced_stock();
        let snap = snapshot(&stock, date("2020-03-03")).unwrap();

        assert_eq!(snap.current_price, 11.0);
        assert_eq!(snap.shares_outstanding, 1_000_000);
        assert_eq!(snap.financial_statements.income_statements.len(), 1);
        assert!(snap
            .financial_statements
            .income_statements
            .contains_key("2019-12-31"));
    }

    #[test]
    fn test_snapshot_inclusive_of_statement_date() {
        let stock = priced_stock();
        let snap = snapshot(&stock, date("2020-03-31")).unwrap();
        assert_eq!(snap.financial_statements.income_statements.len(), 2);
    }

    #[test]
    fn test_snapshot_missing_statement_type_is_none() {
        let mut stock = priced_stock();
        stock.financial_statements.cash_flow_statements.clear();
        assert!(snapshot(&stock, date("2020-03-03")).is_none());
    }
}
