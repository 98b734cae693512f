//! Portfolio bookkeeping: deposits, purchases, sales, dividends, and
//! the final annualized return. Cash amounts are kept at 2 dp.

use chrono::NaiveDate;
use uuid::Uuid;

use valuation_core::dates::format_date;
use valuation_core::math::{round2, safe_divide};
use valuation_core::{Currency, Stock, Stocks, ValuationModel};

use crate::models::{Portfolio, PortfolioStock, PortfolioTransaction, TransactionKind};

fn transaction_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn make_deposit(portfolio: &mut Portfolio, date: NaiveDate, amount: Currency) {
    portfolio.cash = round2(portfolio.cash + amount);
    portfolio.transaction_history.insert(
        transaction_id(),
        PortfolioTransaction {
            date: format_date(date),
            amount,
            kind: TransactionKind::Deposit,
            symbol: String::new(),
            price: 0.0,
            shares: 0,
        },
    );
}

/// Buy as many whole shares as the buy limit (or remaining cash, if
/// smaller) allows. Repeat purchases blend the running average price.
pub fn make_purchase(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    stock: &Stock,
    model: &ValuationModel,
) {
    if portfolio.cash < stock.current_price || stock.current_price <= 0.0 {
        return;
    }

    let budget = if portfolio.cash <= model.buy_limit {
        portfolio.cash
    } else {
        model.buy_limit
    };
    let shares_to_buy = (budget / stock.current_price).floor() as i64;
    if shares_to_buy == 0 {
        return;
    }

    let holding = portfolio
        .stocks
        .entry(stock.symbol.clone())
        .or_insert(PortfolioStock {
            avg_price: stock.current_price,
            shares: 0,
        });
    if holding.shares > 0 {
        holding.avg_price = round2((holding.avg_price + stock.current_price) / 2.0);
    }
    holding.shares += shares_to_buy;

    let cost = round2(shares_to_buy as f64 * stock.current_price);
    portfolio.cash = round2(portfolio.cash - cost);

    portfolio.transaction_history.insert(
        transaction_id(),
        PortfolioTransaction {
            date: format_date(date),
            amount: cost,
            kind: TransactionKind::Buy,
            symbol: stock.symbol.clone(),
            price: stock.current_price,
            shares: shares_to_buy,
        },
    );
}

/// Sell the whole holding at the current price, deducting capital-gains
/// tax on positive gains only; losses carry no deduction.
pub fn make_sale(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    stock: &Stock,
    model: &ValuationModel,
) {
    let holding = match portfolio.stocks.remove(&stock.symbol) {
        Some(holding) => holding,
        None => return,
    };

    let capital_gained =
        (holding.shares as f64 * (stock.current_price - holding.avg_price)).max(0.0);
    let proceeds = round2(
        holding.shares as f64 * stock.current_price - capital_gained * model.tax_rate,
    );

    portfolio.cash = round2(portfolio.cash + proceeds);

    portfolio.transaction_history.insert(
        transaction_id(),
        PortfolioTransaction {
            date: format_date(date),
            amount: proceeds,
            kind: TransactionKind::Sell,
            symbol: stock.symbol.clone(),
            price: stock.current_price,
            shares: holding.shares,
        },
    );
}

/// Credit the dividend due on an owned holding, net of tax. No-op for
/// unowned symbols or stocks without a dividend yield.
pub fn make_dividend_payment(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    stock: &Stock,
    model: &ValuationModel,
) {
    let shares_owned = match portfolio.stocks.get(&stock.symbol) {
        Some(holding) if holding.shares > 0 => holding.shares,
        _ => return,
    };
    if stock.valuation.dividend_yield == 0.0 {
        return;
    }

    let dividends_due = round2(
        stock.valuation.dividend_yield * shares_owned as f64 * (1.0 - model.tax_rate),
    );

    portfolio.cash = round2(portfolio.cash + dividends_due);

    portfolio.transaction_history.insert(
        transaction_id(),
        PortfolioTransaction {
            date: format_date(date),
            amount: dividends_due,
            kind: TransactionKind::Dividend,
            symbol: stock.symbol.clone(),
            price: 0.0,
            shares: 0,
        },
    );
}

/// Annualized return on everything deposited: portfolio value (cash plus
/// holdings at current prices) against total deposits, spread over the
/// full years traded (minimum one).
pub fn annualized_roi(
    portfolio: &Portfolio,
    stocks: &Stocks,
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    let mut portfolio_value = portfolio.cash;
    for (symbol, holding) in &portfolio.stocks {
        if let Some(stock) = stocks.get(symbol) {
            portfolio_value += holding.shares as f64 * stock.current_price;
        }
    }

    let total_invested: Currency = portfolio
        .transaction_history
        .values()
        .filter(|t| t.kind == TransactionKind::Deposit)
        .map(|t| t.amount)
        .sum();

    let years = full_years_between(start, end).max(1);

    safe_divide(portfolio_value - total_invested, total_invested) / years as f64
}

fn full_years_between(start: NaiveDate, end: NaiveDate) -> i32 {
    use chrono::Datelike;
    let mut years = end.year() - start.year();
    if (end.month(), end.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years.max(0)
}
