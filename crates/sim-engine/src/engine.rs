//! Historical replay: walk a date range a day at a time, revalue every
//! stock from its point-in-time snapshot, and trade on the instructions.
//! Days run strictly in order because portfolio state carries forward.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use snapshot_engine::snapshot;
use valuation_core::dates::{format_date, is_end_of_month, parse_date};
use valuation_core::{DateKey, EngineError, Instruction, Stock, Stocks, ValuationModel};
use valuation_engine::evaluate;

use crate::models::Portfolio;
use crate::portfolio::{
    annualized_roi, make_deposit, make_dividend_payment, make_purchase, make_sale,
};

/// Earliest statement date across the universe: the first day the
/// simulation could possibly value anything.
pub fn earliest_statement_date(stocks: &Stocks) -> Option<DateKey> {
    stocks
        .values()
        .flat_map(|stock| {
            let statements = &stock.financial_statements;
            statements
                .income_statements
                .keys()
                .chain(statements.balance_sheets.keys())
                .chain(statements.cash_flow_statements.keys())
        })
        .min()
        .cloned()
}

/// Replay the valuation strategy between `start` (defaults to the
/// model's start date, then to the earliest statement date) and `end`,
/// exclusive. Returns the finished portfolio with its annualized ROI.
pub fn run(
    mut portfolio: Portfolio,
    stocks: &Stocks,
    model: &ValuationModel,
    start: Option<&str>,
    end: &str,
) -> Result<Portfolio, EngineError> {
    let start_key = start
        .map(str::to_string)
        .or_else(|| (!model.start_date.is_empty()).then(|| model.start_date.clone()))
        .or_else(|| earliest_statement_date(stocks))
        .ok_or_else(|| {
            EngineError::InsufficientData("no statements to derive a start date from".into())
        })?;

    let start_date = parse_date(&start_key)
        .ok_or_else(|| EngineError::InvalidDate(start_key.clone()))?;
    let end_date = parse_date(end).ok_or_else(|| EngineError::InvalidDate(end.to_string()))?;
    if end_date < start_date {
        return Err(EngineError::InvalidDate(format!(
            "end {} precedes start {}",
            end, start_key
        )));
    }

    info!(
        start = start_key.as_str(),
        end = end,
        universe = stocks.len(),
        model = model.name.as_str(),
        "simulation started"
    );

    let mut date = start_date;
    while date < end_date {
        let mut stocks_to_buy: Vec<Stock> = Vec::new();
        let mut stocks_to_sell: Vec<Stock> = Vec::new();
        let date_key = format_date(date);

        for stock in stocks.values() {
            // Only trade on days the stock actually priced.
            if !stock.historical_pricing.contains_key(&date_key) {
                continue;
            }

            let mut snap = match snapshot(stock, date) {
                Some(snap) => snap,
                None => continue,
            };
            snap.valuation = evaluate(&snap, model);

            match snap.valuation.instruction {
                Some(Instruction::Buy) => {
                    debug!(symbol = snap.symbol.as_str(), date = date_key.as_str(), "buy signal");
                    stocks_to_buy.push(snap);
                }
                Some(Instruction::Sell) => stocks_to_sell.push(snap),
                _ => {}
            }
        }

        trade(
            &mut portfolio,
            date,
            stocks_to_buy,
            &stocks_to_sell,
            stocks,
            model,
        );

        date += Duration::days(1);
    }

    portfolio.roi = annualized_roi(&portfolio, stocks, start_date, end_date);
    portfolio.model = model.clone();

    info!(roi = portfolio.roi, "simulation finished");
    Ok(portfolio)
}

/// One day of trading: top up at month end, buy the best-discounted
/// candidates first, sell whatever we own that turned, then collect any
/// dividends falling due.
fn trade(
    portfolio: &mut Portfolio,
    date: NaiveDate,
    mut stocks_to_buy: Vec<Stock>,
    stocks_to_sell: &[Stock],
    stocks: &Stocks,
    model: &ValuationModel,
) {
    if is_end_of_month(date) {
        make_deposit(portfolio, date, model.top_up);
    }

    // Deepest margin of safety first.
    stocks_to_buy.sort_by(|a, b| {
        b.valuation
            .mos
            .partial_cmp(&a.valuation.mos)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for stock in &stocks_to_buy {
        make_purchase(portfolio, date, stock, model);
    }

    for stock in stocks_to_sell {
        if portfolio.stocks.contains_key(&stock.symbol) {
            make_sale(portfolio, date, stock, model);
        }
    }

    // Dividends pay out when the day lands on a cash-flow statement date.
    let date_key = format_date(date);
    let owned: Vec<String> = portfolio.stocks.keys().cloned().collect();
    for symbol in owned {
        if let Some(stock) = stocks.get(&symbol) {
            if stock
                .financial_statements
                .cash_flow_statements
                .contains_key(&date_key)
            {
                make_dividend_payment(portfolio, date, stock, model);
            }
        }
    }
}
