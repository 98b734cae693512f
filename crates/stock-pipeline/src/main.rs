//! stock-pipeline: refresh persisted stocks and replay the strategy.
//!
//! Update mode reads every `<data-dir>/stocks/*.json`, reconciles any
//! freshly fetched statements waiting in `<data-dir>/latest/<SYMBOL>.json`,
//! re-evaluates, and writes the stock back.
//!
//! Usage:
//!   cargo run -p stock-pipeline -- --data-dir data
//!   cargo run -p stock-pipeline -- --simulate --start-date 2015-01-01
//!   cargo run -p stock-pipeline -- --simulate --models data/models.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use sim_engine::Portfolio;
use statement_engine::{make_financial_statements, parse_provider_statements, RawFinancialStatements};
use valuation_core::dates::format_date;
use valuation_core::{DualCadenceStatements, Stock, Stocks, ValuationModel};
use valuation_engine::evaluate;

const STARTING_CASH: f64 = 1000.0;

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_pipeline=info,sim_engine=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let simulate = args.iter().any(|a| a == "--simulate");

    let data_dir = arg_value(&args, "--data-dir")
        .or_else(|| std::env::var("STOCK_DATA_DIR").ok())
        .unwrap_or_else(|| "data".to_string());
    let data_dir = PathBuf::from(data_dir);

    if simulate {
        let start_date = arg_value(&args, "--start-date");
        let end_date = arg_value(&args, "--end-date")
            .unwrap_or_else(|| format_date(chrono::Local::now().date_naive()));
        let models_path = arg_value(&args, "--models");
        run_simulations(&data_dir, start_date.as_deref(), &end_date, models_path)
    } else {
        update_stocks(&data_dir)
    }
}

/// Reconcile and re-evaluate every persisted stock.
fn update_stocks(data_dir: &Path) -> Result<()> {
    let stocks_dir = data_dir.join("stocks");
    let today = format_date(chrono::Local::now().date_naive());
    let model = ValuationModel::default();

    let mut updated = 0usize;
    let mut skipped = 0usize;

    for entry in fs::read_dir(&stocks_dir)
        .with_context(|| format!("reading {}", stocks_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let mut stock: Stock = serde_json::from_str(&fs::read_to_string(&path)?)
            .with_context(|| format!("parsing {}", path.display()))?;

        if stock.last_updated == today {
            skipped += 1;
            continue;
        }

        let latest = load_latest_statements(data_dir, &stock.symbol)?;

        match make_financial_statements(&stock.financial_statements, &latest, &model.validity) {
            Some(statements) => stock.financial_statements = statements,
            None => {
                warn!(symbol = stock.symbol.as_str(), "no usable statement dates, skipping");
                skipped += 1;
                continue;
            }
        }

        stock.valuation = evaluate(&stock, &model);
        stock.last_updated = today.clone();

        fs::write(&path, serde_json::to_string_pretty(&stock)?)?;
        info!(
            symbol = stock.symbol.as_str(),
            instruction = ?stock.valuation.instruction,
            fair_value = stock.valuation.fair_value,
            "updated"
        );
        updated += 1;
    }

    info!(updated, skipped, "update run finished");
    Ok(())
}

/// Raw provider rows staged for one symbol, if any.
fn load_latest_statements(data_dir: &Path, symbol: &str) -> Result<DualCadenceStatements> {
    let path = data_dir.join("latest").join(format!("{symbol}.json"));
    if !path.exists() {
        return Ok(DualCadenceStatements::default());
    }

    let raw: RawFinancialStatements = serde_json::from_str(&fs::read_to_string(&path)?)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(parse_provider_statements(&raw))
}

/// Replay every model in the models file over the stored universe.
fn run_simulations(
    data_dir: &Path,
    start_date: Option<&str>,
    end_date: &str,
    models_path: Option<String>,
) -> Result<()> {
    let stocks = load_stocks(data_dir)?;

    let models: Vec<ValuationModel> = match models_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(&path)?)
            .with_context(|| format!("parsing {path}"))?,
        None => vec![ValuationModel::default()],
    };

    let today = format_date(chrono::Local::now().date_naive());
    let out_dir = data_dir.join("simulations").join(&today);
    fs::create_dir_all(&out_dir)?;

    for model in models {
        let mut portfolio = Portfolio::default();
        sim_engine::portfolio::make_deposit(
            &mut portfolio,
            chrono::Local::now().date_naive(),
            STARTING_CASH,
        );

        let portfolio = sim_engine::run(portfolio, &stocks, &model, start_date, end_date)?;
        info!(
            model = model.name.as_str(),
            roi_percent = (portfolio.roi * 100.0).round(),
            "simulation complete"
        );

        let name = if model.name.is_empty() { "default" } else { &model.name };
        let out_path = out_dir.join(format!("{name}.json"));
        fs::write(&out_path, serde_json::to_string_pretty(&portfolio)?)?;
        info!(path = %out_path.display(), "portfolio written");
    }

    Ok(())
}

fn load_stocks(data_dir: &Path) -> Result<Stocks> {
    let stocks_dir = data_dir.join("stocks");
    let mut stocks = Stocks::new();

    for entry in fs::read_dir(&stocks_dir)
        .with_context(|| format!("reading {}", stocks_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stock: Stock = serde_json::from_str(&fs::read_to_string(&path)?)
            .with_context(|| format!("parsing {}", path.display()))?;
        stocks.insert(stock.symbol.clone(), stock);
    }

    info!(count = stocks.len(), "stocks loaded");
    Ok(stocks)
}
