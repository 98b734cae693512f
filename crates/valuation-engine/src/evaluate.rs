//! Full valuation of one company against one model: ratios, the four
//! intrinsic-value estimates, the viability gate, and the final
//! BUY/HOLD/SELL instruction.

use tracing::debug;

use valuation_core::math::{round2, safe_divide};
use valuation_core::{
    HealthCategory, Instruction, Statement, Stock, Valuation, ValuationModel,
};

use crate::intrinsic;
use crate::ratios;

/// Evaluate a stock, producing a fresh valuation.
///
/// When the latest statement of any type fails its validity predicate
/// the result is the all-zero valuation, an explicit "cannot value"
/// sentinel rather than an error: without trustworthy current statements there
/// is no way to know when to sell what was bought on them.
///
/// Every stored ratio is rounded to 2 dp as it is computed; the
/// viability gate and instruction run on the rounded values.
pub fn evaluate(stock: &Stock, model: &ValuationModel) -> Valuation {
    let statements = &stock.financial_statements;
    let (income, balance, cash_flow) = match (
        statements.income_statements.values().next_back(),
        statements.balance_sheets.values().next_back(),
        statements.cash_flow_statements.values().next_back(),
    ) {
        (Some(income), Some(balance), Some(cash_flow)) => (income, balance, cash_flow),
        _ => return Valuation::default(),
    };

    if !income.is_valid(&model.validity)
        || !balance.is_valid(&model.validity)
        || !cash_flow.is_valid(&model.validity)
    {
        debug!(symbol = stock.symbol.as_str(), "latest statements unusable");
        return Valuation::default();
    }
    let quarters = (model.years_for_earnings_calcs * 4).max(0) as usize;

    let assets = balance.assets;
    let liabilities = balance.liabilities;
    let current_liabilities = balance.current_liabilities;
    let equity = ratios::equity(assets, liabilities);

    let avg_pe = ratios::avg_pe(stock, quarters);
    let avg_roe = ratios::avg_roe(stock, quarters);
    let dividend_yield = ratios::dividend_yield(
        ratios::dividends_paid_for_year(stock),
        stock.shares_outstanding,
        stock.current_price,
    );
    let fcf = ratios::fcf_for_year(stock);
    let net_income_avg = ratios::net_income_for_years(stock, model.years_for_earnings_calcs);
    let eps = ratios::eps(net_income_avg, stock.shares_outstanding);
    let pe = ratios::pe(stock.current_price, eps);

    // The margin-of-safety haircut is baked into the growth rate itself,
    // so every growth-driven estimate downstream is conservative.
    let growth_rate = ratios::value_growth_rate(
        &statements.income_statements,
        "net_income",
        quarters,
    ) * (1.0 - model.min_mos);

    let pb = ratios::pb(stock.current_price, equity, stock.shares_outstanding);
    let ebit = ratios::ebit_for_year(stock);
    let total_revenue = ratios::total_revenue_for_year(stock);

    let pe_multiple_iv = intrinsic::pe_multiple_iv(eps, avg_pe, growth_rate, model.discount_rate);
    let fair_value = round2(pe_multiple_iv);

    let mut valuation = Valuation {
        dividend_yield: round2(dividend_yield),
        market_cap: round2(ratios::market_cap(stock.shares_outstanding, stock.current_price)),
        roe: round2(ratios::roe(net_income_avg, equity)),
        roa: round2(ratios::roa(net_income_avg, assets)),
        growth_rate: round2(growth_rate),
        price_growth_rate: round2(ratios::price_growth_rate(stock)),
        dte: round2(ratios::dte(current_liabilities, equity)),
        cr: round2(ratios::current_ratio(balance.current_assets, current_liabilities)),
        eps: round2(eps),
        pe: round2(pe),
        peg: round2(ratios::peg(pe, growth_rate)),
        pb: round2(pb),
        blended_multiplier: round2(pe * pb),
        fcf: round2(fcf),
        liquidation_iv: round2(intrinsic::liquidation_iv(equity, stock.shares_outstanding)),
        pe_multiple_iv: fair_value,
        graham_iv: round2(intrinsic::graham_iv(eps, growth_rate, model.discount_rate)),
        dcf_iv: round2(intrinsic::dcf_iv(
            fcf,
            balance.cash,
            liabilities,
            stock.shares_outstanding,
            growth_rate,
            model.decline_rate,
            model.discount_rate,
        )),
        roe_iv: round2(intrinsic::roe_iv(
            equity,
            avg_roe,
            stock.shares_outstanding,
            dividend_yield,
            growth_rate,
            model.discount_rate,
        )),
        altman_z_score: round2(ratios::altman_z_score(
            assets,
            liabilities,
            balance.retained_earnings,
            ebit,
            total_revenue,
        )),
        statement_years: ratios::statement_years(stock),
        fair_value,
        expected_return: round2(
            100.0 * safe_divide(fair_value - stock.current_price, stock.current_price),
        ),
        mos: round2(safe_divide(fair_value - stock.current_price, fair_value)),
        health: None,
        instruction: None,
    };

    valuation.health = Some(HealthCategory::from_z_score(valuation.altman_z_score));
    valuation.instruction = Some(instruction(&valuation, stock.current_price, model));

    valuation
}

/// Whether the valuation clears every minimum-requirement threshold.
pub fn viability(valuation: &Valuation, model: &ValuationModel) -> bool {
    if valuation.roe < model.min_roe
        || valuation.growth_rate < model.min_growth_rate
        || valuation.dte > model.max_dte
        || valuation.dte < 0.0
        || valuation.cr < model.min_cr
        || valuation.eps < model.min_eps
        || valuation.pe > model.max_pe
        || valuation.pe <= 0.0
        || valuation.peg > model.max_peg
        || valuation.peg <= 0.0
        || valuation.pb > model.max_pb
        || valuation.pb < 0.0
        || valuation.blended_multiplier > model.max_blended_multiplier
        || valuation.blended_multiplier <= 0.0
        || valuation.altman_z_score < model.min_altman_z_score
        || valuation.statement_years < model.min_statement_years
    {
        return false;
    }

    true
}

/// BUY only a viable, undervalued stock; SELL anything unviable or at or
/// above fair value. A price exactly at fair value resolves to SELL;
/// the overvaluation check runs first, deliberately.
pub fn instruction(
    valuation: &Valuation,
    current_price: f64,
    model: &ValuationModel,
) -> Instruction {
    let viable = viability(valuation, model);
    let overvalued = current_price >= valuation.fair_value;
    let undervalued = current_price <= valuation.fair_value;

    if !viable || overvalued {
        Instruction::Sell
    } else if undervalued {
        Instruction::Buy
    } else {
        Instruction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::{BalanceSheet, CashFlowStatement, IncomeStatement};

    /// A stock with three years of healthy, steadily growing statements.
    fn healthy_stock() -> Stock {
        let mut stock = Stock {
            symbol: "IND".to_string(),
            current_price: 50.0,
            shares_outstanding: 1_000_000,
            ..Default::default()
        };

        let dates = [
            "2018-03-31", "2018-06-30", "2018-09-30", "2018-12-31",
            "2019-03-31", "2019-06-30", "2019-09-30", "2019-12-31",
            "2020-03-31", "2020-06-30", "2020-09-30", "2020-12-31",
        ];

        for (i, date) in dates.iter().enumerate() {
            let scale = 1.0 + 0.03 * i as f64;
            stock.financial_statements.income_statements.insert(
                date.to_string(),
                IncomeStatement {
                    total_revenue: 100_000_000.0 * scale,
                    net_income: 20_000_000.0 * scale,
                    income_before_tax: 26_000_000.0 * scale,
                    interest_income: 500_000.0,
                    interest_expense: 800_000.0,
                    ..Default::default()
                },
            );
            stock.financial_statements.balance_sheets.insert(
                date.to_string(),
                BalanceSheet {
                    assets: 500_000_000.0 * scale,
                    current_assets: 200_000_000.0,
                    liabilities: 200_000_000.0,
                    current_liabilities: 50_000_000.0,
                    retained_earnings: 150_000_000.0,
                    cash: 80_000_000.0,
                    ..Default::default()
                },
            );
            stock.financial_statements.cash_flow_statements.insert(
                date.to_string(),
                CashFlowStatement {
                    dividends_paid: 5_000_000.0,
                    cash_from_operations: 25_000_000.0,
                    capex: 5_000_000.0,
                    ..Default::default()
                },
            );
        }

        stock
    }

    #[test]
    fn test_evaluate_unusable_statements_yield_default() {
        let stock = Stock::default();
        let valuation = evaluate(&stock, &ValuationModel::default());
        assert_eq!(valuation, Valuation::default());
        assert!(valuation.instruction.is_none());
    }

    #[test]
    fn test_evaluate_invalid_latest_income_statement_yields_default() {
        let mut stock = healthy_stock();
        if let Some(statement) = stock
            .financial_statements
            .income_statements
            .get_mut("2020-12-31")
        {
            statement.net_income = 0.0;
        }
        let valuation = evaluate(&stock, &ValuationModel::default());
        assert_eq!(valuation, Valuation::default());
    }

    #[test]
    fn test_evaluate_populates_rounded_ratios() {
        let stock = healthy_stock();
        let valuation = evaluate(&stock, &ValuationModel::default());

        assert!(valuation.eps > 0.0);
        assert!(valuation.pe > 0.0);
        assert!(valuation.statement_years >= 3);
        // Two-decimal storage.
        assert_eq!(valuation.roe, round2(valuation.roe));
        assert_eq!(valuation.pe, round2(valuation.pe));
        assert_eq!(valuation.altman_z_score, round2(valuation.altman_z_score));
        assert!(valuation.instruction.is_some());
        assert!(valuation.health.is_some());
    }

    #[test]
    fn test_viability_rejects_all_zero_valuation() {
        assert!(!viability(&Valuation::default(), &ValuationModel::default()));
    }

    #[test]
    fn test_viability_passes_at_exact_thresholds() {
        let model = ValuationModel::default();
        let valuation = Valuation {
            roe: model.min_roe,
            growth_rate: model.min_growth_rate,
            dte: model.max_dte,
            cr: model.min_cr,
            eps: 1.0,
            pe: model.max_pe,
            peg: model.max_peg,
            pb: model.max_pb,
            blended_multiplier: model.max_blended_multiplier,
            altman_z_score: model.min_altman_z_score,
            statement_years: model.min_statement_years,
            ..Default::default()
        };
        assert!(viability(&valuation, &model));
    }

    #[test]
    fn test_viability_fails_when_one_ratio_breaks() {
        let model = ValuationModel::default();
        let base = Valuation {
            roe: model.min_roe,
            growth_rate: model.min_growth_rate,
            dte: model.max_dte,
            cr: model.min_cr,
            eps: 1.0,
            pe: model.max_pe,
            peg: model.max_peg,
            pb: model.max_pb,
            blended_multiplier: model.max_blended_multiplier,
            altman_z_score: model.min_altman_z_score,
            statement_years: model.min_statement_years,
            ..Default::default()
        };

        let mut v = base.clone();
        v.roe = 0.0;
        assert!(!viability(&v, &model));

        let mut v = base.clone();
        v.dte = model.max_dte * 2.0;
        assert!(!viability(&v, &model));

        let mut v = base.clone();
        v.dte = -0.1;
        assert!(!viability(&v, &model));

        let mut v = base.clone();
        v.pe = 0.0;
        assert!(!viability(&v, &model));

        let mut v = base.clone();
        v.peg = model.max_peg * 2.0;
        assert!(!viability(&v, &model));

        let mut v = base.clone();
        v.altman_z_score = model.min_altman_z_score / 2.0;
        assert!(!viability(&v, &model));

        let mut v = base;
        v.statement_years = model.min_statement_years - 1;
        assert!(!viability(&v, &model));
    }

    #[test]
    fn test_instruction_tie_at_fair_value_sells() {
        let model = ValuationModel::default();
        let valuation = Valuation {
            roe: model.min_roe,
            growth_rate: model.min_growth_rate,
            dte: model.max_dte,
            cr: model.min_cr,
            eps: 1.0,
            pe: model.max_pe,
            peg: model.max_peg,
            pb: model.max_pb,
            blended_multiplier: model.max_blended_multiplier,
            altman_z_score: model.min_altman_z_score,
            statement_years: model.min_statement_years,
            fair_value: 100.0,
            ..Default::default()
        };

        assert_eq!(instruction(&valuation, 100.0, &model), Instruction::Sell);
        assert_eq!(instruction(&valuation, 100.01, &model), Instruction::Sell);
        assert_eq!(instruction(&valuation, 99.99, &model), Instruction::Buy);
    }

    #[test]
    fn test_instruction_unviable_always_sells() {
        let model = ValuationModel::default();
        let valuation = Valuation {
            fair_value: 1_000.0,
            ..Default::default()
        };
        assert_eq!(instruction(&valuation, 1.0, &model), Instruction::Sell);
    }

    #[test]
    fn test_health_category_thresholds() {
        assert_eq!(HealthCategory::from_z_score(1.79), HealthCategory::Dying);
        assert_eq!(HealthCategory::from_z_score(1.8), HealthCategory::Average);
        assert_eq!(HealthCategory::from_z_score(2.99), HealthCategory::Average);
        assert_eq!(HealthCategory::from_z_score(3.0), HealthCategory::Healthy);
    }
}
