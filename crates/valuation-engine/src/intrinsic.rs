//! Intrinsic-value models. Four independent estimates, each discounted
//! back at the model's discount rate; the P/E-multiple estimate is the
//! headline fair value.

use valuation_core::math::safe_divide;
use valuation_core::{Currency, Ratio, Shares};

/// Present value of `future_value` received `years` from now.
pub fn npv(future_value: Currency, discount_rate: Ratio, years: u32) -> Currency {
    if years == 0 {
        return future_value;
    }
    future_value / (1.0 + discount_rate).powi(years as i32)
}

/// Five-year P/E-multiple estimate: grow EPS, apply the trailing average
/// multiple, discount back.
pub fn pe_multiple_iv(
    eps: Ratio,
    avg_pe: Ratio,
    growth_rate: Ratio,
    discount_rate: Ratio,
) -> Currency {
    let years = 5;
    let future_value = eps * avg_pe * (1.0 + growth_rate).powi(years as i32);
    npv(future_value, discount_rate, years)
}

/// Benjamin Graham's revised formula, anchored on a P/E of 7 for a
/// no-growth company and his 4.4% risk-free rate.
pub fn graham_iv(eps: Ratio, growth_rate: Ratio, discount_rate: Ratio) -> Currency {
    let no_growth_pe = 7.0;
    let growth_multiplier = 1.0; // Graham used 2, which is aggressive.
    let risk_free_rate = 4.4;

    let iv = eps * (no_growth_pe + growth_multiplier * growth_rate * 100.0) * risk_free_rate
        / (discount_rate * 100.0);

    // Negative EPS and negative growth cancel out and look positive.
    if eps < 0.0 && growth_rate < 0.0 {
        return -iv;
    }
    iv
}

/// Ten-year discounted free-cash-flow estimate. Growth fades each year
/// by the decline rate; year ten's discounted FCF earns a conservative
/// 12x terminal multiple; net cash position adjusts the company value.
pub fn dcf_iv(
    fcf: Currency,
    cash: Currency,
    liabilities: Currency,
    shares_outstanding: Shares,
    growth_rate: Ratio,
    decline_rate: Ratio,
    discount_rate: Ratio,
) -> Currency {
    let years = 10usize;

    let mut future_fcf = Vec::with_capacity(years);
    for year in 0..years {
        let previous = if year > 0 { future_fcf[year - 1] } else { fcf };
        let decline_factor = (1.0 - decline_rate).powi(year as i32);
        future_fcf.push(previous * (1.0 + growth_rate * decline_factor));
    }

    let discounted: Vec<Currency> = future_fcf
        .iter()
        .enumerate()
        .map(|(year, value)| npv(*value, discount_rate, year as u32 + 1))
        .collect();

    let total_npv: Currency = discounted.iter().sum();

    let terminal_multiple = 12.0; // 12 is conservative, 15 aggressive.
    let terminal_value = discounted.last().copied().unwrap_or(0.0) * terminal_multiple;

    let company_value = total_npv + terminal_value + cash - liabilities;

    safe_divide(company_value, shares_outstanding as f64)
}

/// Ten-year residual-income estimate driven by average ROE: project
/// equity per share and dividends per share forward, capitalize year
/// ten's implied net income as a perpetuity, and discount everything
/// back.
pub fn roe_iv(
    equity: Currency,
    avg_roe: Ratio,
    shares_outstanding: Shares,
    dividend_yield: Ratio,
    growth_rate: Ratio,
    discount_rate: Ratio,
) -> Currency {
    let years = 10usize;
    let equity_per_share = safe_divide(equity, shares_outstanding as f64);

    let mut future_equity = Vec::with_capacity(years);
    for year in 0..years {
        let previous = if year > 0 {
            future_equity[year - 1]
        } else {
            equity_per_share
        };
        future_equity.push(previous * (1.0 + growth_rate));
    }

    let mut future_dividends = Vec::with_capacity(years);
    for year in 0..years {
        let previous = if year > 0 {
            future_dividends[year - 1]
        } else {
            dividend_yield
        };
        future_dividends.push(previous * (1.0 + growth_rate));
    }

    let discounted_dividends: Currency = future_dividends
        .iter()
        .enumerate()
        .map(|(year, value)| npv(*value, discount_rate, year as u32))
        .sum();

    let year_ten_net_income = future_equity.last().copied().unwrap_or(0.0) * avg_roe;
    let required_value = safe_divide(year_ten_net_income, discount_rate);

    npv(required_value, discount_rate, years as u32) + discounted_dividends
}

/// Book-value floor: what a share is worth if the company were wound up
/// at balance-sheet values.
pub fn liquidation_iv(equity: Currency, shares_outstanding: Shares) -> Currency {
    safe_divide(equity, shares_outstanding as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npv() {
        // No lookahead: the future value is the present value.
        assert_eq!(npv(78.15, 0.07, 0), 78.15);
        assert!((npv(78.15, 0.07, 5) - 55.71986992664868).abs() < 1e-9);
    }

    #[test]
    fn test_pe_multiple_iv() {
        let iv = pe_multiple_iv(11.89, 15.4, 0.12, 0.1);
        let expected = 11.89 * 15.4 * 1.12f64.powi(5) / 1.1f64.powi(5);
        assert!((iv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_graham_iv() {
        let iv = graham_iv(34.47, 0.158, 0.0356);
        assert!((iv - 971.3568539325844).abs() < 1e-9);
    }

    #[test]
    fn test_graham_iv_sign_correction() {
        let iv = graham_iv(-5.0, -0.10, 0.07);
        // eps * (7 - 10) is positive; the correction flips it back.
        assert!(iv < 0.0);
    }

    #[test]
    fn test_dcf_iv_zero_shares_is_safe() {
        assert_eq!(dcf_iv(100.0, 10.0, 50.0, 0, 0.05, 0.05, 0.07), 0.0);
    }

    #[test]
    fn test_dcf_iv_decaying_growth() {
        let iv = dcf_iv(
            455_000_000.0,
            1_978_000_000.0,
            12_049_000_000.0,
            109_944_000,
            0.05,
            0.05,
            0.07,
        );

        // Replay the projection by hand.
        let mut fcf = 455_000_000.0;
        let mut total = 0.0;
        let mut last = 0.0;
        for year in 0..10 {
            fcf *= 1.0 + 0.05 * 0.95f64.powi(year);
            last = fcf / 1.07f64.powi(year + 1);
            total += last;
        }
        let expected =
            (total + last * 12.0 + 1_978_000_000.0 - 12_049_000_000.0) / 109_944_000.0;
        assert!((iv - expected).abs() < 1e-6);
    }

    #[test]
    fn test_roe_iv_matches_hand_rolled_projection() {
        let iv = roe_iv(90_488_000.0, 0.4506, 4_520_000, 3.00, 0.0986, 0.09);

        let equity_per_share = 90_488_000.0 / 4_520_000.0;
        let year_ten_equity = equity_per_share * 1.0986f64.powi(10);
        let required = year_ten_equity * 0.4506 / 0.09;
        let mut dividends = 0.0;
        for year in 0..10 {
            let dividend = 3.00 * 1.0986f64.powi(year + 1);
            dividends += dividend / 1.09f64.powi(year);
        }
        let expected = required / 1.09f64.powi(10) + dividends;
        assert!((iv - expected).abs() < 1e-6);
    }

    #[test]
    fn test_liquidation_iv() {
        let iv = liquidation_iv(11_084_000_000.0, 109_944_000);
        assert!((iv - 100.81496034344757).abs() < 1e-9);
    }
}
