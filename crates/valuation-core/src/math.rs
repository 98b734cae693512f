//! Numeric primitives shared by the reconciliation and valuation engines.
//! Stateless, no I/O; division by a legitimately-zero quantity yields 0
//! instead of an error because absent fundamentals are routine.

use crate::types::Currency;

/// Divide, returning 0.0 when the denominator is zero or either side is
/// not finite.
pub fn safe_divide(a: f64, b: f64) -> f64 {
    if b == 0.0 || !a.is_finite() || !b.is_finite() {
        return 0.0;
    }
    a / b
}

/// Round to 2 decimal places. Stored ratios and currency amounts are
/// compared at this precision, so rounding happens at computation time,
/// not at serialization time.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a provider currency string into a 2-dp amount. Anything
/// unparseable or non-finite becomes 0.00.
pub fn parse_currency(raw: &str) -> Currency {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(round2)
        .unwrap_or(0.0)
}

/// Implied constant per-period growth rate solving
/// `final = initial * (1 + g)^n`, with n = number of observations.
///
/// The sign flips to negative when either endpoint is negative: two
/// negative endpoints would otherwise cancel and report spurious growth.
/// Fewer than two values, or a zero starting value, yields 0.
pub fn growth_rate(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let initial = values[0];
    let final_value = values[values.len() - 1];
    if initial == 0.0 {
        return 0.0;
    }

    let n = values.len() as f64;
    let sign = if final_value < 0.0 || initial < 0.0 {
        -1.0
    } else {
        1.0
    };

    sign * ((final_value / initial).abs().powf(1.0 / n) - 1.0)
}

/// Least-squares quadratic trend through `(x, y)` points, evaluated at
/// `target_x` and rounded to 2 dp. Needs at least three points, else 0.
///
/// The abscissae are centered before the normal equations are formed so
/// day-number encodings of dates stay well conditioned.
pub fn trend_estimate(points: &[(f64, f64)], target_x: f64) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;

    // Moments of the centered x values.
    let mut s1 = 0.0;
    let mut s2 = 0.0;
    let mut s3 = 0.0;
    let mut s4 = 0.0;
    let mut ty0 = 0.0;
    let mut ty1 = 0.0;
    let mut ty2 = 0.0;
    for &(x, y) in points {
        let dx = x - x_mean;
        let dx2 = dx * dx;
        s1 += dx;
        s2 += dx2;
        s3 += dx2 * dx;
        s4 += dx2 * dx2;
        ty0 += y;
        ty1 += dx * y;
        ty2 += dx2 * y;
    }

    // Solve the 3x3 normal equations for y = c0 + c1*dx + c2*dx^2.
    let coeffs = match solve3(
        [[n, s1, s2], [s1, s2, s3], [s2, s3, s4]],
        [ty0, ty1, ty2],
    ) {
        Some(c) => c,
        None => return 0.0,
    };

    let dx = target_x - x_mean;
    round2(coeffs[0] + coeffs[1] * dx + coeffs[2] * dx * dx)
}

/// Gaussian elimination with partial pivoting for a 3x3 system.
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in (row + 1)..3 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}
