//! Mathematical utility functions for cycle analysis.
//!
//! Summary statistics, least-squares line fitting and guarded floating-point
//! operations shared by the analysis components.

use crate::errors::{CycleAnalysisError, CycleResult};
use statrs::statistics::Statistics;

/// Safe comparison for floating point values (handles NaN)
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater, // push NaN to end
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(b),
    }
}

/// Calculate median of already-sorted data (handles even-length correctly)
pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

/// Calculate median (handles even-length correctly)
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v = values.to_vec();
    v.sort_by(float_total_cmp);
    median_of_sorted(&v)
}

/// Arithmetic mean, `None` for empty input
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Sample standard deviation (n - 1 denominator), `None` below two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        None
    } else {
        // Clamp tiny negative rounding before it can become NaN
        Some(values.iter().variance().max(0.0).sqrt())
    }
}

/// Population standard deviation (n denominator), `None` for empty input
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().population_variance().max(0.0).sqrt())
    }
}

/// Simple percent-change series: `x[i] / x[i-1] - 1` for `i >= 1`.
///
/// Fails with `NumericDegenerate` on a zero denominator.
pub fn pct_change(values: &[f64]) -> CycleResult<Vec<f64>> {
    values
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            float_ops::safe_div(pair[1], pair[0])
                .map(|ratio| ratio - 1.0)
                .ok_or_else(|| {
                    CycleAnalysisError::degenerate(
                        "percent change",
                        format!("zero or non-finite base value at index {}", i),
                    )
                })
        })
        .collect()
}

/// Least-squares straight line `y = intercept + slope * x`.
///
/// Returns `(slope, intercept)`. Centers the data first for numerical
/// stability; fails when fewer than two points are given or when `x` has
/// no spread.
pub fn linear_fit(x: &[f64], y: &[f64]) -> CycleResult<(f64, f64)> {
    if x.len() != y.len() {
        return Err(CycleAnalysisError::invalid_input(format!(
            "regression inputs differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(CycleAnalysisError::insufficient(
            "linear regression",
            2,
            x.len(),
        ));
    }
    if !x.iter().chain(y).all(|v| v.is_finite()) {
        return Err(CycleAnalysisError::degenerate(
            "linear regression",
            "non-finite values in regression data",
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x) * (xi - mean_x)).sum();
    let sum_sq: f64 = x.iter().map(|xi| xi * xi).sum();

    let spread = (!float_ops::is_negligible(sxx, sum_sq)).then_some(sxx);
    let slope = spread.and_then(|sxx| float_ops::safe_div(sxy, sxx)).ok_or_else(|| {
        CycleAnalysisError::degenerate(
            "linear regression",
            "predictor variable has zero variance",
        )
    })?;
    let intercept = mean_y - slope * mean_x;

    Ok((slope, intercept))
}

/// Numerical constants
pub mod constants {
    /// Relative tolerance below which a value is lost in rounding noise of
    /// its scale
    pub const RELATIVE_EPSILON: f64 = 1024.0 * f64::EPSILON;

    /// Minimum positive value for log operations
    pub const MIN_LOG_VALUE: f64 = 1e-300;
}

/// Guarded floating point operations
pub mod float_ops {
    use super::constants::{MIN_LOG_VALUE, RELATIVE_EPSILON};

    /// Whether `x` is indistinguishable from zero at the magnitude `scale`.
    ///
    /// The tolerance is relative, so prices of 1e-9 and of 1e9 are judged
    /// alike. A zero scale only admits an exact zero.
    #[inline]
    pub fn is_negligible(x: f64, scale: f64) -> bool {
        x.abs() <= scale.abs() * RELATIVE_EPSILON
    }

    /// Largest absolute value in `values`, 0 for empty input
    pub fn max_abs(values: &[f64]) -> f64 {
        values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Division that rejects a zero denominator, non-finite inputs and an
    /// overflowing quotient
    pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
        if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
            return None;
        }
        let quotient = numerator / denominator;
        quotient.is_finite().then_some(quotient)
    }

    /// Safe logarithm that checks for positive arguments and finite inputs
    pub fn safe_ln(x: f64) -> Option<f64> {
        if x > MIN_LOG_VALUE && x.is_finite() {
            Some(x.ln())
        } else {
            None
        }
    }
}
