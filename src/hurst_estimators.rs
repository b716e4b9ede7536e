//! Hurst exponent estimation from lag-differenced dispersion.
//!
//! For each lag `τ` the dispersion `σ(τ)` is the population standard deviation
//! of `x[t + τ] - x[t]`. For a self-similar process `σ(τ) ∝ τ^H`, so the slope
//! of `ln σ(τ)` against `ln τ` estimates the Hurst exponent `H`.
//!
//! ## Implementation Notes
//!
//! - This is a scaling estimator on levels, not rescaled-range (R/S) analysis
//! - Lags run over `2..=min(max_lag, n / 2)`
//! - All logarithms use natural logarithm (ln)
//! - A series whose every dispersion is zero (constant, or moving by a fixed
//!   step) reports `H = 0.5`; a partial set of zero dispersions is degenerate

use crate::{
    errors::{validate_all_finite, validate_data_length, CycleAnalysisError, CycleResult},
    math_utils::{float_ops, linear_fit, population_std},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Hurst exponent for random walk (Brownian motion)
pub const RANDOM_WALK_HURST: f64 = 0.5;

/// Distance from 0.5 still read as a random walk
pub const RANDOM_WALK_TOLERANCE: f64 = 1e-6;

/// Smallest lag used
const MIN_LAG: usize = 2;

/// Fewest observations accepted
pub const MIN_HURST_OBSERVATIONS: usize = 4;

/// Memory character implied by the exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HurstInterpretation {
    /// H > 0.5: trends tend to continue
    Persistent,
    /// H < 0.5: moves tend to reverse
    AntiPersistent,
    /// H ≈ 0.5: no memory
    Random,
}

impl HurstInterpretation {
    /// Read an exponent.
    pub fn from_exponent(exponent: f64) -> Self {
        if (exponent - RANDOM_WALK_HURST).abs() <= RANDOM_WALK_TOLERANCE {
            HurstInterpretation::Random
        } else if exponent > RANDOM_WALK_HURST {
            HurstInterpretation::Persistent
        } else {
            HurstInterpretation::AntiPersistent
        }
    }
}

/// Hurst exponent with the data behind the log-log fit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HurstResult {
    /// Slope of ln(dispersion) on ln(lag)
    pub exponent: f64,
    /// Intercept of the same fit, for drawing the regression line
    pub intercept: f64,
    /// Lags used, ascending
    pub lags: Vec<usize>,
    /// Dispersion at each lag
    pub dispersion: Vec<f64>,
    /// Reading of the exponent
    pub interpretation: HurstInterpretation,
}

/// Population standard deviation of `series[lag..] - series[..n - lag]`.
pub fn lag_dispersion(series: &[f64], lag: usize) -> CycleResult<f64> {
    if lag == 0 || lag >= series.len() {
        return Err(CycleAnalysisError::invalid_input(format!(
            "lag {} out of range for {} observations",
            lag,
            series.len()
        )));
    }
    let diffs: Vec<f64> = series[lag..]
        .iter()
        .zip(series)
        .map(|(later, earlier)| later - earlier)
        .collect();
    population_std(&diffs)
        .ok_or_else(|| CycleAnalysisError::insufficient("lag dispersion", 1, diffs.len()))
}

/// Estimate the Hurst exponent of a price series by lag-dispersion scaling.
///
/// # Errors
/// - `InsufficientData` below four observations or with fewer than two lags
/// - `InvalidInput` on non-finite prices
/// - `NumericDegenerate` when some, but not all, dispersions are zero
///
/// A dispersion counts as zero when it is negligible relative to the largest
/// absolute price, so the estimate does not depend on the price unit.
pub fn estimate_hurst_lag_dispersion(prices: &[f64], max_lag: usize) -> CycleResult<HurstResult> {
    validate_data_length(prices, MIN_HURST_OBSERVATIONS, "Hurst estimation")?;
    validate_all_finite(prices, "Hurst input")?;

    let upper = max_lag.min(prices.len() / 2);
    let lags: Vec<usize> = (MIN_LAG..=upper).collect();
    if lags.len() < 2 {
        return Err(CycleAnalysisError::insufficient(
            "Hurst lag range",
            2,
            lags.len(),
        ));
    }

    let dispersion = lags
        .iter()
        .map(|&lag| lag_dispersion(prices, lag))
        .collect::<CycleResult<Vec<f64>>>()?;

    let scale = float_ops::max_abs(prices);
    let negligible = |d: f64| float_ops::is_negligible(d, scale);

    if dispersion.iter().all(|&d| negligible(d)) {
        log::debug!("Hurst: zero dispersion at every lag, reporting random walk");
        return Ok(HurstResult {
            exponent: RANDOM_WALK_HURST,
            intercept: 0.0,
            lags,
            dispersion,
            interpretation: HurstInterpretation::Random,
        });
    }

    let mut log_lags = Vec::with_capacity(lags.len());
    let mut log_dispersion = Vec::with_capacity(lags.len());
    for (&lag, &d) in lags.iter().zip(&dispersion) {
        let ln_d = Some(d)
            .filter(|&d| !negligible(d))
            .and_then(float_ops::safe_ln)
            .ok_or_else(|| {
                CycleAnalysisError::degenerate(
                    "Hurst regression",
                    format!("zero dispersion at lag {}", lag),
                )
            })?;
        log_lags.push((lag as f64).ln());
        log_dispersion.push(ln_d);
    }

    let (exponent, intercept) = linear_fit(&log_lags, &log_dispersion)?;
    let interpretation = HurstInterpretation::from_exponent(exponent);

    log::debug!(
        "Hurst exponent {:.4} over lags {}..={} ({:?})",
        exponent,
        MIN_LAG,
        upper,
        interpretation
    );

    Ok(HurstResult {
        exponent,
        intercept,
        lags,
        dispersion,
        interpretation,
    })
}
