//! Synthetic price series for testing and validation.
//!
//! This module generates reference series with known behaviour: random walks
//! whose Hurst exponent is 0.5, white-noise levels that mean-revert, strictly
//! linear and constant prices, and exactly repeating cycles. Generation is
//! deterministic when a seed is supplied.
//!
//! ## Available Generators
//!
//! - **White noise**: independent Gaussian deviations around a fixed level
//! - **Random walk**: arithmetic Gaussian walk (may cross zero)
//! - **Geometric walk**: log-normal walk, always positive
//! - **Linear / Constant**: deterministic drift or a flat line
//! - **Repeating pattern**: a sine cycle of fixed period

use crate::{
    errors::{CycleAnalysisError, CycleResult},
    preprocessing::RawObservation,
};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::StandardNormal;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration parameters for synthetic series generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Length of the generated series
    pub length: usize,
    /// Random seed for reproducible generation
    pub seed: Option<u64>,
    /// Level of the first observation
    pub start_price: f64,
    /// Per-step standard deviation as a fraction of `start_price`
    pub step_volatility: f64,
    /// Date of the first generated observation (moved forward to a weekday)
    pub start_date: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 1000,
            seed: None,
            start_price: 100.0,
            step_volatility: 0.01,
            start_date: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default(),
        }
    }
}

/// Types of benchmark series available for generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BenchmarkSeriesType {
    /// Independent noise around `start_price` (mean-reverting levels)
    WhiteNoise,
    /// Arithmetic random walk (H = 0.5)
    RandomWalk,
    /// Geometric random walk, strictly positive
    GeometricWalk,
    /// `start_price + slope * i`
    Linear(f64),
    /// Every value equals `start_price`
    Constant,
    /// Sine cycle with the given period, ±10% around `start_price`
    RepeatingPattern(usize),
}

fn validate_config(config: &GeneratorConfig) -> CycleResult<()> {
    if config.length == 0 {
        return Err(CycleAnalysisError::invalid_input(
            "generator length must be greater than zero",
        ));
    }
    if !(config.start_price.is_finite() && config.start_price > 0.0) {
        return Err(CycleAnalysisError::invalid_input(format!(
            "start price must be positive and finite, got {}",
            config.start_price
        )));
    }
    if !(config.step_volatility.is_finite() && config.step_volatility >= 0.0) {
        return Err(CycleAnalysisError::invalid_input(format!(
            "step volatility must be non-negative and finite, got {}",
            config.step_volatility
        )));
    }
    Ok(())
}

fn rng_for(config: &GeneratorConfig) -> ChaCha20Rng {
    match config.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Generate a benchmark series of `config.length` values.
pub fn generate_benchmark_series(
    series_type: BenchmarkSeriesType,
    config: &GeneratorConfig,
) -> CycleResult<Vec<f64>> {
    validate_config(config)?;
    let n = config.length;
    let start = config.start_price;
    let sigma = config.step_volatility;

    let series = match series_type {
        BenchmarkSeriesType::WhiteNoise => {
            let mut rng = rng_for(config);
            (0..n)
                .map(|_| start * (1.0 + sigma * rng.sample::<f64, _>(StandardNormal)))
                .collect()
        }
        BenchmarkSeriesType::RandomWalk => {
            let mut rng = rng_for(config);
            let step = start * sigma;
            let mut level = start;
            (0..n)
                .map(|i| {
                    if i > 0 {
                        level += step * rng.sample::<f64, _>(StandardNormal);
                    }
                    level
                })
                .collect()
        }
        BenchmarkSeriesType::GeometricWalk => {
            let mut rng = rng_for(config);
            let drift = -0.5 * sigma * sigma;
            let mut level = start;
            (0..n)
                .map(|i| {
                    if i > 0 {
                        let z: f64 = rng.sample(StandardNormal);
                        level *= (drift + sigma * z).exp();
                    }
                    level
                })
                .collect()
        }
        BenchmarkSeriesType::Linear(slope) => {
            if !slope.is_finite() {
                return Err(CycleAnalysisError::invalid_input(format!(
                    "linear slope must be finite, got {}",
                    slope
                )));
            }
            (0..n).map(|i| start + slope * i as f64).collect()
        }
        BenchmarkSeriesType::Constant => vec![start; n],
        BenchmarkSeriesType::RepeatingPattern(period) => {
            if period == 0 {
                return Err(CycleAnalysisError::invalid_input(
                    "pattern period must be greater than zero",
                ));
            }
            (0..n)
                .map(|i| {
                    let phase = 2.0 * PI * (i % period) as f64 / period as f64;
                    start * (1.0 + 0.1 * phase.sin())
                })
                .collect()
        }
    };

    Ok(series)
}

/// Consecutive weekdays starting at `start`, `count` of them.
pub fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut date = start;
    while dates.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    dates
}

/// Generate a benchmark series as raw daily rows on consecutive weekdays.
///
/// Volume is a constant placeholder; the analysis only carries it through.
pub fn generate_price_observations(
    series_type: BenchmarkSeriesType,
    config: &GeneratorConfig,
) -> CycleResult<Vec<RawObservation>> {
    let closes = generate_benchmark_series(series_type, config)?;
    let dates = trading_days(config.start_date, closes.len());
    if dates.len() < closes.len() {
        return Err(CycleAnalysisError::invalid_input(
            "calendar exhausted before the series was dated",
        ));
    }
    Ok(dates
        .into_iter()
        .zip(closes)
        .map(|(date, close)| RawObservation::new(date, close, 1_000_000.0))
        .collect())
}
