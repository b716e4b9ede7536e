//! Classical additive decomposition of return series.
//!
//! The series is split into `trend + seasonal + residual` where the trend is a
//! centered moving average over one period (a 2×m average for even periods so
//! the window stays centered), the seasonal part is the per-position average
//! of the detrended values, and the residual is whatever remains. Trend values
//! the centered window cannot reach at either end are extrapolated from a
//! straight line fitted to the nearest full period of defined trend values.

use crate::{
    errors::{validate_all_finite, CycleAnalysisError, CycleResult},
    math_utils::linear_fit,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns needed before the annual period is used
pub const ANNUAL_MIN_RETURNS: usize = 504;
/// Returns needed before the quarterly period is used
pub const QUARTERLY_MIN_RETURNS: usize = 126;
/// Returns needed before the monthly period is used
pub const MONTHLY_MIN_RETURNS: usize = 60;

/// Seasonal period chosen from the available history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeriodTier {
    /// 252 trading days
    Annual,
    /// 63 trading days
    Quarterly,
    /// 30 trading days
    Monthly,
}

impl PeriodTier {
    /// Period length in observations
    pub fn period(self) -> usize {
        match self {
            PeriodTier::Annual => 252,
            PeriodTier::Quarterly => 63,
            PeriodTier::Monthly => 30,
        }
    }
}

/// Pick the longest period that still fits two full cycles into `len` returns.
pub fn select_period(len: usize) -> CycleResult<PeriodTier> {
    if len >= ANNUAL_MIN_RETURNS {
        Ok(PeriodTier::Annual)
    } else if len >= QUARTERLY_MIN_RETURNS {
        Ok(PeriodTier::Quarterly)
    } else if len >= MONTHLY_MIN_RETURNS {
        Ok(PeriodTier::Monthly)
    } else {
        Err(CycleAnalysisError::insufficient(
            "seasonal decomposition",
            MONTHLY_MIN_RETURNS,
            len,
        ))
    }
}

/// Additive decomposition, every component aligned 1:1 with the input
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecompositionResult {
    /// Period used for the moving average and seasonal cycle
    pub period: usize,
    /// Tier the period was selected from
    pub tier: Option<PeriodTier>,
    /// Centered moving-average trend, extrapolated at both ends
    pub trend: Vec<f64>,
    /// Tiled seasonal cycle
    pub seasonal: Vec<f64>,
    /// Remainder after trend and seasonal
    pub residual: Vec<f64>,
}

/// Decompose returns with a period chosen by [`select_period`].
pub fn decompose_returns(returns: &[f64]) -> CycleResult<DecompositionResult> {
    let tier = select_period(returns.len())?;
    log::debug!(
        "Decomposing {} returns with {:?} period ({})",
        returns.len(),
        tier,
        tier.period()
    );
    let mut result = decompose_additive(returns, tier.period())?;
    result.tier = Some(tier);
    Ok(result)
}

/// Decompose `data` with an explicit period.
///
/// Requires `period >= 2` and at least two full periods of data.
pub fn decompose_additive(data: &[f64], period: usize) -> CycleResult<DecompositionResult> {
    if period < 2 {
        return Err(CycleAnalysisError::invalid_input(format!(
            "decomposition period must be at least 2, got {}",
            period
        )));
    }
    let n = data.len();
    if n < 2 * period {
        return Err(CycleAnalysisError::insufficient(
            "seasonal decomposition",
            2 * period,
            n,
        ));
    }
    validate_all_finite(data, "decomposition input")?;

    let trend = extrapolated_trend(data, period)?;

    let detrended: Vec<f64> = data.iter().zip(&trend).map(|(x, t)| x - t).collect();
    let cycle = seasonal_cycle(&detrended, period);
    let seasonal: Vec<f64> = (0..n).map(|i| cycle[i % period]).collect();

    let residual = data
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((x, t), s)| x - t - s)
        .collect();

    Ok(DecompositionResult {
        period,
        tier: None,
        trend,
        seasonal,
        residual,
    })
}

/// Centered moving average; `None` where the window would leave the series.
fn centered_moving_average(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = data.len();
    let half = period / 2;
    // Even periods use a (period + 1)-point filter with half weights at the ends
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0; period + 1];
        w[0] = 0.5;
        w[period] = 0.5;
        w
    } else {
        vec![1.0; period]
    };
    let scale = period as f64;

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &data[i - half..=i + half];
            let sum: f64 = window.iter().zip(&weights).map(|(x, w)| x * w).sum();
            Some(sum / scale)
        })
        .collect()
}

fn extrapolated_trend(data: &[f64], period: usize) -> CycleResult<Vec<f64>> {
    let partial = centered_moving_average(data, period);
    let front = partial
        .iter()
        .position(Option::is_some)
        .ok_or_else(|| CycleAnalysisError::insufficient("trend estimation", 2 * period, data.len()))?;
    let back = partial
        .iter()
        .rposition(Option::is_some)
        .ok_or_else(|| CycleAnalysisError::insufficient("trend estimation", 2 * period, data.len()))?;

    let mut trend: Vec<f64> = partial.iter().map(|v| v.unwrap_or(0.0)).collect();

    // Head: line through the first full period of defined trend values
    let head_end = (front + period).min(back + 1);
    let (slope, intercept) = fit_segment(&trend, front, head_end)?;
    for (i, value) in trend.iter_mut().enumerate().take(front) {
        *value = intercept + slope * i as f64;
    }

    // Tail: line through the last full period of defined trend values
    let tail_start = (back + 1).saturating_sub(period).max(front);
    let (slope, intercept) = fit_segment(&trend, tail_start, back + 1)?;
    for (i, value) in trend.iter_mut().enumerate().skip(back + 1) {
        *value = intercept + slope * i as f64;
    }

    Ok(trend)
}

fn fit_segment(trend: &[f64], start: usize, end: usize) -> CycleResult<(f64, f64)> {
    let x: Vec<f64> = (start..end).map(|i| i as f64).collect();
    linear_fit(&x, &trend[start..end])
}

/// Mean detrended value at each position within the period, centered on zero.
fn seasonal_cycle(detrended: &[f64], period: usize) -> Vec<f64> {
    let mut cycle: Vec<f64> = (0..period)
        .map(|pos| {
            let (sum, count) = detrended
                .iter()
                .skip(pos)
                .step_by(period)
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            sum / count as f64
        })
        .collect();

    let offset = cycle.iter().sum::<f64>() / period as f64;
    for value in &mut cycle {
        *value -= offset;
    }
    cycle
}
