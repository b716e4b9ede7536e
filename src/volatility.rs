//! Rolling annualised volatility and regime classification.
//!
//! Volatility is the sample standard deviation of daily returns over a
//! trailing window, annualised with `sqrt(annualization_days) * 100` so the
//! figures read as percentages. The first `window - 1` positions have no
//! value and never enter the summary statistics.

use crate::{
    config::AnalysisConfig,
    errors::{validate_all_finite, CycleAnalysisError, CycleResult},
    math_utils::{mean, median, sample_std},
    preprocessing::ReturnSeries,
};
use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current volatility above `median * HIGH_REGIME_RATIO` is High
pub const HIGH_REGIME_RATIO: f64 = 1.5;
/// Current volatility below `median * LOW_REGIME_RATIO` is Low
pub const LOW_REGIME_RATIO: f64 = 0.7;

/// Volatility level relative to its own history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VolatilityRegime {
    /// Below 0.7x the historical median
    Low,
    /// Within the historical band
    Normal,
    /// Above 1.5x the historical median
    High,
}

impl VolatilityRegime {
    /// Classify `current` against `median`.
    pub fn classify(current: f64, median: f64) -> Self {
        if current > median * HIGH_REGIME_RATIO {
            VolatilityRegime::High
        } else if current < median * LOW_REGIME_RATIO {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        }
    }
}

impl std::fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VolatilityRegime::Low => "Low",
            VolatilityRegime::Normal => "Normal",
            VolatilityRegime::High => "High",
        };
        f.write_str(label)
    }
}

/// Summary of the rolling volatility series
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolatilityProfile {
    /// Latest rolling value (annualised %)
    pub current: f64,
    /// Median of the rolling series
    pub median: f64,
    /// Mean of the rolling series
    pub mean: f64,
    /// Mean of the most recent `projection_window` rolling values.
    ///
    /// A trailing smoothing of recent volatility used as a 12-month outlook,
    /// not a model-based forecast.
    pub projection_12m: f64,
    /// Regime of `current` relative to `median`
    pub regime: VolatilityRegime,
    /// Defined rolling values, oldest first
    pub rolling: Vec<f64>,
    /// Dates aligned with `rolling`
    pub dates: Vec<NaiveDate>,
}

/// Annualised rolling standard deviation of `returns`.
///
/// Output has `returns.len() - window + 1` values; the entry at `i` covers
/// `returns[i..i + window]`.
pub fn rolling_volatility(
    returns: &[f64],
    window: usize,
    annualization_days: usize,
) -> CycleResult<Vec<f64>> {
    if window < 2 {
        return Err(CycleAnalysisError::invalid_input(format!(
            "volatility window must be at least 2, got {}",
            window
        )));
    }
    if returns.len() < window {
        return Err(CycleAnalysisError::insufficient(
            "rolling volatility",
            window,
            returns.len(),
        ));
    }
    validate_all_finite(returns, "returns")?;

    let scale = (annualization_days as f64).sqrt() * 100.0;
    returns
        .windows(window)
        .map(|w| {
            sample_std(w).map(|sd| sd * scale).ok_or_else(|| {
                CycleAnalysisError::insufficient("rolling volatility", 2, w.len())
            })
        })
        .collect()
}

/// Rolling volatility profile of a return series.
pub fn estimate_volatility(
    returns: &ReturnSeries,
    config: &AnalysisConfig,
) -> CycleResult<VolatilityProfile> {
    let window = config.volatility_window;
    let rolling = rolling_volatility(returns.values(), window, config.annualization_days)?;

    let current = *rolling
        .last()
        .ok_or_else(|| CycleAnalysisError::insufficient("rolling volatility", window, 0))?;
    let median_vol = median(&rolling)
        .ok_or_else(|| CycleAnalysisError::insufficient("volatility median", 1, 0))?;
    let mean_vol =
        mean(&rolling).ok_or_else(|| CycleAnalysisError::insufficient("volatility mean", 1, 0))?;

    let recent_start = rolling.len().saturating_sub(config.projection_window);
    let projection_12m = mean(&rolling[recent_start..])
        .ok_or_else(|| CycleAnalysisError::insufficient("volatility projection", 1, 0))?;

    let regime = VolatilityRegime::classify(current, median_vol);
    let dates = returns.dates()[window - 1..].to_vec();

    log::debug!(
        "Volatility: current {:.2}%, median {:.2}%, regime {}",
        current,
        median_vol,
        regime
    );

    Ok(VolatilityProfile {
        current,
        median: median_vol,
        mean: mean_vol,
        projection_12m,
        regime,
        rolling,
        dates,
    })
}
