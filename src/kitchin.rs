//! Fixed-length (Kitchin) cycle alignment.
//!
//! The price history is cut into consecutive windows of `cycle_length`
//! observations, each rebased to 100 at its first price, and the windows are
//! averaged element-wise into a reference cycle. The trailing `N mod L`
//! observations form the current cycle; its last price is compared with the
//! price the average cycle would predict for the same day.
//!
//! The current cycle is positioned purely by the remainder of the series
//! length, not by calendar alignment with the historical window boundaries.

use crate::{
    config::AnalysisConfig,
    errors::{CycleAnalysisError, CycleResult},
    math_utils::float_ops,
    preprocessing::PriceSeries,
};
use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Historical windows needed before an average cycle is formed
pub const MIN_HISTORICAL_WINDOWS: usize = 2;

/// Base value every normalised cycle starts from
pub const CYCLE_BASE: f64 = 100.0;

/// Position of the latest price within the fixed-length cycle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedCycleResult {
    /// Cycle length L in observations
    pub cycle_length: usize,
    /// Number of full historical windows found
    pub historical_windows: usize,
    /// Element-wise mean of the normalised windows (length L), when enough exist
    pub avg_cycle: Option<Vec<f64>>,
    /// Trailing observations rebased to 100
    pub current_cycle: Vec<f64>,
    /// 1-based day within the current cycle
    pub current_day: usize,
    /// Days left until the cycle completes
    pub days_remaining: usize,
    /// Latest close
    pub current_price: f64,
    /// Close implied by the average cycle, or the current price without one
    pub expected_price: f64,
    /// `(current - expected) / expected * 100`
    pub deviation_pct: f64,
    /// Date of the first observation of the current cycle
    pub cycle_start_date: NaiveDate,
}

/// Rebase a window so that its first element equals [`CYCLE_BASE`].
pub fn normalize_window(window: &[f64]) -> CycleResult<Vec<f64>> {
    let first = *window.first().ok_or_else(|| {
        CycleAnalysisError::insufficient("cycle normalisation", 1, 0)
    })?;
    window
        .iter()
        .map(|&price| {
            float_ops::safe_div(price, first)
                .map(|ratio| ratio * CYCLE_BASE)
                .ok_or_else(|| {
                    CycleAnalysisError::degenerate(
                        "cycle normalisation",
                        format!("cannot rebase on first price {}", first),
                    )
                })
        })
        .collect()
}

/// Align the series on the configured fixed cycle length.
pub fn align_fixed_cycle(
    prices: &PriceSeries,
    config: &AnalysisConfig,
) -> CycleResult<FixedCycleResult> {
    let cycle_length = config.cycle_length;
    if cycle_length == 0 {
        return Err(CycleAnalysisError::invalid_input(
            "cycle length must be greater than zero",
        ));
    }

    let closes = prices.closes();
    let n = closes.len();
    if n == 0 {
        return Err(CycleAnalysisError::insufficient("fixed cycle alignment", 1, 0));
    }

    let remaining = match n % cycle_length {
        0 => cycle_length,
        r => r,
    };
    let start_idx = n - remaining;

    // A window at k*L counts as history only while k*L < N - L
    let windows: Vec<Vec<f64>> = (0..n.saturating_sub(cycle_length))
        .step_by(cycle_length)
        .map(|offset| normalize_window(&closes[offset..offset + cycle_length]))
        .collect::<CycleResult<_>>()?;
    let historical_windows = windows.len();

    let avg_cycle = if historical_windows >= MIN_HISTORICAL_WINDOWS {
        Some(average_cycle(&windows, cycle_length))
    } else {
        None
    };

    let current_cycle = normalize_window(&closes[start_idx..])?;
    let current_price = closes[n - 1];
    let current_day = remaining;

    let (expected_price, deviation_pct) = match &avg_cycle {
        Some(avg) => {
            let expected = closes[start_idx] * avg[current_day - 1] / CYCLE_BASE;
            let deviation = float_ops::safe_div(current_price - expected, expected)
                .map(|ratio| ratio * 100.0)
                .ok_or_else(|| {
                    CycleAnalysisError::degenerate(
                        "cycle deviation",
                        format!("expected price {} cannot be a divisor", expected),
                    )
                })?;
            (expected, deviation)
        }
        None => (current_price, 0.0),
    };

    let cycle_start_date = prices.observations()[start_idx].date;

    log::debug!(
        "Fixed cycle: {} historical windows, day {}/{}, deviation {:.2}%",
        historical_windows,
        current_day,
        cycle_length,
        deviation_pct
    );

    Ok(FixedCycleResult {
        cycle_length,
        historical_windows,
        avg_cycle,
        current_cycle,
        current_day,
        days_remaining: cycle_length - current_day,
        current_price,
        expected_price,
        deviation_pct,
        cycle_start_date,
    })
}

fn average_cycle(windows: &[Vec<f64>], cycle_length: usize) -> Vec<f64> {
    let count = windows.len() as f64;
    (0..cycle_length)
        .map(|day| windows.iter().map(|w| w[day]).sum::<f64>() / count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::PriceObservation;
    use assert_approx_eq::assert_approx_eq;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let observations = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceObservation {
                date: start + chrono::Duration::days(i as i64),
                close,
                volume: 0.0,
            })
            .collect();
        PriceSeries::new(observations).unwrap()
    }

    fn pattern_price(day: usize) -> f64 {
        let phase = 2.0 * std::f64::consts::PI * day as f64 / 894.0;
        50.0 + 10.0 * phase.sin() + 0.01 * day as f64
    }

    #[test]
    fn test_linear_series_current_cycle_increasing() {
        let closes: Vec<f64> = (0..900).map(|i| 100.0 + i as f64).collect();
        let result = align_fixed_cycle(&series(&closes), &AnalysisConfig::default()).unwrap();

        assert_eq!(result.current_day, 6);
        assert_eq!(result.days_remaining, 888);
        assert_eq!(result.historical_windows, 1);
        assert!(result.avg_cycle.is_none());
        assert_eq!(result.current_cycle[0], 100.0);
        assert!(result.current_cycle.windows(2).all(|w| w[1] > w[0]));
        assert!(result.deviation_pct.is_finite());
        assert_eq!(result.deviation_pct, 0.0);
        assert_eq!(result.expected_price, result.current_price);
    }

    #[test]
    fn test_repeating_pattern_reconstructed() {
        let n = 894 * 3 + 10;
        let closes: Vec<f64> = (0..n).map(|i| pattern_price(i % 894)).collect();
        let result = align_fixed_cycle(&series(&closes), &AnalysisConfig::default()).unwrap();

        assert_eq!(result.historical_windows, 3);
        assert_eq!(result.current_day, 10);
        let avg = result.avg_cycle.as_ref().unwrap();
        assert_eq!(avg.len(), 894);
        for (day, value) in avg.iter().enumerate() {
            let expected = pattern_price(day) / pattern_price(0) * 100.0;
            assert_approx_eq!(*value, expected, 1e-9);
        }
        assert_approx_eq!(result.expected_price, result.current_price, 1e-9);
        assert_approx_eq!(result.deviation_pct, 0.0, 1e-9);
    }

    #[test]
    fn test_every_normalised_cycle_starts_at_base() {
        let closes: Vec<f64> = (0..2000)
            .map(|i| 20.0 + (i as f64 * 0.37).cos() + i as f64 * 0.01)
            .collect();
        let result = align_fixed_cycle(&series(&closes), &AnalysisConfig::default()).unwrap();
        assert_eq!(result.current_cycle[0], CYCLE_BASE);
        assert_eq!(result.avg_cycle.unwrap()[0], CYCLE_BASE);

        for offset in [0, 894] {
            let window = normalize_window(&closes[offset..offset + 894]).unwrap();
            assert_eq!(window[0], CYCLE_BASE);
        }
    }

    #[test]
    fn test_exact_multiple_uses_full_current_cycle() {
        let closes: Vec<f64> = (0..894 * 3).map(|i| pattern_price(i % 894)).collect();
        let prices = series(&closes);
        let result = align_fixed_cycle(&prices, &AnalysisConfig::default()).unwrap();

        // The last window is the current cycle, not history
        assert_eq!(result.historical_windows, 2);
        assert_eq!(result.current_day, 894);
        assert_eq!(result.days_remaining, 0);
        assert_eq!(result.current_cycle.len(), 894);
        assert_eq!(result.cycle_start_date, prices.dates()[894 * 2]);
        assert_approx_eq!(result.deviation_pct, 0.0, 1e-9);
    }

    #[test]
    fn test_short_cycle_length_deviation() {
        // Two windows of [1, 2] and a current cycle that lands above average
        let config = AnalysisConfig::default().with_cycle_length(2);
        let result = align_fixed_cycle(&series(&[1.0, 2.0, 1.0, 2.0, 5.0]), &config).unwrap();
        assert_eq!(result.historical_windows, 2);
        assert_eq!(result.current_day, 1);
        assert_approx_eq!(result.expected_price, 5.0, 1e-12);
        assert_approx_eq!(result.deviation_pct, 0.0, 1e-12);

        let result = align_fixed_cycle(&series(&[1.0, 2.0, 1.0, 2.0, 1.0, 3.0]), &config).unwrap();
        assert_eq!(result.current_day, 2);
        assert_eq!(result.historical_windows, 2);
        assert_approx_eq!(result.expected_price, 2.0, 1e-12);
        assert_approx_eq!(result.deviation_pct, 50.0, 1e-9);
    }
}
