//! # Analysis Configuration
//!
//! This module contains configuration structures for the analysis engine and
//! for the data-source collaborator. Only descriptive parameters are tunable;
//! contract thresholds (volatility regime bounds, decomposition tiers) are
//! constants in their own modules.

use crate::errors::{CycleAnalysisError, CycleResult};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default fixed cycle length in trading days (Kitchin window)
pub const DEFAULT_CYCLE_LENGTH: usize = 894;
/// Default minimum number of valid observations for any analysis
pub const DEFAULT_MIN_OBSERVATIONS: usize = 100;
/// Trading days per year used for annualisation
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Configuration for the analysis engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Minimum valid observations after cleaning
    pub min_observations: usize,
    /// Fixed cycle length in observations
    pub cycle_length: usize,
    /// Trailing window for rolling volatility
    pub volatility_window: usize,
    /// Annualisation factor for volatility (trading days)
    pub annualization_days: usize,
    /// Number of recent rolling-volatility values averaged for the outlook
    pub projection_window: usize,
    /// Calendar years of history kept for monthly seasonality
    pub seasonal_lookback_years: i32,
    /// Longest period (days) kept in the spectrum
    pub max_cycle_period_days: f64,
    /// Number of dominant cycles reported
    pub dominant_cycle_count: usize,
    /// Largest lag used by the Hurst estimator
    pub hurst_max_lag: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalysisConfig {
    /// Standard configuration for daily equity history
    pub fn standard() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            volatility_window: 30,
            annualization_days: TRADING_DAYS_PER_YEAR,
            projection_window: 60,
            seasonal_lookback_years: 10,
            max_cycle_period_days: 500.0,
            dominant_cycle_count: 5,
            hurst_max_lag: 100,
        }
    }

    /// Override the fixed cycle length
    pub fn with_cycle_length(mut self, cycle_length: usize) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    /// Check that every window and length is usable
    pub fn validate(&self) -> CycleResult<()> {
        let windows = [
            ("min_observations", self.min_observations),
            ("cycle_length", self.cycle_length),
            ("annualization_days", self.annualization_days),
            ("projection_window", self.projection_window),
            ("dominant_cycle_count", self.dominant_cycle_count),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, value)| *value == 0) {
            return Err(CycleAnalysisError::invalid_input(format!(
                "{} must be greater than zero",
                name
            )));
        }
        if self.volatility_window < 2 {
            return Err(CycleAnalysisError::invalid_input(
                "volatility_window must be at least 2",
            ));
        }
        if self.hurst_max_lag < 3 {
            return Err(CycleAnalysisError::invalid_input(
                "hurst_max_lag must be at least 3",
            ));
        }
        if self.seasonal_lookback_years < 0 {
            return Err(CycleAnalysisError::invalid_input(
                "seasonal_lookback_years must not be negative",
            ));
        }
        if !(self.max_cycle_period_days.is_finite() && self.max_cycle_period_days > 0.0) {
            return Err(CycleAnalysisError::invalid_input(
                "max_cycle_period_days must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Span of history requested from a data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HistoryWindow {
    /// Everything the provider has
    Max,
    /// The trailing number of calendar years
    Years(u32),
}

/// Configuration handed to the data-source collaborator at construction.
///
/// The cache location is a value owned by each source instance, never a
/// process-wide setting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataSourceConfig {
    /// Directory the provider may use for its response cache
    pub cache_dir: PathBuf,
    /// Windows tried in order until one returns enough rows
    pub fallback_windows: Vec<HistoryWindow>,
    /// Windows whose success marks the history as limited
    pub limited_windows: Vec<HistoryWindow>,
    /// Rows a window must exceed to be accepted
    pub min_rows: usize,
    /// Per-request timeout the provider should honour
    pub request_timeout: Duration,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self::with_cache_dir("cache")
    }
}

impl DataSourceConfig {
    /// Default fallback plan (max, 20 years, 5 years) rooted at `cache_dir`
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fallback_windows: vec![
                HistoryWindow::Max,
                HistoryWindow::Years(20),
                HistoryWindow::Years(5),
            ],
            limited_windows: vec![HistoryWindow::Years(5)],
            min_rows: DEFAULT_MIN_OBSERVATIONS,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Whether a successful fetch on `window` yields a limited history
    pub fn is_limited(&self, window: HistoryWindow) -> bool {
        self.limited_windows.contains(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cycle_length, 894);
        assert_eq!(config.volatility_window, 30);
        assert_eq!(config.projection_window, 60);
        assert_eq!(config.dominant_cycle_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cycle_length_rejected() {
        let config = AnalysisConfig::default().with_cycle_length(0);
        assert!(matches!(
            config.validate(),
            Err(CycleAnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_data_source_defaults() {
        let config = DataSourceConfig::with_cache_dir("/tmp/prices");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/prices"));
        assert_eq!(config.fallback_windows.len(), 3);
        assert!(config.is_limited(HistoryWindow::Years(5)));
        assert!(!config.is_limited(HistoryWindow::Max));
    }
}
