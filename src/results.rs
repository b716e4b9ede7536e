//! # Analysis Results Structures
//!
//! This module contains the result bundle produced by one analysis run: one
//! slot per analysis component holding either its output or the recorded
//! reason it failed, plus a flattened summary for dashboard headlines.

use crate::{
    decomposition::DecompositionResult,
    errors::{CycleAnalysisError, ErrorCategory},
    fft_ops::SpectralResult,
    hurst_estimators::HurstResult,
    kitchin::FixedCycleResult,
    seasonality::SeasonalProfile,
    volatility::{VolatilityProfile, VolatilityRegime},
};
use chrono::{DateTime, Month, NaiveDate, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Analysis components run against a prepared series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Component {
    /// Trend/seasonal/residual decomposition of returns
    Decomposition,
    /// Fixed-length cycle alignment
    FixedCycle,
    /// Monthly seasonality
    Seasonality,
    /// Rolling volatility and regime
    Volatility,
    /// Hurst exponent
    Hurst,
    /// Dominant spectral cycles
    Spectrum,
}

impl Component {
    /// Every component in execution order
    pub const ALL: [Component; 6] = [
        Component::Decomposition,
        Component::FixedCycle,
        Component::Seasonality,
        Component::Volatility,
        Component::Hurst,
        Component::Spectrum,
    ];

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Component::Decomposition => "decomposition",
            Component::FixedCycle => "fixed cycle",
            Component::Seasonality => "seasonality",
            Component::Volatility => "volatility",
            Component::Hurst => "hurst",
            Component::Spectrum => "spectrum",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a component produced no result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentFailure {
    /// Component that failed
    pub component: Component,
    /// Error class
    pub category: ErrorCategory,
    /// Rendered error message
    pub reason: String,
}

impl ComponentFailure {
    /// Record `error` against `component`.
    pub fn new(component: Component, error: &CycleAnalysisError) -> Self {
        Self {
            component,
            category: error.category(),
            reason: error.to_string(),
        }
    }
}

/// Either a component's output or its recorded failure
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ComponentOutcome<T> {
    /// The component ran to completion
    Computed(T),
    /// The component failed; other components are unaffected
    Failed(ComponentFailure),
}

impl<T> ComponentOutcome<T> {
    /// Wrap a component's result, recording an error as a failure.
    pub fn from_result(component: Component, result: Result<T, CycleAnalysisError>) -> Self {
        match result {
            Ok(value) => ComponentOutcome::Computed(value),
            Err(error) => ComponentOutcome::Failed(ComponentFailure::new(component, &error)),
        }
    }

    /// The computed value, if any
    pub fn computed(&self) -> Option<&T> {
        match self {
            ComponentOutcome::Computed(value) => Some(value),
            ComponentOutcome::Failed(_) => None,
        }
    }

    /// The recorded failure, if any
    pub fn failure(&self) -> Option<&ComponentFailure> {
        match self {
            ComponentOutcome::Computed(_) => None,
            ComponentOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Whether the component succeeded
    pub fn is_computed(&self) -> bool {
        matches!(self, ComponentOutcome::Computed(_))
    }
}

/// Complete results of one analysis run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisReport {
    /// Instrument analysed
    pub ticker: String,
    /// Valid observations after preparation
    pub observations: usize,
    /// Raw rows discarded during preparation
    pub dropped_rows: usize,
    /// First observation date
    pub first_date: NaiveDate,
    /// Last observation date
    pub last_date: NaiveDate,
    /// Latest close
    pub last_close: f64,
    /// Caveat set when the data source could only supply a short history
    pub limited_history: Option<String>,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Trend/seasonal/residual decomposition
    pub decomposition: ComponentOutcome<DecompositionResult>,
    /// Fixed-length cycle position
    pub fixed_cycle: ComponentOutcome<FixedCycleResult>,
    /// Monthly seasonality
    pub seasonality: ComponentOutcome<SeasonalProfile>,
    /// Volatility profile
    pub volatility: ComponentOutcome<VolatilityProfile>,
    /// Hurst exponent
    pub hurst: ComponentOutcome<HurstResult>,
    /// Dominant spectral cycles
    pub spectrum: ComponentOutcome<SpectralResult>,
}

impl AnalysisReport {
    /// Failures in component order
    pub fn failures(&self) -> Vec<&ComponentFailure> {
        [
            self.decomposition.failure(),
            self.fixed_cycle.failure(),
            self.seasonality.failure(),
            self.volatility.failure(),
            self.hurst.failure(),
            self.spectrum.failure(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Whether every component succeeded
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// Headline figures for a dashboard
    pub fn summary(&self) -> DashboardSummary {
        let cycle = self.fixed_cycle.computed();
        let volatility = self.volatility.computed();
        let seasonality = self.seasonality.computed();

        DashboardSummary {
            ticker: self.ticker.clone(),
            current_price: cycle.map_or(self.last_close, |c| c.current_price),
            cycle_day: cycle.map(|c| c.current_day),
            cycle_length: cycle.map(|c| c.cycle_length),
            days_remaining: cycle.map(|c| c.days_remaining),
            deviation_pct: cycle.map(|c| c.deviation_pct),
            current_volatility: volatility.map(|v| v.current),
            volatility_outlook: volatility.map(|v| v.projection_12m),
            regime: volatility.map(|v| v.regime),
            hurst_exponent: self.hurst.computed().map(|h| h.exponent),
            dominant_period_days: self
                .spectrum
                .computed()
                .and_then(|s| s.dominant_cycles.first())
                .map(|c| c.period_days),
            best_month: seasonality.map(|s| s.best_month),
            worst_month: seasonality.map(|s| s.worst_month),
            limited_history: self.limited_history.clone(),
        }
    }
}

/// Flattened headline view of an [`AnalysisReport`].
///
/// Fields sourced from a failed component are `None`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DashboardSummary {
    /// Instrument analysed
    pub ticker: String,
    /// Latest close
    pub current_price: f64,
    /// Day within the fixed-length cycle
    pub cycle_day: Option<usize>,
    /// Fixed cycle length
    pub cycle_length: Option<usize>,
    /// Days until the cycle completes
    pub days_remaining: Option<usize>,
    /// Deviation from the average cycle, percent
    pub deviation_pct: Option<f64>,
    /// Current annualised volatility, percent
    pub current_volatility: Option<f64>,
    /// Trailing mean volatility used as the 12-month outlook
    pub volatility_outlook: Option<f64>,
    /// Volatility regime
    pub regime: Option<VolatilityRegime>,
    /// Hurst exponent
    pub hurst_exponent: Option<f64>,
    /// Strongest spectral period
    pub dominant_period_days: Option<f64>,
    /// Month with the best average return
    pub best_month: Option<Month>,
    /// Month with the worst average return
    pub worst_month: Option<Month>,
    /// Limited-history caveat
    pub limited_history: Option<String>,
}

impl DashboardSummary {
    /// Short "day N/L" label, when the cycle is known
    pub fn cycle_label(&self) -> Option<String> {
        Some(format!("Day {}/{}", self.cycle_day?, self.cycle_length?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: ComponentOutcome<u32> = ComponentOutcome::from_result(Component::Hurst, Ok(3));
        assert!(ok.is_computed());
        assert_eq!(ok.computed(), Some(&3));
        assert!(ok.failure().is_none());

        let failed: ComponentOutcome<u32> = ComponentOutcome::from_result(
            Component::Spectrum,
            Err(CycleAnalysisError::degenerate("spectral analysis", "flat")),
        );
        let failure = failed.failure().unwrap();
        assert_eq!(failure.component, Component::Spectrum);
        assert_eq!(failure.category, ErrorCategory::NumericDegenerate);
        assert!(failure.reason.contains("flat"));
        assert!(failed.computed().is_none());
    }

    #[test]
    fn test_component_names() {
        assert_eq!(Component::ALL.len(), 6);
        assert_eq!(Component::FixedCycle.to_string(), "fixed cycle");
    }
}
