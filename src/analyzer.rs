//! # Cycle Analyzer
//!
//! This module contains the [`CycleAnalyzer`] struct which serves as the main
//! entry point for analysing one instrument's daily history. It prepares the
//! series once, runs every analysis component against it and collects the
//! outputs into an [`AnalysisReport`].
//!
//! ## Failure Handling
//!
//! Only series preparation can fail the analysis as a whole. Every later
//! component is isolated: its error is logged, recorded in the report as a
//! [`ComponentOutcome::Failed`] entry, and the remaining components still run.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use market_cycles::{CycleAnalyzer, PriceHistory};
//! use market_cycles::errors::CycleAnalysisError;
//!
//! # fn main() -> Result<(), CycleAnalysisError> {
//! # let observations = Vec::new();
//! let analyzer = CycleAnalyzer::default();
//! let report = analyzer.analyze(&PriceHistory::new("SPY", observations))?;
//!
//! let summary = report.summary();
//! if let Some(label) = summary.cycle_label() {
//!     println!("{}: {}", summary.ticker, label);
//! }
//! for failure in report.failures() {
//!     println!("{} unavailable: {}", failure.component, failure.reason);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    config::AnalysisConfig,
    data_source::PriceHistory,
    decomposition::decompose_returns,
    errors::{CycleAnalysisError, CycleResult},
    fft_ops::analyze_spectrum,
    hurst_estimators::estimate_hurst_lag_dispersion,
    kitchin::align_fixed_cycle,
    preprocessing::{prepare_series, PreparedSeries, RawObservation},
    results::{AnalysisReport, Component, ComponentOutcome},
    seasonality::aggregate_monthly_returns,
    volatility::estimate_volatility,
};
use chrono::Utc;

/// Runs the full component pipeline over price histories.
///
/// Holds only configuration; separate analyses share no state.
#[derive(Debug, Clone, Default)]
pub struct CycleAnalyzer {
    config: AnalysisConfig,
}

impl CycleAnalyzer {
    /// Analyzer with a validated configuration
    pub fn new(config: AnalysisConfig) -> CycleResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a history supplied by a data source.
    ///
    /// Fails only when the series cannot be prepared.
    pub fn analyze(&self, history: &PriceHistory) -> CycleResult<AnalysisReport> {
        log::info!(
            "Analysing {} ({} raw observations)",
            history.ticker,
            history.observations.len()
        );
        let prepared = prepare_series(&history.observations, &self.config).map_err(|e| {
            log::warn!("Series preparation failed for {}: {}", history.ticker, e);
            e
        })?;
        self.analyze_prepared(&history.ticker, &prepared, history.limited.clone())
    }

    /// Analyse raw rows directly, without a data source.
    pub fn analyze_observations(
        &self,
        ticker: &str,
        observations: &[RawObservation],
    ) -> CycleResult<AnalysisReport> {
        self.analyze(&PriceHistory::new(ticker, observations.to_vec()))
    }

    /// Run every component against an already prepared series.
    pub fn analyze_prepared(
        &self,
        ticker: &str,
        prepared: &PreparedSeries,
        limited_history: Option<String>,
    ) -> CycleResult<AnalysisReport> {
        let prices = &prepared.prices;
        let returns = &prepared.returns;
        let config = &self.config;

        let (first, last) = match (prices.observations().first(), prices.observations().last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(CycleAnalysisError::insufficient(
                    "price series",
                    config.min_observations,
                    0,
                ))
            }
        };

        let decomposition = run(ticker, Component::Decomposition, || {
            let result = decompose_returns(&returns.as_percent())?;
            log::info!("{}: decomposition period {} days", ticker, result.period);
            Ok(result)
        });
        let fixed_cycle = run(ticker, Component::FixedCycle, || {
            align_fixed_cycle(prices, config)
        });
        let seasonality = run(ticker, Component::Seasonality, || {
            aggregate_monthly_returns(returns, config)
        });
        let volatility = run(ticker, Component::Volatility, || {
            estimate_volatility(returns, config)
        });
        let hurst = run(ticker, Component::Hurst, || {
            estimate_hurst_lag_dispersion(&prices.closes(), config.hurst_max_lag)
        });
        let spectrum = run(ticker, Component::Spectrum, || {
            analyze_spectrum(returns.values(), config)
        });

        let report = AnalysisReport {
            ticker: ticker.to_string(),
            observations: prices.len(),
            dropped_rows: prepared.dropped_rows,
            first_date: first.date,
            last_date: last.date,
            last_close: last.close,
            limited_history,
            generated_at: Utc::now(),
            decomposition,
            fixed_cycle,
            seasonality,
            volatility,
            hurst,
            spectrum,
        };

        log::info!(
            "Analysis of {} complete: {} of {} components failed",
            ticker,
            report.failures().len(),
            Component::ALL.len()
        );
        Ok(report)
    }

    /// Analyse several independent histories.
    ///
    /// Results come back in input order. With the `parallel` feature the
    /// histories are analysed on the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn analyze_many(&self, histories: &[PriceHistory]) -> Vec<CycleResult<AnalysisReport>> {
        use rayon::prelude::*;
        histories.par_iter().map(|h| self.analyze(h)).collect()
    }

    /// Analyse several independent histories.
    ///
    /// Results come back in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn analyze_many(&self, histories: &[PriceHistory]) -> Vec<CycleResult<AnalysisReport>> {
        histories.iter().map(|h| self.analyze(h)).collect()
    }
}

fn run<T>(
    ticker: &str,
    component: Component,
    step: impl FnOnce() -> CycleResult<T>,
) -> ComponentOutcome<T> {
    let result = step();
    if let Err(e) = &result {
        log::warn!("{}: {} failed: {}", ticker, component, e);
    }
    ComponentOutcome::from_result(component, result)
}
