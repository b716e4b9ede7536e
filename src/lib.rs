//! # Market Cycle Analysis
//!
//! Cyclical, spectral and volatility-regime descriptors for a single
//! instrument's daily price history.
//!
//! This crate takes the raw `(date, close, volume)` rows of one ticker and
//! derives the figures a market-cycle dashboard is built from. Every analysis
//! is a pure function of its input series; no state is shared between runs
//! and the crate performs no I/O of its own.
//!
//! ## Key Features
//!
//! - **Series Preparation**: Coercion of raw rows, validation and return computation
//! - **Seasonal Decomposition**: Additive trend/seasonal/residual split with an
//!   annual, quarterly or monthly period chosen from the available history
//! - **Fixed-Length Cycles**: Alignment on the 894-day Kitchin window with the
//!   current position and deviation from the average cycle
//! - **Monthly Seasonality**: Average return per calendar month over the last decade
//! - **Volatility Regimes**: Rolling annualised volatility classified as Low, Normal or High
//! - **Hurst Exponent**: Lag-dispersion scaling estimate of long memory
//! - **Dominant Cycles**: FFT amplitude spectrum and its strongest periods
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use market_cycles::{CycleAnalyzer, RawObservation};
//! use chrono::NaiveDate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let start = NaiveDate::from_ymd_opt(2015, 1, 1).ok_or("bad date")?;
//!     let rows: Vec<RawObservation> = (0..1500)
//!         .map(|i| {
//!             let close = 100.0 + (i as f64 / 40.0).sin() * 5.0 + i as f64 * 0.02;
//!             RawObservation::new(start + chrono::Duration::days(i), close, 1_000.0)
//!         })
//!         .collect();
//!
//!     let report = CycleAnalyzer::default().analyze_observations("DEMO", &rows)?;
//!     let summary = report.summary();
//!     println!("{:?} {:?}", summary.cycle_label(), summary.regime);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around the [`CycleAnalyzer`], which prepares the
//! series once and runs every component against it, recording a failure in
//! one component without stopping the others. Each component can also be
//! used directly. Fetching history is delegated to a [`HistoryProvider`]
//! wrapped in a [`FallbackHistorySource`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod analyzer;
pub mod config;
pub mod data_source;
pub mod errors;
pub mod math_utils;
pub mod preprocessing;
pub mod results;

// Analysis components
pub mod decomposition;
pub mod fft_ops;
pub mod hurst_estimators;
pub mod kitchin;
pub mod seasonality;
pub mod volatility;

// Synthetic data
pub mod generators;

// Re-exports for convenience - main public API
pub use analyzer::CycleAnalyzer;
pub use config::{AnalysisConfig, DataSourceConfig, HistoryWindow};
pub use data_source::{
    normalize_ticker, FallbackHistorySource, HistoryProvider, HistoryRequest, PriceHistory,
};
pub use errors::{CycleAnalysisError, CycleResult, ErrorCategory};
pub use preprocessing::{
    prepare_series, PreparedSeries, PriceObservation, PriceSeries, RawObservation, RawValue,
    ReturnSeries,
};
pub use results::{
    AnalysisReport, Component, ComponentFailure, ComponentOutcome, DashboardSummary,
};

// Component exports
pub use decomposition::{
    decompose_additive, decompose_returns, select_period, DecompositionResult, PeriodTier,
};
pub use fft_ops::{
    amplitude_spectrum, analyze_spectrum, DominantCycle, SpectralBin, SpectralResult,
};
pub use hurst_estimators::{estimate_hurst_lag_dispersion, HurstInterpretation, HurstResult};
pub use kitchin::{align_fixed_cycle, FixedCycleResult};
pub use seasonality::{aggregate_monthly_returns, MonthlyReturn, SeasonalProfile};
pub use volatility::{
    estimate_volatility, rolling_volatility, VolatilityProfile, VolatilityRegime,
};

// Data generation exports
pub use generators::{
    generate_benchmark_series, generate_price_observations, BenchmarkSeriesType, GeneratorConfig,
};

// Mathematical utilities exports
pub use math_utils::{
    // Safe arithmetic operations
    float_ops::{is_negligible, safe_div, safe_ln},
    linear_fit, median, pct_change, population_std, sample_std,
};
