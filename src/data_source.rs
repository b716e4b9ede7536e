//! Data-source collaborator contract.
//!
//! The analysis core performs no I/O. A [`HistoryProvider`] fetches raw daily
//! rows for one window of history; [`FallbackHistorySource`] walks the
//! configured windows from longest to shortest until one yields enough rows
//! and tags the history as limited when only a short window worked.
//!
//! All settings, including the cache location, are carried by the
//! [`DataSourceConfig`] handed to each source at construction.

use crate::{
    config::{DataSourceConfig, HistoryWindow},
    errors::{CycleAnalysisError, CycleResult},
    preprocessing::RawObservation,
};
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One provider call: what to fetch and the settings to fetch it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest<'a> {
    /// Normalised ticker symbol
    pub ticker: &'a str,
    /// Span of history wanted
    pub window: HistoryWindow,
    /// Directory the provider may read and write cached responses in
    pub cache_dir: &'a Path,
    /// Upper bound on the time spent on this request
    pub timeout: Duration,
}

impl<'a> HistoryRequest<'a> {
    /// Request for `ticker` over `window` with the settings of `config`
    pub fn new(ticker: &'a str, window: HistoryWindow, config: &'a DataSourceConfig) -> Self {
        Self {
            ticker,
            window,
            cache_dir: &config.cache_dir,
            timeout: config.request_timeout,
        }
    }
}

/// Fetches raw daily rows for a ticker over one history window.
///
/// Implementations own retries, backoff and caching. Each request carries
/// the cache directory and timeout of the source issuing it.
pub trait HistoryProvider {
    /// Rows for `request.ticker` covering `request.window`, oldest first
    fn fetch_window(&self, request: &HistoryRequest<'_>) -> CycleResult<Vec<RawObservation>>;
}

impl<P: HistoryProvider + ?Sized> HistoryProvider for &P {
    fn fetch_window(&self, request: &HistoryRequest<'_>) -> CycleResult<Vec<RawObservation>> {
        (**self).fetch_window(request)
    }
}

/// Raw history for one ticker, as handed to the analyzer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceHistory {
    /// Normalised ticker symbol
    pub ticker: String,
    /// Raw rows, oldest first
    pub observations: Vec<RawObservation>,
    /// Caveat when only a shortened window was available
    pub limited: Option<String>,
}

impl PriceHistory {
    /// Full history without a caveat
    pub fn new(ticker: impl Into<String>, observations: Vec<RawObservation>) -> Self {
        Self {
            ticker: ticker.into(),
            observations,
            limited: None,
        }
    }

    /// Whether the history carries a limited caveat
    pub fn is_limited(&self) -> bool {
        self.limited.is_some()
    }
}

/// Trim and upper-case a ticker symbol.
pub fn normalize_ticker(raw: &str) -> CycleResult<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(CycleAnalysisError::invalid_input("ticker must not be empty"));
    }
    Ok(ticker)
}

fn limited_caveat(window: HistoryWindow) -> String {
    match window {
        HistoryWindow::Max => "limited history".to_string(),
        HistoryWindow::Years(years) => format!("limited history ({} years)", years),
    }
}

/// Provider wrapper that degrades through shorter windows.
#[derive(Debug, Clone)]
pub struct FallbackHistorySource<P> {
    config: DataSourceConfig,
    provider: P,
}

impl<P: HistoryProvider> FallbackHistorySource<P> {
    /// Source over `provider` configured by `config`
    pub fn new(config: DataSourceConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// Settings this source was built with
    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch the longest usable history for `ticker`.
    ///
    /// A window is accepted when it returns more than `min_rows` rows; a
    /// provider error on one window moves on to the next.
    pub fn fetch(&self, ticker: &str) -> CycleResult<PriceHistory> {
        let ticker = normalize_ticker(ticker)?;
        let mut best_rows = 0;

        for &window in &self.config.fallback_windows {
            let request = HistoryRequest::new(&ticker, window, &self.config);
            let rows = match self.provider.fetch_window(&request) {
                Ok(rows) => rows,
                Err(e) => {
                    log::warn!("Fetching {} over {:?} failed: {}", ticker, window, e);
                    continue;
                }
            };

            if rows.len() > self.config.min_rows {
                let limited = self
                    .config
                    .is_limited(window)
                    .then(|| limited_caveat(window));
                if let Some(caveat) = &limited {
                    log::info!("{}: {}", ticker, caveat);
                }
                log::debug!("{}: {} rows over {:?}", ticker, rows.len(), window);
                return Ok(PriceHistory {
                    ticker,
                    observations: rows,
                    limited,
                });
            }

            log::debug!(
                "{}: only {} rows over {:?}, trying a shorter window",
                ticker,
                rows.len(),
                window
            );
            best_rows = best_rows.max(rows.len());
        }

        Err(CycleAnalysisError::insufficient(
            format!("price history for {}", ticker),
            self.config.min_rows + 1,
            best_rows,
        ))
    }
}
