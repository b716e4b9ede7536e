//! Data preprocessing for daily price histories.
//!
//! This module turns the raw `(date, close, volume)` rows supplied by a data
//! source into a validated [`PriceSeries`] and its derived [`ReturnSeries`].
//! Rows whose close cannot be read as a finite number are dropped; anything
//! else that violates the series invariants rejects the whole history.

use crate::{
    config::AnalysisConfig,
    errors::{CycleAnalysisError, CycleResult},
    math_utils::pct_change,
};
use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A raw numeric field as delivered by a data source
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawValue {
    /// Already numeric
    Number(f64),
    /// Textual value that may or may not parse
    Text(String),
}

impl RawValue {
    /// Coerce to a finite float, `None` when that is impossible
    pub fn to_finite(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One unvalidated daily row
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawObservation {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price, possibly missing or malformed
    pub close: Option<RawValue>,
    /// Traded volume, possibly missing or malformed
    pub volume: Option<RawValue>,
}

impl RawObservation {
    /// Row with a numeric close and volume
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            close: Some(RawValue::Number(close)),
            volume: Some(RawValue::Number(volume)),
        }
    }
}

/// One validated daily row
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceObservation {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price, strictly positive
    pub close: f64,
    /// Traded volume, non-negative
    pub volume: f64,
}

/// Validated price history: strictly increasing dates, positive finite closes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Validate already-typed observations.
    pub fn new(observations: Vec<PriceObservation>) -> CycleResult<Self> {
        for (i, obs) in observations.iter().enumerate() {
            if !(obs.close.is_finite() && obs.close > 0.0) {
                return Err(CycleAnalysisError::invalid_input(format!(
                    "close on {} must be positive and finite, got {}",
                    obs.date, obs.close
                )));
            }
            if !(obs.volume.is_finite() && obs.volume >= 0.0) {
                return Err(CycleAnalysisError::invalid_input(format!(
                    "volume on {} must be non-negative and finite, got {}",
                    obs.date, obs.volume
                )));
            }
            if i > 0 && obs.date <= observations[i - 1].date {
                return Err(CycleAnalysisError::invalid_input(format!(
                    "dates must be strictly increasing: {} follows {}",
                    obs.date,
                    observations[i - 1].date
                )));
            }
        }
        Ok(Self { observations })
    }

    /// All rows in date order
    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no rows
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    /// Volumes in date order
    pub fn volumes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.volume).collect()
    }

    /// Dates in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// First date, if any
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Last date, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Simple returns of the close, one per row after the first
    pub fn returns(&self) -> CycleResult<ReturnSeries> {
        let values = pct_change(&self.closes())?;
        let dates = self.observations.iter().skip(1).map(|o| o.date).collect();
        Ok(ReturnSeries { dates, values })
    }
}

/// Fractional simple returns, each dated with the later of its two closes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Returns as fractions (0.01 = 1%)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dates aligned with [`ReturnSeries::values`]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Returns scaled to percent
    pub fn as_percent(&self) -> Vec<f64> {
        self.values.iter().map(|r| r * 100.0).collect()
    }

    /// Number of returns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no returns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output of [`prepare_series`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreparedSeries {
    /// Cleaned price history
    pub prices: PriceSeries,
    /// Derived returns
    pub returns: ReturnSeries,
    /// Rows discarded because their close was missing or not a finite number
    pub dropped_rows: usize,
}

/// Clean and validate raw rows into an analysable series.
///
/// - close is coerced to a float; rows where that fails are dropped
/// - volume defaults to 0 when missing or unreadable
/// - remaining rows must have positive closes and strictly increasing dates
/// - at least `config.min_observations` rows must survive
pub fn prepare_series(
    raw: &[RawObservation],
    config: &AnalysisConfig,
) -> CycleResult<PreparedSeries> {
    let observations: Vec<PriceObservation> = raw
        .iter()
        .filter_map(|row| {
            let close = row.close.as_ref()?.to_finite()?;
            let volume = row
                .volume
                .as_ref()
                .and_then(RawValue::to_finite)
                .unwrap_or(0.0);
            Some(PriceObservation {
                date: row.date,
                close,
                volume,
            })
        })
        .collect();

    let dropped_rows = raw.len() - observations.len();
    if dropped_rows > 0 {
        log::debug!("Dropped {} rows without a usable close", dropped_rows);
    }

    if observations.len() < config.min_observations {
        return Err(CycleAnalysisError::insufficient(
            "price series",
            config.min_observations,
            observations.len(),
        ));
    }

    let prices = PriceSeries::new(observations)?;
    let returns = prices.returns()?;

    Ok(PreparedSeries {
        prices,
        returns,
        dropped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn rows(n: usize) -> Vec<RawObservation> {
        (0..n)
            .map(|i| RawObservation::new(day(i as i64), 100.0 + i as f64, 1_000.0))
            .collect()
    }

    #[test]
    fn test_raw_value_coercion() {
        assert_eq!(RawValue::from(1.5).to_finite(), Some(1.5));
        assert_eq!(RawValue::from(" 42.25 ").to_finite(), Some(42.25));
        assert_eq!(RawValue::from("n/a").to_finite(), None);
        assert_eq!(RawValue::from(f64::NAN).to_finite(), None);
        assert_eq!(RawValue::from("inf").to_finite(), None);
    }

    #[test]
    fn test_prepare_drops_unusable_closes() {
        let mut raw = rows(105);
        raw[3].close = None;
        raw[7].close = Some(RawValue::from("bad"));
        raw[9].close = Some(RawValue::from(f64::INFINITY));

        let prepared = prepare_series(&raw, &AnalysisConfig::default()).unwrap();
        assert_eq!(prepared.dropped_rows, 3);
        assert_eq!(prepared.prices.len(), 102);
        assert_eq!(prepared.returns.len(), 101);
    }

    #[test]
    fn test_prepare_defaults_missing_volume() {
        let mut raw = rows(100);
        raw[0].volume = None;
        raw[1].volume = Some(RawValue::from("?"));

        let prepared = prepare_series(&raw, &AnalysisConfig::default()).unwrap();
        assert_eq!(prepared.prices.observations()[0].volume, 0.0);
        assert_eq!(prepared.prices.observations()[1].volume, 0.0);
        assert_eq!(prepared.prices.observations()[2].volume, 1_000.0);
    }

    #[test]
    fn test_prepare_rejects_short_history() {
        let raw = rows(50);
        match prepare_series(&raw, &AnalysisConfig::default()) {
            Err(CycleAnalysisError::InsufficientData {
                required, actual, ..
            }) => {
                assert_eq!(required, 100);
                assert_eq!(actual, 50);
            }
            other => panic!("Expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_prepare_rejects_non_positive_close() {
        let mut raw = rows(120);
        raw[10].close = Some(RawValue::from(0.0));
        assert!(matches!(
            prepare_series(&raw, &AnalysisConfig::default()),
            Err(CycleAnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_prepare_rejects_duplicate_dates() {
        let mut raw = rows(120);
        raw[20].date = raw[19].date;
        assert!(matches!(
            prepare_series(&raw, &AnalysisConfig::default()),
            Err(CycleAnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_returns_alignment() {
        let prepared = prepare_series(&rows(100), &AnalysisConfig::default()).unwrap();
        let returns = &prepared.returns;
        assert_eq!(returns.len(), 99);
        assert_eq!(returns.dates()[0], day(1));
        assert_approx_eq!(returns.values()[0], 0.01, 1e-12);
        assert_approx_eq!(returns.as_percent()[0], 1.0, 1e-10);
    }
}
