//! Calendar-month seasonality of daily returns.

use crate::{
    config::AnalysisConfig,
    errors::{CycleAnalysisError, CycleResult},
    preprocessing::ReturnSeries,
};
use chrono::{Datelike, Month};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Average daily return observed in one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonthlyReturn {
    /// Calendar month
    pub month: Month,
    /// Mean daily return in percent
    pub mean_return_pct: f64,
    /// Number of daily returns averaged
    pub observations: usize,
}

/// Mean daily return per calendar month over the lookback window
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeasonalProfile {
    /// Months with at least one observation, January first
    pub monthly: Vec<MonthlyReturn>,
    /// Month with the highest mean return
    pub best_month: Month,
    /// Month with the lowest mean return
    pub worst_month: Month,
    /// Earliest calendar year included
    pub first_year: i32,
    /// Latest calendar year included
    pub last_year: i32,
}

impl SeasonalProfile {
    /// Mean return for `month`, `None` when the month had no observations
    pub fn mean_for(&self, month: Month) -> Option<f64> {
        self.monthly
            .iter()
            .find(|m| m.month == month)
            .map(|m| m.mean_return_pct)
    }
}

/// Group returns by calendar month over the most recent years.
///
/// Keeps returns dated in a year `>= last_year - seasonal_lookback_years`.
/// Months without observations are left out rather than imputed.
pub fn aggregate_monthly_returns(
    returns: &ReturnSeries,
    config: &AnalysisConfig,
) -> CycleResult<SeasonalProfile> {
    let last_year = returns
        .dates()
        .iter()
        .map(|d| d.year())
        .max()
        .ok_or_else(|| CycleAnalysisError::insufficient("monthly seasonality", 1, 0))?;
    let cutoff = last_year - config.seasonal_lookback_years;

    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    let mut first_year = last_year;

    for (date, pct) in returns.dates().iter().zip(returns.as_percent()) {
        if date.year() < cutoff {
            continue;
        }
        let idx = date.month0() as usize;
        sums[idx] += pct;
        counts[idx] += 1;
        first_year = first_year.min(date.year());
    }

    let monthly: Vec<MonthlyReturn> = (0..12)
        .filter(|&idx| counts[idx] > 0)
        .map(|idx| {
            let month = Month::try_from(idx as u8 + 1).map_err(|_| {
                CycleAnalysisError::invalid_input(format!("month index {} out of range", idx))
            })?;
            Ok(MonthlyReturn {
                month,
                mean_return_pct: sums[idx] / counts[idx] as f64,
                observations: counts[idx],
            })
        })
        .collect::<CycleResult<_>>()?;

    let mut best = monthly
        .first()
        .ok_or_else(|| CycleAnalysisError::insufficient("monthly seasonality", 1, 0))?;
    let mut worst = best;
    // Strict comparisons keep the earliest month on ties
    for entry in &monthly[1..] {
        if entry.mean_return_pct > best.mean_return_pct {
            best = entry;
        }
        if entry.mean_return_pct < worst.mean_return_pct {
            worst = entry;
        }
    }

    let (best_month, worst_month) = (best.month, worst.month);
    log::debug!(
        "Seasonality {}-{}: best {:?}, worst {:?}",
        first_year,
        last_year,
        best_month,
        worst_month
    );

    Ok(SeasonalProfile {
        monthly,
        best_month,
        worst_month,
        first_year,
        last_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{PriceObservation, PriceSeries};
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveDate;

    fn returns_from(rows: &[(NaiveDate, f64)]) -> ReturnSeries {
        let observations = rows
            .iter()
            .map(|&(date, close)| PriceObservation {
                date,
                close,
                volume: 0.0,
            })
            .collect();
        PriceSeries::new(observations).unwrap().returns().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_means_and_extremes() {
        // Jan: +10%, Feb: -10%, Mar: +5% then +5%
        let returns = returns_from(&[
            (date(2020, 1, 1), 100.0),
            (date(2020, 1, 2), 110.0),
            (date(2020, 2, 3), 99.0),
            (date(2020, 3, 2), 103.95),
            (date(2020, 3, 3), 109.1475),
        ]);
        let profile = aggregate_monthly_returns(&returns, &AnalysisConfig::default()).unwrap();

        assert_eq!(profile.monthly.len(), 3);
        assert_approx_eq!(profile.mean_for(Month::January).unwrap(), 10.0, 1e-9);
        assert_approx_eq!(profile.mean_for(Month::February).unwrap(), -10.0, 1e-9);
        assert_approx_eq!(profile.mean_for(Month::March).unwrap(), 5.0, 1e-9);
        assert_eq!(profile.monthly[2].observations, 2);
        assert_eq!(profile.best_month, Month::January);
        assert_eq!(profile.worst_month, Month::February);
        assert_eq!(profile.mean_for(Month::April), None);
    }

    #[test]
    fn test_lookback_excludes_old_years() {
        let returns = returns_from(&[
            (date(2000, 5, 1), 100.0),
            (date(2000, 5, 2), 200.0),
            (date(2009, 12, 31), 200.0),
            (date(2010, 1, 4), 200.0),
            (date(2015, 5, 1), 202.0),
            (date(2020, 5, 1), 204.02),
        ]);
        let profile = aggregate_monthly_returns(&returns, &AnalysisConfig::default()).unwrap();
        let may = profile.mean_for(Month::May).unwrap();
        // The +100% return dated 2000 is outside the window
        assert_approx_eq!(may, 1.0, 1e-9);
        assert_eq!(profile.mean_for(Month::December), None);
        assert_approx_eq!(profile.mean_for(Month::January).unwrap(), 0.0, 1e-12);
        assert_eq!(profile.first_year, 2010);
        assert_eq!(profile.last_year, 2020);
    }

    #[test]
    fn test_ties_keep_earliest_month() {
        let returns = returns_from(&[
            (date(2021, 1, 4), 100.0),
            (date(2021, 2, 1), 100.0),
            (date(2021, 3, 1), 100.0),
        ]);
        let profile = aggregate_monthly_returns(&returns, &AnalysisConfig::default()).unwrap();
        assert_eq!(profile.best_month, Month::February);
        assert_eq!(profile.worst_month, Month::February);
    }

    #[test]
    fn test_empty_returns_rejected() {
        let returns = returns_from(&[(date(2021, 1, 4), 100.0)]);
        assert!(matches!(
            aggregate_monthly_returns(&returns, &AnalysisConfig::default()),
            Err(CycleAnalysisError::InsufficientData { .. })
        ));
    }
}
