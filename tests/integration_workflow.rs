//! Integration tests for full workflow scenarios
//!
//! These tests validate end-to-end functionality of the CycleAnalyzer across
//! complete analysis runs, ensuring all components work together on one
//! prepared series.

use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use market_cycles::{
    generators::*, results::Component, AnalysisConfig, CycleAnalyzer, HurstInterpretation,
    PeriodTier, PriceHistory, RawObservation,
};

fn dated_rows(closes: &[f64]) -> Vec<RawObservation> {
    let dates = trading_days(NaiveDate::from_ymd_opt(2005, 1, 3).unwrap(), closes.len());
    dates
        .into_iter()
        .zip(closes)
        .map(|(date, &close)| RawObservation::new(date, close, 5_000.0))
        .collect()
}

/// Test scenario: analyst runs the full dashboard pipeline on a long history
///
/// 1. Generate ten years of synthetic daily closes
/// 2. Run every component
/// 3. Check each component's invariants on the shared series
/// 4. Build the dashboard summary
#[test]
fn test_complete_dashboard_workflow() {
    let config = GeneratorConfig {
        length: 2520,
        seed: Some(42),
        ..Default::default()
    };
    let rows = generate_price_observations(BenchmarkSeriesType::GeometricWalk, &config).unwrap();

    let report = CycleAnalyzer::default()
        .analyze_observations("WALK", &rows)
        .expect("Analysis should succeed");
    assert!(report.is_complete(), "failures: {:?}", report.failures());

    // Decomposition: annual period and additive reconstruction
    let decomposition = report.decomposition.computed().unwrap();
    assert_eq!(decomposition.tier, Some(PeriodTier::Annual));
    let closes: Vec<f64> = rows
        .iter()
        .map(|r| r.close.as_ref().and_then(|c| c.to_finite()).unwrap())
        .collect();
    for i in 0..decomposition.trend.len() {
        let pct = (closes[i + 1] / closes[i] - 1.0) * 100.0;
        let rebuilt =
            decomposition.trend[i] + decomposition.seasonal[i] + decomposition.residual[i];
        assert_approx_eq!(rebuilt, pct, 1e-9);
    }

    // Fixed cycle: every normalised cycle starts at 100
    let cycle = report.fixed_cycle.computed().unwrap();
    assert_eq!(cycle.current_day, 2520 % 894);
    assert_eq!(cycle.current_cycle[0], 100.0);
    assert_eq!(cycle.avg_cycle.as_ref().unwrap()[0], 100.0);
    assert!(cycle.deviation_pct.is_finite());

    // Volatility: one value per full window
    let volatility = report.volatility.computed().unwrap();
    assert_eq!(volatility.rolling.len(), 2519 - 29);
    assert!(volatility.rolling.iter().all(|v| *v >= 0.0));

    // Spectrum: at most five periods, none longer than 500 days, ranked
    let spectrum = report.spectrum.computed().unwrap();
    assert!(spectrum.dominant_cycles.len() <= 5);
    assert!(spectrum
        .dominant_cycles
        .iter()
        .all(|c| c.period_days <= 500.0));
    assert!(spectrum
        .dominant_cycles
        .windows(2)
        .all(|w| w[0].power >= w[1].power));

    // Summary mirrors the component outputs
    let summary = report.summary();
    assert_eq!(summary.ticker, "WALK");
    assert_eq!(summary.cycle_day, Some(cycle.current_day));
    assert_eq!(summary.days_remaining, Some(894 - cycle.current_day));
    assert_eq!(summary.current_volatility, Some(volatility.current));
    assert_eq!(summary.regime, Some(volatility.regime));
    assert_eq!(summary.cycle_label().unwrap(), format!("Day {}/894", cycle.current_day));
    assert!(summary.limited_history.is_none());
}

/// Test scenario: a perfectly repeating 894-day pattern sits exactly on its average
#[test]
fn test_repeating_kitchin_pattern_has_zero_deviation() {
    let config = GeneratorConfig {
        length: 894 * 3 + 10,
        ..Default::default()
    };
    let rows =
        generate_price_observations(BenchmarkSeriesType::RepeatingPattern(894), &config).unwrap();
    let closes = generate_benchmark_series(BenchmarkSeriesType::RepeatingPattern(894), &config)
        .unwrap();

    let report = CycleAnalyzer::default()
        .analyze_observations("PATTERN", &rows)
        .unwrap();
    let cycle = report.fixed_cycle.computed().unwrap();

    assert_eq!(cycle.historical_windows, 3);
    let avg = cycle.avg_cycle.as_ref().unwrap();
    for day in 0..894 {
        assert_approx_eq!(avg[day], closes[day] / closes[0] * 100.0, 1e-9);
    }
    assert_approx_eq!(cycle.deviation_pct, 0.0, 1e-9);
}

/// Test scenario: strictly linear prices, 900 days, +1 per day
#[test]
fn test_linear_prices_cycle_and_hurst() {
    let closes: Vec<f64> = (0..900).map(|i| 100.0 + i as f64).collect();
    let report = CycleAnalyzer::default()
        .analyze_observations("LINE", &dated_rows(&closes))
        .unwrap();

    let cycle = report.fixed_cycle.computed().unwrap();
    assert!(cycle.current_cycle.windows(2).all(|w| w[1] > w[0]));
    assert!(cycle.deviation_pct.is_finite());

    // Every lag difference is constant, so no dispersion anywhere
    let hurst = report.hurst.computed().unwrap();
    assert_eq!(hurst.interpretation, HurstInterpretation::Random);
}

/// Test scenario: a random-walk history has a Hurst exponent near one half
#[test]
fn test_random_walk_hurst_through_analyzer() {
    let config = GeneratorConfig {
        length: 5000,
        seed: Some(7),
        start_price: 1_000.0,
        step_volatility: 0.002,
        ..Default::default()
    };
    let closes = generate_benchmark_series(BenchmarkSeriesType::RandomWalk, &config).unwrap();
    assert!(closes.iter().all(|p| *p > 0.0));

    let report = CycleAnalyzer::default()
        .analyze_observations("RW", &dated_rows(&closes))
        .unwrap();
    let hurst = report.hurst.computed().unwrap();
    assert!(
        (0.4..=0.6).contains(&hurst.exponent),
        "H = {}",
        hurst.exponent
    );
}

/// Test scenario: history just long enough for each decomposition tier
#[test]
fn test_decomposition_tier_follows_history_length() {
    let cases = [
        (101, Some(PeriodTier::Monthly)),
        (127, Some(PeriodTier::Quarterly)),
        (505, Some(PeriodTier::Annual)),
    ];
    for (length, tier) in cases {
        let config = GeneratorConfig {
            length,
            seed: Some(length as u64),
            ..Default::default()
        };
        let rows =
            generate_price_observations(BenchmarkSeriesType::GeometricWalk, &config).unwrap();
        let report = CycleAnalyzer::default()
            .analyze_observations("TIER", &rows)
            .unwrap();
        assert_eq!(report.decomposition.computed().unwrap().tier, tier);
    }
}

/// Test scenario: a shorter configured cycle length flows through to the summary
#[test]
fn test_custom_cycle_length() {
    let analyzer = CycleAnalyzer::new(AnalysisConfig::default().with_cycle_length(250)).unwrap();
    let config = GeneratorConfig {
        length: 1010,
        seed: Some(3),
        ..Default::default()
    };
    let rows = generate_price_observations(BenchmarkSeriesType::GeometricWalk, &config).unwrap();
    let report = analyzer.analyze(&PriceHistory::new("SHORT", rows)).unwrap();

    let summary = report.summary();
    assert_eq!(summary.cycle_length, Some(250));
    assert_eq!(summary.cycle_day, Some(10));
    assert_eq!(report.fixed_cycle.computed().unwrap().historical_windows, 4);
    assert!(!report.failures().iter().any(|f| f.component == Component::FixedCycle));
}

/// Test scenario: prices quoted in a tiny unit analyse like the same prices at unit scale
#[test]
fn test_tiny_price_unit_matches_unit_scale() {
    let config = GeneratorConfig {
        length: 1200,
        seed: Some(88),
        ..Default::default()
    };
    let closes = generate_benchmark_series(BenchmarkSeriesType::GeometricWalk, &config).unwrap();
    let tiny: Vec<f64> = closes.iter().map(|p| p * 1e-15).collect();

    let analyzer = CycleAnalyzer::default();
    let reference = analyzer
        .analyze_observations("UNIT", &dated_rows(&closes))
        .unwrap();
    let scaled = analyzer
        .analyze_observations("TINY", &dated_rows(&tiny))
        .expect("Positive finite prices are valid at any scale");
    assert!(scaled.is_complete(), "failures: {:?}", scaled.failures());

    let (h_ref, h_tiny) = (
        reference.hurst.computed().unwrap(),
        scaled.hurst.computed().unwrap(),
    );
    assert_approx_eq!(h_tiny.exponent, h_ref.exponent, 1e-6);
    assert_ne!(h_tiny.exponent, 0.5);

    let (v_ref, v_tiny) = (
        reference.volatility.computed().unwrap(),
        scaled.volatility.computed().unwrap(),
    );
    assert_approx_eq!(v_tiny.current, v_ref.current, 1e-6);

    let (s_ref, s_tiny) = (
        reference.spectrum.computed().unwrap(),
        scaled.spectrum.computed().unwrap(),
    );
    assert_approx_eq!(
        s_tiny.dominant_cycles[0].period_days,
        s_ref.dominant_cycles[0].period_days,
        1e-9
    );
}

/// Test scenario: a slowly rising sub-picodollar series is a valid history
#[test]
fn test_slowly_rising_tiny_prices() {
    let closes: Vec<f64> = (0..300).map(|k| 1e-13 * (1.0 + 0.01 * k as f64)).collect();
    let report = CycleAnalyzer::default()
        .analyze_observations("DUST", &dated_rows(&closes))
        .expect("Tiny prices must not fail the percent change");

    assert_eq!(report.observations, 300);
    assert!(report.is_complete(), "failures: {:?}", report.failures());
    // Lag differences of a straight line differ only by rounding
    let hurst = report.hurst.computed().unwrap();
    assert_eq!(hurst.interpretation, HurstInterpretation::Random);
}
