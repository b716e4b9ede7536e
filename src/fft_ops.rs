//! Spectral analysis of return series.
//!
//! The return series is transformed with a forward FFT and reduced to a
//! one-sided amplitude spectrum over the positive-frequency half. Bins whose
//! period exceeds the configured horizon are discarded as near-DC drift, and
//! the strongest remaining bins are reported as dominant cycles.
//!
//! FFT plans are created per call; nothing is cached between analyses.

use crate::{
    config::AnalysisConfig,
    errors::{validate_all_finite, validate_data_length, CycleAnalysisError, CycleResult},
    math_utils::float_ops,
};
use rustfft::{num_complex::Complex, FftPlanner};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fewest returns the spectrum is computed for
pub const MIN_SPECTRAL_OBSERVATIONS: usize = 4;

/// One-sided amplitude spectrum over bins `0..n/2`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AmplitudeSpectrum {
    /// Bin frequencies in cycles per day
    pub frequencies: Vec<f64>,
    /// `2/n * |F[i]|` for each bin
    pub powers: Vec<f64>,
}

/// A frequency bin that survived the long-period filter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralBin {
    /// Cycles per day
    pub frequency: f64,
    /// `1 / frequency`
    pub period_days: f64,
    /// One-sided amplitude
    pub power: f64,
}

/// A top-ranked periodicity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DominantCycle {
    /// Period in trading days
    pub period_days: f64,
    /// Cycles per day
    pub frequency: f64,
    /// One-sided amplitude
    pub power: f64,
}

impl From<SpectralBin> for DominantCycle {
    fn from(bin: SpectralBin) -> Self {
        Self {
            period_days: bin.period_days,
            frequency: bin.frequency,
            power: bin.power,
        }
    }
}

/// Dominant cycles plus the filtered spectrum they were ranked from
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpectralResult {
    /// Strongest bins, power non-increasing
    pub dominant_cycles: Vec<DominantCycle>,
    /// Every surviving bin in ascending frequency
    pub spectrum: Vec<SpectralBin>,
}

/// Forward FFT of `data` reduced to the one-sided amplitude spectrum.
///
/// Frequencies assume unit sample spacing (one observation per day).
pub fn amplitude_spectrum(data: &[f64]) -> CycleResult<AmplitudeSpectrum> {
    validate_data_length(data, 2, "amplitude spectrum")?;
    validate_all_finite(data, "spectrum input")?;

    let n = data.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = data.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let half = n / 2;
    let step = 1.0 / n as f64;
    let scale = 2.0 / n as f64;

    let frequencies = (0..half).map(|i| i as f64 * step).collect();
    let powers = buffer[..half].iter().map(|c| scale * c.norm()).collect();

    Ok(AmplitudeSpectrum {
        frequencies,
        powers,
    })
}

/// Keep the `count` strongest bins; equal powers keep ascending frequency.
pub fn rank_bins(bins: &[SpectralBin], count: usize) -> Vec<DominantCycle> {
    let mut ranked = bins.to_vec();
    // Stable sort preserves frequency order among ties
    ranked.sort_by(|a, b| b.power.total_cmp(&a.power));
    ranked.into_iter().take(count).map(DominantCycle::from).collect()
}

/// Dominant cycles of a fractional return series.
///
/// # Errors
/// - `InsufficientData` with fewer than four returns or when no bin has a
///   period within `max_cycle_period_days`
/// - `NumericDegenerate` when every surviving bin has zero power
pub fn analyze_spectrum(returns: &[f64], config: &AnalysisConfig) -> CycleResult<SpectralResult> {
    validate_data_length(returns, MIN_SPECTRAL_OBSERVATIONS, "spectral analysis")?;

    let spectrum = amplitude_spectrum(returns)?;
    let min_frequency = 1.0 / config.max_cycle_period_days;

    let mut bins = Vec::new();
    for (&frequency, &power) in spectrum.frequencies.iter().zip(&spectrum.powers) {
        if frequency <= min_frequency {
            continue;
        }
        let period_days = float_ops::safe_div(1.0, frequency).ok_or_else(|| {
            CycleAnalysisError::degenerate(
                "period conversion",
                format!("frequency {} has no finite period", frequency),
            )
        })?;
        bins.push(SpectralBin {
            frequency,
            period_days,
            power,
        });
    }

    if bins.is_empty() {
        return Err(CycleAnalysisError::insufficient(
            "spectral analysis (bins shorter than the period horizon)",
            1,
            0,
        ));
    }
    let scale = float_ops::max_abs(returns);
    if bins.iter().all(|b| float_ops::is_negligible(b.power, scale)) {
        return Err(CycleAnalysisError::degenerate(
            "spectral analysis",
            "all frequency bins have zero power",
        ));
    }

    let dominant_cycles = rank_bins(&bins, config.dominant_cycle_count);

    log::debug!(
        "Dominant periods (days): {:?}",
        dominant_cycles
            .iter()
            .map(|c| c.period_days.round())
            .collect::<Vec<_>>()
    );

    Ok(SpectralResult {
        dominant_cycles,
        spectrum: bins,
    })
}
