//! # Pitch Estimation Module
//!
//! This module finds the dominant frequency of one analysis buffer from its
//! magnitude spectrum. The raw FFT bin spacing (~23 Hz at 48 kHz / 2048
//! samples) is far too coarse for tuning feedback, so the integer peak bin
//! is refined to a fractional position by fitting a quadratic through the
//! log magnitudes of the peak and its two neighbors and scanning the
//! interpolant for its maximum.
//!
//! ## Features
//! - Search restricted to the playable band of the instrument
//! - Log-magnitude interpolation, matching the ear's loudness response
//! - Sub-bin peak refinement to ~0.001 bin resolution
//! - Tagged errors for silent buffers and edge peaks, never a panic

use crate::config::TunerConfig;
use crate::fft::SpectrumAnalyzer;
use log::debug;
use thiserror::Error;

/// Number of evaluation points used when scanning the interpolant for its
/// maximum. Covers the two-bin span around the peak at well below 0.001 bin
/// spacing.
const INTERPOLATION_POINTS: usize = 10_000;

/// Failures of a single estimation call. Every failure is returned to the
/// caller as a value; estimation never retries internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    /// The restricted band held no bin with positive magnitude, e.g. the
    /// buffer was silent. The caller should prompt for a new recording.
    #[error("no spectral peak inside the detectable frequency band")]
    NoPeakInRange,

    /// The peak sat on the edge of the spectrum, leaving no neighbor to
    /// interpolate against on one side.
    #[error("spectral peak has no interpolation neighbors")]
    InsufficientNeighbors,

    /// The buffer failed boundary validation before any analysis ran.
    #[error("invalid sample buffer: {0}")]
    InvalidBuffer(String),
}

/// Spectral peak estimate for one analysis buffer.
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Best-estimate frequency in Hz.
    pub frequency: f32,

    /// Refined peak location as a fractional bin index.
    pub peak_position: f32,

    /// The weighted magnitude spectrum the peak was found in, one value per
    /// bin. Exposed for visualization; classification does not need it.
    pub spectrum: Vec<f32>,
}

/// Estimates the dominant frequency of fixed-length sample buffers.
///
/// The estimator is pure: it holds only the configuration, the FFT plan and
/// the precomputed window, and two calls on the same buffer return the same
/// result.
pub struct PitchEstimator {
    config: TunerConfig,
    analyzer: SpectrumAnalyzer,
}

impl PitchEstimator {
    pub fn new(config: TunerConfig) -> Self {
        let analyzer = SpectrumAnalyzer::new(config.buffer_size);
        Self { config, analyzer }
    }

    /// Runs the full estimation pipeline on one buffer.
    ///
    /// # Arguments
    /// * `samples` - Normalized audio samples, exactly `buffer_size` of them
    ///
    /// # Returns
    /// * `Ok(Estimate)` - Refined peak frequency plus the spectrum it came from
    /// * `Err(EstimateError)` - Tagged failure, see the error type
    pub fn estimate(&self, samples: &[f32]) -> Result<Estimate, EstimateError> {
        validate_buffer(samples, self.config.buffer_size)?;

        let spectrum = self.analyzer.magnitudes(samples);
        let (band_start, band_end) = self.band_limits(spectrum.len())?;
        let peak_bin = peak_in_band(&spectrum, band_start, band_end)?;

        if peak_bin == 0 || peak_bin + 1 >= spectrum.len() {
            return Err(EstimateError::InsufficientNeighbors);
        }

        let peak_position = refine_peak(&spectrum, peak_bin)?;
        let frequency = peak_position * self.config.bin_resolution();
        debug!("peak bin {peak_bin} refined to {peak_position:.4} ({frequency:.1} Hz)");

        Ok(Estimate {
            frequency,
            peak_position,
            spectrum,
        })
    }

    /// Returns the half-open bin range to search for the peak.
    ///
    /// A bin is a candidate when its frequency lies strictly inside the
    /// configured band. The last candidate is used as the exclusive upper
    /// bound of the search, so the topmost in-band bin itself is not
    /// searched.
    fn band_limits(&self, spectrum_len: usize) -> Result<(usize, usize), EstimateError> {
        let resolution = self.config.bin_resolution();
        let mut in_band = (0..spectrum_len).filter(|&i| {
            let frequency = i as f32 * resolution;
            frequency > self.config.min_frequency && frequency < self.config.max_frequency
        });

        let first = in_band.next().ok_or(EstimateError::NoPeakInRange)?;
        let last = in_band.last().unwrap_or(first);
        Ok((first, last))
    }
}

fn validate_buffer(samples: &[f32], expected_len: usize) -> Result<(), EstimateError> {
    if samples.len() != expected_len {
        return Err(EstimateError::InvalidBuffer(format!(
            "expected {expected_len} samples, got {}",
            samples.len()
        )));
    }
    if samples.iter().any(|sample| !sample.is_finite()) {
        return Err(EstimateError::InvalidBuffer(
            "buffer contains non-finite samples".into(),
        ));
    }
    Ok(())
}

/// Finds the bin with the largest positive magnitude in `start..end`.
/// Ties keep the lowest index.
fn peak_in_band(spectrum: &[f32], start: usize, end: usize) -> Result<usize, EstimateError> {
    let mut peak_bin = None;
    let mut peak_value = 0.0_f32;
    for (offset, &magnitude) in spectrum[start..end].iter().enumerate() {
        if magnitude > peak_value {
            peak_value = magnitude;
            peak_bin = Some(start + offset);
        }
    }
    peak_bin.ok_or(EstimateError::NoPeakInRange)
}

/// Refines an integer peak bin to a fractional position.
///
/// Fits the unique quadratic through the log magnitudes at `peak_bin - 1`,
/// `peak_bin` and `peak_bin + 1`, evaluates it on a dense grid across that
/// two-bin span and returns the location of its maximum. Non-finite log
/// magnitudes mean the energy around the peak is unusable, which is
/// reported as `NoPeakInRange`.
fn refine_peak(spectrum: &[f32], peak_bin: usize) -> Result<f32, EstimateError> {
    let y0 = spectrum[peak_bin - 1].ln();
    let y1 = spectrum[peak_bin].ln();
    let y2 = spectrum[peak_bin + 1].ln();
    if !y0.is_finite() || !y1.is_finite() || !y2.is_finite() {
        return Err(EstimateError::NoPeakInRange);
    }

    // Quadratic p(t) = a*t^2 + b*t + c through (0, y0), (1, y1), (2, y2),
    // with t measured from peak_bin - 1.
    let a = (y0 - 2.0 * y1 + y2) / 2.0;
    let b = (-3.0 * y0 + 4.0 * y1 - y2) / 2.0;
    let c = y0;

    let mut best_t = 0.0_f32;
    let mut best_value = f32::NEG_INFINITY;
    for step in 0..INTERPOLATION_POINTS {
        let t = 2.0 * step as f32 / (INTERPOLATION_POINTS - 1) as f32;
        let value = (a * t + b) * t + c;
        if value > best_value {
            best_value = value;
            best_t = t;
        }
    }

    Ok((peak_bin - 1) as f32 + best_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(frequency: f32, config: &TunerConfig) -> Vec<f32> {
        (0..config.buffer_size)
            .map(|n| {
                (2.0 * std::f32::consts::PI * frequency * n as f32 / config.sample_rate).sin()
            })
            .collect()
    }

    #[test]
    fn silence_yields_no_peak() {
        let config = TunerConfig::default();
        let estimator = PitchEstimator::new(config.clone());
        let result = estimator.estimate(&vec![0.0; config.buffer_size]);
        assert_eq!(result.unwrap_err(), EstimateError::NoPeakInRange);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let estimator = PitchEstimator::new(TunerConfig::default());
        let result = estimator.estimate(&vec![0.0; 1024]);
        assert!(matches!(result, Err(EstimateError::InvalidBuffer(_))));
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let config = TunerConfig::default();
        let estimator = PitchEstimator::new(config.clone());
        let mut samples = sine(440.0, &config);
        samples[100] = f32::NAN;
        let result = estimator.estimate(&samples);
        assert!(matches!(result, Err(EstimateError::InvalidBuffer(_))));
    }

    #[test]
    fn edge_peak_has_no_neighbors() {
        // Widening the band below 0 Hz lets the DC bin win the peak search,
        // and bin 0 has no left neighbor to interpolate against.
        let config = TunerConfig {
            min_frequency: -1.0,
            ..TunerConfig::default()
        };
        let estimator = PitchEstimator::new(config.clone());
        let result = estimator.estimate(&vec![1.0; config.buffer_size]);
        assert_eq!(result.unwrap_err(), EstimateError::InsufficientNeighbors);
    }

    #[test]
    fn bin_centered_tone_is_recovered() {
        let config = TunerConfig::default();
        let estimator = PitchEstimator::new(config.clone());
        // Exactly on bin 19, so interpolation has nothing to correct.
        let frequency = 19.0 * config.bin_resolution();
        let estimate = estimator.estimate(&sine(frequency, &config)).unwrap();
        assert!((estimate.frequency - frequency).abs() < 0.5);
        assert_relative_eq!(estimate.peak_position, 19.0, epsilon = 0.02);
    }

    #[test]
    fn concert_pitch_lands_near_440() {
        let config = TunerConfig::default();
        let estimator = PitchEstimator::new(config.clone());
        let estimate = estimator.estimate(&sine(440.0, &config)).unwrap();
        // Off-bin tones carry a known interpolation bias of a few Hz, well
        // inside the in-tune window at this pitch.
        assert!((estimate.frequency - 440.0).abs() < 5.0);
    }

    #[test]
    fn estimation_is_idempotent() {
        let config = TunerConfig::default();
        let estimator = PitchEstimator::new(config.clone());
        let samples = sine(329.63, &config);
        let first = estimator.estimate(&samples).unwrap();
        let second = estimator.estimate(&samples).unwrap();
        assert_eq!(first.frequency, second.frequency);
        assert_eq!(first.spectrum, second.spectrum);
    }

    #[test]
    fn peak_ties_keep_the_lowest_bin() {
        let spectrum = [0.0, 3.0, 7.0, 7.0, 2.0];
        assert_eq!(peak_in_band(&spectrum, 0, 5).unwrap(), 2);
    }

    #[test]
    fn all_zero_band_has_no_peak() {
        let spectrum = [5.0, 0.0, 0.0, 0.0, 5.0];
        assert_eq!(
            peak_in_band(&spectrum, 1, 4).unwrap_err(),
            EstimateError::NoPeakInRange
        );
    }

    #[test]
    fn refinement_finds_the_parabola_vertex() {
        // Symmetric neighbors put the vertex exactly on the center bin.
        let spectrum = [1.0, 2.0, 8.0, 2.0, 1.0];
        let position = refine_peak(&spectrum, 2).unwrap();
        assert_relative_eq!(position, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn refinement_leans_toward_the_louder_neighbor() {
        let spectrum = [1.0, 2.0, 8.0, 6.0, 1.0];
        let position = refine_peak(&spectrum, 2).unwrap();
        assert!(position > 2.0 && position < 3.0);
    }

    #[test]
    fn zero_neighbor_reads_as_missing_energy() {
        let spectrum = [1.0, 0.0, 8.0, 2.0, 1.0];
        assert_eq!(
            refine_peak(&spectrum, 2).unwrap_err(),
            EstimateError::NoPeakInRange
        );
    }
}
