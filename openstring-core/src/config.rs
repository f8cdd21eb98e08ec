//! # Tuner Configuration
//!
//! Fixed analysis constants shared by the pitch estimator and the note
//! classifier. Both components are handed the same `TunerConfig` at
//! construction time, so the sample rate, buffer size and thresholds can
//! never drift apart between them. Nothing in here is negotiated at runtime.

/// Immutable configuration for one analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TunerConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,

    /// Number of samples per analysis buffer. Must be a power of 2 for the FFT.
    /// 2048 samples at 48 kHz is ~43 ms of audio.
    pub buffer_size: usize,

    /// Lower edge of the detectable band in Hz, around the lowest note
    /// a guitar can produce.
    pub min_frequency: f32,

    /// Upper edge of the detectable band in Hz, around the highest note
    /// a guitar can produce.
    pub max_frequency: f32,

    /// Concert pitch the semitone scale is anchored to (A4).
    pub reference_pitch: f32,

    /// Largest deviation, in semitones, still reported as in tune.
    pub in_tune_threshold: f32,

    /// Largest distance, in semitones, at which a reference note captures
    /// an estimate at all.
    pub match_radius: f32,
}

impl TunerConfig {
    /// Width of one FFT bin in Hz, i.e. the factor that converts a bin
    /// index into a frequency.
    pub fn bin_resolution(&self) -> f32 {
        self.sample_rate / self.buffer_size as f32
    }
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            buffer_size: 2048,
            min_frequency: 80.0,
            max_frequency: 1200.0,
            reference_pitch: 440.0,
            in_tune_threshold: 0.2,
            match_radius: 1.2,
        }
    }
}
