// openstring-core/src/lib.rs

//! The core logic for the open-string guitar tuner.
//! This crate turns one fixed-length buffer of microphone samples into a
//! pitch estimate and an open-string tuning verdict. It is completely
//! headless and contains no audio-device or GUI code.
//!
//! The pipeline is two components run strictly in sequence: the
//! [`pitch::PitchEstimator`] finds the dominant frequency of the buffer,
//! and the [`tuning::NoteClassifier`] matches that frequency against the
//! open-string anchors. [`Tuner`] wires the two together.

pub mod config;
pub mod fft;
pub mod pitch;
pub mod tuning;

pub use config::TunerConfig;
pub use pitch::{Estimate, EstimateError, PitchEstimator};
pub use tuning::{Classification, NoteClassifier, NoteLabel, TuningVerdict};

/// Represents the result of analyzing a single sample buffer.
///
/// Carries the answer itself plus the intermediate arrays, so a front end
/// can plot the raw signal and its spectrum without recomputing anything.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// The detected peak frequency in Hz.
    pub frequency: f32,
    /// The matched open-string pitch class, if any.
    pub note: NoteLabel,
    /// How the detected pitch relates to the matched note.
    pub verdict: TuningVerdict,
    /// Semitone offset below the nearest A, in [0, 12).
    pub cents: f32,
    /// Weighted magnitude spectrum of the buffer, one value per bin.
    pub spectrum: Vec<f32>,
    /// The raw samples the analysis ran on.
    pub samples: Vec<f32>,
}

/// The full analysis pipeline behind one configuration.
///
/// Holds no state across calls: analyzing the same buffer twice produces
/// the same report, and concurrent calls need no synchronization.
pub struct Tuner {
    estimator: PitchEstimator,
    classifier: NoteClassifier,
}

impl Tuner {
    pub fn new(config: TunerConfig) -> Self {
        Self {
            estimator: PitchEstimator::new(config.clone()),
            classifier: NoteClassifier::new(config),
        }
    }

    /// Runs estimation and classification on one buffer.
    ///
    /// An unidentified note is a successful analysis; only estimation
    /// failures surface as errors.
    pub fn analyze(&self, samples: &[f32]) -> Result<AnalysisReport, EstimateError> {
        let estimate = self.estimator.estimate(samples)?;
        let classification = self.classifier.classify(estimate.frequency);

        Ok(AnalysisReport {
            frequency: estimate.frequency,
            note: classification.note,
            verdict: classification.verdict,
            cents: classification.cents,
            spectrum: estimate.spectrum,
            samples: samples.to_vec(),
        })
    }
}
