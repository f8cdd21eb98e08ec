//! Text rendering for the console front end.
//!
//! The core returns a structured report; everything user-facing about it is
//! phrased here.

use openstring_core::{AnalysisReport, NoteLabel, TuningVerdict};

/// The detected peak frequency, shown at one decimal.
pub fn frequency_line(report: &AnalysisReport) -> String {
    format!("The peak frequency detected was {:.1} Hz", report.frequency)
}

/// The note and intonation verdict as one sentence.
pub fn verdict_line(report: &AnalysisReport) -> String {
    let note = match report.note {
        NoteLabel::Unidentified => "an unidentified note".to_string(),
        label => label.to_string(),
    };
    let status = match report.verdict {
        TuningVerdict::InTune => "you are in tune to within 20 cents!",
        TuningVerdict::Sharp => "you are sharp by more than 20 cents!",
        TuningVerdict::Flat => "you are flat by more than 20 cents!",
        TuningVerdict::Unidentified => "something went wrong! Please try again.",
    };
    format!("You played {note} and {status}")
}
