//! # Note Classification Module
//!
//! This module converts an estimated frequency into an open-string verdict.
//! The frequency is first mapped onto a semitone offset below the nearest A
//! (modulo one octave), then compared against the fixed anchors of the five
//! open-string pitch classes. Working modulo the octave makes the verdict
//! immune to octave errors in the estimate: any harmonic of a string maps
//! onto the same anchor.
//!
//! Only A, B, D, E and G are anchored. The remaining pitch classes fall in
//! the gaps between capture radii and classify as unidentified.

use crate::config::TunerConfig;

/// Pitch class of a matched reference note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLabel {
    A,
    B,
    D,
    E,
    G,
    /// No anchor lay within the match radius.
    Unidentified,
}

impl std::fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NoteLabel::A => "A",
            NoteLabel::B => "B",
            NoteLabel::D => "D",
            NoteLabel::E => "E",
            NoteLabel::G => "G",
            NoteLabel::Unidentified => "unidentified",
        };
        write!(f, "{name}")
    }
}

/// How the estimated pitch relates to the matched anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningVerdict {
    /// Within the in-tune threshold of the anchor.
    InTune,
    /// Above the anchor pitch.
    Sharp,
    /// Below the anchor pitch.
    Flat,
    /// No anchor matched at all.
    Unidentified,
}

/// One reference anchor on the semitone circle.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub label: NoteLabel,
    /// Distance below the reference A in semitones.
    pub offset: f32,
}

/// The reference anchors in the order they are consulted. A appears twice
/// so that offsets just under the octave wrap still read as A.
pub const ANCHORS: [Anchor; 6] = [
    Anchor { label: NoteLabel::A, offset: 0.0 },
    Anchor { label: NoteLabel::A, offset: 12.0 },
    Anchor { label: NoteLabel::B, offset: 10.0 },
    Anchor { label: NoteLabel::D, offset: 7.0 },
    Anchor { label: NoteLabel::E, offset: 5.0 },
    Anchor { label: NoteLabel::G, offset: 2.0 },
];

/// Result of classifying one frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub note: NoteLabel,
    pub verdict: TuningVerdict,
    /// Semitone offset below the nearest A, in [0, 12).
    pub cents: f32,
}

/// Matches frequency estimates against the open-string anchors.
///
/// Stateless apart from the configuration; every call is independent.
pub struct NoteClassifier {
    config: TunerConfig,
}

impl NoteClassifier {
    pub fn new(config: TunerConfig) -> Self {
        Self { config }
    }

    /// The frequency a given anchor corresponds to, one octave below the
    /// reference pitch at most. Inverts the offset formula used by
    /// `classify`.
    pub fn anchor_frequency(&self, anchor: &Anchor) -> f32 {
        self.config.reference_pitch / 2.0_f32.powf(anchor.offset / 12.0)
    }

    /// Classifies a frequency estimate against the anchors.
    ///
    /// The offset scale grows toward lower pitch, so a negative delta from
    /// an anchor means the estimate sits above it (sharp) and a positive
    /// delta below it (flat).
    ///
    /// The unison and octave A anchors are both always tested, the octave
    /// result replacing a unison hit. The remaining strings are consulted
    /// only when the octave anchor missed, first hit wins among them. A
    /// frequency no anchor captures is reported as unidentified, which is a
    /// valid outcome rather than an error.
    pub fn classify(&self, frequency: f32) -> Classification {
        let distance_from_a = 12.0 * (self.config.reference_pitch / frequency).log2();
        let cents = distance_from_a.rem_euclid(12.0);

        let mut matched = self.check_anchor(cents, &ANCHORS[0]);
        match self.check_anchor(cents, &ANCHORS[1]) {
            Some(hit) => matched = Some(hit),
            None => {
                for anchor in &ANCHORS[2..] {
                    if let Some(hit) = self.check_anchor(cents, anchor) {
                        matched = Some(hit);
                        break;
                    }
                }
            }
        }

        match matched {
            Some((note, verdict)) => Classification { note, verdict, cents },
            None => Classification {
                note: NoteLabel::Unidentified,
                verdict: TuningVerdict::Unidentified,
                cents,
            },
        }
    }

    fn check_anchor(&self, cents: f32, anchor: &Anchor) -> Option<(NoteLabel, TuningVerdict)> {
        let delta = cents - anchor.offset;
        if delta.abs() >= self.config.match_radius {
            return None;
        }
        let verdict = if delta.abs() < self.config.in_tune_threshold {
            TuningVerdict::InTune
        } else if delta < 0.0 {
            TuningVerdict::Sharp
        } else {
            TuningVerdict::Flat
        };
        Some((anchor.label, verdict))
    }
}
