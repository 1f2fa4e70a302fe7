//! Quantized note sequences, seed construction and MIDI-safety checks.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::mapping::{clamp_magnitude, MIN_MAGNITUDE};
use super::scale::ScaleKind;
use crate::motion::{stats, PatternLabel};

pub const MIN_MIDI_PITCH: u8 = 21;
pub const MAX_MIDI_PITCH: u8 = 108;
pub const MAX_VELOCITY: u8 = 127;
/// C6. Seed notes never go above it, whatever the variation.
pub const MAX_SEED_PITCH: u8 = 84;
pub const DEFAULT_STEPS_PER_QUARTER: u32 = 4;
pub const DEFAULT_QPM: f64 = 120.0;
/// Upper bound on any note onset or end, in quantized steps.
pub const MAX_SEQUENCE_STEPS: u32 = 4096;
/// Longest span a single note may have.
pub const MAX_NOTE_STEPS: u32 = 64;
pub const MAX_SEQUENCE_NOTES: usize = 1024;
pub const MAX_STEPS_PER_QUARTER: u32 = 96;

/// At most this many notes are sampled from the input for the seed.
const SEED_NOTES: usize = 8;
const SPIKE_OCTAVE_LEVEL: f64 = 1.5;
const REGULAR_DEGREE_SHIFT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    #[serde(rename = "quantizedStartStep")]
    pub start_step: u32,
    #[serde(rename = "quantizedEndStep")]
    pub end_step: u32,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn duration(&self) -> u32 {
        self.end_step.saturating_sub(self.start_step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteSequence {
    pub steps_per_quarter: u32,
    pub qpm: f64,
    pub notes: Vec<NoteEvent>,
    pub total_quantized_steps: u32,
}

impl Default for NoteSequence {
    fn default() -> Self {
        Self {
            steps_per_quarter: DEFAULT_STEPS_PER_QUARTER,
            qpm: DEFAULT_QPM,
            notes: Vec::new(),
            total_quantized_steps: 0,
        }
    }
}

impl NoteSequence {
    pub fn new(qpm: f64) -> Self {
        Self {
            qpm,
            ..Default::default()
        }
    }

    pub fn push(&mut self, note: NoteEvent) {
        self.total_quantized_steps = self.total_quantized_steps.max(note.end_step);
        self.notes.push(note);
    }

    pub fn last_end_step(&self) -> u32 {
        self.notes.iter().map(|n| n.end_step).max().unwrap_or(0)
    }

    /// Orders notes by onset, then pitch.
    pub fn sort(&mut self) {
        self.notes
            .sort_by(|a, b| (a.start_step, a.pitch).cmp(&(b.start_step, b.pitch)));
    }
}

/// Note length in steps: quieter motion holds notes longer.
pub fn seed_duration(magnitude: f64) -> u32 {
    let m = clamp_magnitude(magnitude);
    ((4.0 - (m - MIN_MAGNITUDE) * 2.0).floor() as u32).max(1)
}

pub fn seed_velocity(magnitude: f64) -> u8 {
    let m = clamp_magnitude(magnitude);
    let velocity = 80.0 + ((m - MIN_MAGNITUDE) * 47.0 / 1.5).floor();
    velocity.clamp(0.0, MAX_VELOCITY as f64) as u8
}

/// Builds the seed that primes the generator.
///
/// Samples at most eight points from `data` at a fixed stride and maps each
/// one to a scale-quantized pitch, a duration and a velocity. The scale is
/// chosen once from the average magnitude of the whole window.
pub fn build_seed_sequence(
    data: &[f64],
    label: PatternLabel,
    qpm: f64,
    advance_ratio: f64,
) -> NoteSequence {
    let mut sequence = NoteSequence::new(qpm);
    if data.is_empty() {
        return sequence;
    }

    let scale = ScaleKind::for_magnitude(stats::mean(data));
    let stride = (data.len() / SEED_NOTES).max(1);
    let advance_ratio = if advance_ratio.is_finite() && advance_ratio > 0.0 {
        advance_ratio
    } else {
        1.0
    };

    let mut step = 0u32;
    for (ordinal, magnitude) in data.iter().step_by(stride).copied().enumerate() {
        let mut degree = scale.degree_for(magnitude);
        if label == PatternLabel::Regular && ordinal % 2 == 0 {
            degree += REGULAR_DEGREE_SHIFT;
        }
        let mut pitch = scale.pitch_at_degree(degree);
        if label == PatternLabel::Spiky && magnitude > SPIKE_OCTAVE_LEVEL {
            pitch += 12;
        }
        let pitch = pitch.min(MAX_SEED_PITCH as u32) as u8;

        let duration = seed_duration(magnitude);
        sequence.push(NoteEvent {
            pitch,
            start_step: step,
            end_step: step + duration,
            velocity: seed_velocity(magnitude),
        });

        let advance = (duration as f64 * advance_ratio).round() as u32;
        step += advance.max(1);
    }

    sequence
}

/// Forces every note into the MIDI-safe window and repairs empty or
/// inverted note spans. Returns how many notes were changed or dropped.
///
/// Step values are bounded as well: notes starting at or after
/// [`MAX_SEQUENCE_STEPS`] are dropped, spans are cut to [`MAX_NOTE_STEPS`]
/// and at most [`MAX_SEQUENCE_NOTES`] notes are kept, so the style
/// transforms can work on any generator output without overflowing.
pub fn validate_sequence(sequence: &mut NoteSequence) -> usize {
    let before = sequence.notes.len();
    sequence
        .notes
        .retain(|note| note.start_step < MAX_SEQUENCE_STEPS);
    sequence.notes.truncate(MAX_SEQUENCE_NOTES);
    let mut repaired = before - sequence.notes.len();

    for note in sequence.notes.iter_mut() {
        let original = *note;
        note.pitch = note.pitch.clamp(MIN_MIDI_PITCH, MAX_MIDI_PITCH);
        note.velocity = note.velocity.min(MAX_VELOCITY);
        let longest_end = (note.start_step + MAX_NOTE_STEPS).min(MAX_SEQUENCE_STEPS);
        if note.end_step <= note.start_step {
            note.end_step = note.start_step + 1;
        } else if note.end_step > longest_end {
            note.end_step = longest_end;
        }
        if *note != original {
            repaired += 1;
        }
    }
    sequence.steps_per_quarter = match sequence.steps_per_quarter {
        0 => DEFAULT_STEPS_PER_QUARTER,
        n => n.min(MAX_STEPS_PER_QUARTER),
    };
    sequence.total_quantized_steps = sequence
        .total_quantized_steps
        .min(MAX_SEQUENCE_STEPS)
        .max(sequence.last_end_step());

    if repaired > 0 {
        warn!("Repaired {} out-of-range notes", repaired);
    }
    repaired
}

/// Sequence used when no generator is available: an ascending run followed
/// by a few random notes between C3 and C5. Busier motion adds more notes.
pub fn fallback_sequence<R: Rng + ?Sized>(average: f64, qpm: f64, rng: &mut R) -> NoteSequence {
    let mut sequence = NoteSequence::new(qpm);
    for i in 0..8u32 {
        sequence.push(NoteEvent {
            pitch: (48 + i * 2) as u8,
            start_step: i * 4,
            end_step: i * 4 + 2,
            velocity: 80,
        });
    }

    let extra = if average > 1.2 { 12 } else { 7 };
    for i in 0..extra {
        let start = 32 + i * 2;
        sequence.push(NoteEvent {
            pitch: rng.random_range(48..72),
            start_step: start,
            end_step: start + 1,
            velocity: 70,
        });
    }
    sequence
}
