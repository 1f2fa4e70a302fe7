//! Rule-based style post-processing of generated sequences.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::StylePostProcessor;
use super::sequence::{NoteEvent, NoteSequence, MAX_MIDI_PITCH, MIN_MIDI_PITCH};
use crate::motion::StatsSnapshot;

const MIN_STYLED_VELOCITY: i32 = 40;
const MAJOR_THIRD: u8 = 4;
const FIFTH: u8 = 7;
const AMBIENT_SUSTAIN: u32 = 4;
const AMBIENT_PAD_TAIL: u32 = 6;
const AMBIENT_VELOCITY_CENTER: f64 = 60.0;
const AMBIENT_VELOCITY_CAP: f64 = 100.0;
pub const MAX_PULSES_PER_NOTE: u32 = 16;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown style '{0}': expected default, jazz, electronic or ambient")]
pub struct UnknownStyle(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicStyle {
    #[default]
    Default,
    Jazz,
    Electronic,
    Ambient,
}

impl FromStr for MusicStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(MusicStyle::Default),
            "jazz" | "curious" => Ok(MusicStyle::Jazz),
            "electronic" | "upbeat" => Ok(MusicStyle::Electronic),
            "ambient" | "slow" => Ok(MusicStyle::Ambient),
            _ => Err(UnknownStyle(s.to_string())),
        }
    }
}

impl std::fmt::Display for MusicStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MusicStyle::Default => "default",
            MusicStyle::Jazz => "jazz",
            MusicStyle::Electronic => "electronic",
            MusicStyle::Ambient => "ambient",
        };
        f.write_str(name)
    }
}

fn softened(velocity: u8, by: i32) -> u8 {
    (velocity as i32 - by).max(MIN_STYLED_VELOCITY).min(velocity as i32) as u8
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedStyler;

impl StylePostProcessor for RuleBasedStyler {
    fn apply_style(
        &self,
        sequence: NoteSequence,
        style: MusicStyle,
        _stats: &StatsSnapshot,
    ) -> NoteSequence {
        let mut styled = match style {
            MusicStyle::Default => return sequence,
            MusicStyle::Jazz => jazz(sequence),
            MusicStyle::Electronic => electronic(sequence),
            MusicStyle::Ambient => ambient(sequence),
        };
        styled.sort();
        styled.total_quantized_steps = styled.total_quantized_steps.max(styled.last_end_step());
        styled
    }
}

/// Swing plus a major third above every third note.
///
/// Swing doubles the step resolution and pushes notes that started on an odd
/// step one fine step later.
pub fn jazz(mut sequence: NoteSequence) -> NoteSequence {
    sequence.steps_per_quarter = sequence.steps_per_quarter.saturating_mul(2);
    sequence.total_quantized_steps = sequence.total_quantized_steps.saturating_mul(2);
    for note in sequence.notes.iter_mut() {
        let delay = note.start_step % 2;
        note.start_step = note.start_step.saturating_mul(2).saturating_add(delay);
        note.end_step = note.end_step.saturating_mul(2).saturating_add(delay);
    }

    let original = sequence.notes.len();
    for i in (0..original).step_by(3) {
        if i + 1 >= original {
            break;
        }
        let note = sequence.notes[i];
        if note.pitch <= MAX_MIDI_PITCH - MAJOR_THIRD {
            sequence.notes.push(NoteEvent {
                pitch: note.pitch + MAJOR_THIRD,
                velocity: softened(note.velocity, 20),
                ..note
            });
        }
    }
    sequence
}

/// Breaks long notes into a repeated one-step pulse with decaying velocity.
///
/// A note yields at most [`MAX_PULSES_PER_NOTE`] pulses.
pub fn electronic(mut sequence: NoteSequence) -> NoteSequence {
    let mut pulses = Vec::new();
    for note in sequence.notes.iter_mut() {
        let duration = note.duration();
        if duration < 3 {
            continue;
        }
        for j in 1..duration.min(MAX_PULSES_PER_NOTE) {
            let start_step = note.start_step.saturating_add(j);
            pulses.push(NoteEvent {
                pitch: note.pitch,
                start_step,
                end_step: start_step.saturating_add(1),
                velocity: softened(note.velocity, 10i32.saturating_mul(j as i32)),
            });
        }
        note.end_step = note.start_step.saturating_add(1);
    }
    sequence.notes.extend(pulses);
    sequence
}

/// Long notes, a low fifth pad under every third note, and a narrow
/// velocity range.
pub fn ambient(mut sequence: NoteSequence) -> NoteSequence {
    for note in sequence.notes.iter_mut() {
        note.end_step = note.end_step.saturating_add(AMBIENT_SUSTAIN);
    }

    let original = sequence.notes.len();
    for i in (0..original).step_by(3) {
        let note = sequence.notes[i];
        if note.pitch >= MIN_MIDI_PITCH + FIFTH {
            sequence.notes.push(NoteEvent {
                pitch: note.pitch - FIFTH,
                start_step: note.start_step.saturating_add(2),
                end_step: note.end_step.saturating_add(AMBIENT_PAD_TAIL),
                velocity: softened(note.velocity, 30),
            });
        }
    }

    for note in sequence.notes.iter_mut() {
        let compressed =
            AMBIENT_VELOCITY_CENTER + (note.velocity as f64 - AMBIENT_VELOCITY_CENTER) * 0.5;
        note.velocity = compressed.min(AMBIENT_VELOCITY_CAP).round() as u8;
    }
    sequence
}
