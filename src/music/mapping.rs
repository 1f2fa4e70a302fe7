//! Pure mappings from motion statistics to musical control parameters.
//!
//! Every mapping clamps its magnitude input into
//! [`MIN_MAGNITUDE`, `MAX_MAGNITUDE`] first, so downstream consumers always
//! see bounded values.

use serde::Serialize;

use crate::motion::PatternLabel;

pub const MIN_MAGNITUDE: f64 = 0.5;
pub const MAX_MAGNITUDE: f64 = 2.0;
const MAGNITUDE_SPAN: f64 = MAX_MAGNITUDE - MIN_MAGNITUDE;

const MEDIUM_BAND_START: f64 = 1.0;
const HIGH_BAND_START: f64 = 1.5;
const BAND_WIDTH: f64 = 0.5;

pub fn clamp_magnitude(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        return MIN_MAGNITUDE;
    }
    magnitude.clamp(MIN_MAGNITUDE, MAX_MAGNITUDE)
}

/// Position of the clamped magnitude inside the mapping domain, in [0, 1].
pub fn normalize_magnitude(magnitude: f64) -> f64 {
    (clamp_magnitude(magnitude) - MIN_MAGNITUDE) / MAGNITUDE_SPAN
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeBand {
    Low,
    Medium,
    High,
}

impl MagnitudeBand {
    pub fn of(magnitude: f64) -> Self {
        let m = clamp_magnitude(magnitude);
        if m < MEDIUM_BAND_START {
            MagnitudeBand::Low
        } else if m < HIGH_BAND_START {
            MagnitudeBand::Medium
        } else {
            MagnitudeBand::High
        }
    }

    fn start(&self) -> f64 {
        match self {
            MagnitudeBand::Low => MIN_MAGNITUDE,
            MagnitudeBand::Medium => MEDIUM_BAND_START,
            MagnitudeBand::High => HIGH_BAND_START,
        }
    }

    /// Position of the magnitude inside its band, in [0, 1].
    pub fn position(magnitude: f64) -> (Self, f64) {
        let m = clamp_magnitude(magnitude);
        let band = Self::of(m);
        let t = ((m - band.start()) / BAND_WIDTH).clamp(0.0, 1.0);
        (band, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoRange {
    pub min_bpm: f64,
    pub max_bpm: f64,
}

impl Default for TempoRange {
    fn default() -> Self {
        Self {
            min_bpm: 60.0,
            max_bpm: 160.0,
        }
    }
}

impl TempoRange {
    /// Linear map of the average magnitude onto the BPM range.
    pub fn map(&self, average: f64) -> f64 {
        lerp(self.min_bpm, self.max_bpm, normalize_magnitude(average))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    pub tempo: TempoRange,
    /// Fraction of a note's duration the seed sequence advances by.
    /// Values below 1 make consecutive seed notes overlap.
    pub seed_advance_ratio: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            tempo: TempoRange::default(),
            seed_advance_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorShape {
    Sine,
    Triangle,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum EffectSettings {
    Reverb {
        decay: f64,
        wet: f64,
    },
    Chorus {
        frequency: f64,
        delay_time: f64,
        depth: f64,
        wet: f64,
    },
    Distortion {
        amount: f64,
        highpass_cutoff: f64,
        wet: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimbreParams {
    pub oscillator_type: OscillatorShape,
    /// Seconds.
    pub attack: f64,
    /// Seconds.
    pub release: f64,
    /// Hz.
    pub filter_cutoff: f64,
    pub resonance: f64,
    pub effect: EffectSettings,
}

pub fn map_timbre(average: f64) -> TimbreParams {
    let (band, t) = MagnitudeBand::position(average);
    match band {
        MagnitudeBand::Low => TimbreParams {
            oscillator_type: OscillatorShape::Sine,
            attack: lerp(0.3, 0.2, t),
            release: lerp(2.0, 1.5, t),
            filter_cutoff: lerp(200.0, 500.0, t),
            resonance: 0.1,
            effect: EffectSettings::Reverb {
                decay: 6.0,
                wet: lerp(0.7, 0.5, t),
            },
        },
        MagnitudeBand::Medium => TimbreParams {
            oscillator_type: OscillatorShape::Triangle,
            attack: lerp(0.2, 0.125, t),
            release: lerp(1.5, 1.15, t),
            filter_cutoff: lerp(500.0, 1250.0, t),
            resonance: 0.3,
            effect: EffectSettings::Chorus {
                frequency: 4.0,
                delay_time: 2.5,
                depth: 0.5,
                wet: lerp(0.3, 0.5, t),
            },
        },
        MagnitudeBand::High => TimbreParams {
            oscillator_type: OscillatorShape::Square,
            attack: lerp(0.125, 0.05, t),
            release: lerp(1.15, 0.8, t),
            filter_cutoff: lerp(1250.0, 3000.0, t),
            resonance: 0.5,
            effect: EffectSettings::Distortion {
                amount: 0.4,
                highpass_cutoff: 2000.0,
                wet: lerp(0.2, 0.4, t),
            },
        },
    }
}

/// Instruments in the order they join the arrangement.
pub const INSTRUMENTS: [&str; 5] = ["piano", "bass", "drums", "strings", "brass"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrumentation {
    pub count: usize,
    pub instruments: Vec<&'static str>,
}

pub fn map_instrumentation(average: f64) -> Instrumentation {
    let raw = (1.0 + (clamp_magnitude(average) - MIN_MAGNITUDE) * 4.0).floor();
    let count = (raw as usize).clamp(1, INSTRUMENTS.len());
    Instrumentation {
        count,
        instruments: INSTRUMENTS[..count].to_vec(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// Extend the seed with a continuation model.
    Continuation,
    /// Encode the seed into a latent vector and decode a variation.
    EncodeDecode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationPlan {
    pub mode: GenerationMode,
    pub temperature: f64,
    pub steps: u32,
}

pub fn plan_generation(average: f64, label: PatternLabel) -> GenerationPlan {
    let t = normalize_magnitude(average);
    let temperature = lerp(0.8, 1.6, t);
    let steps = lerp(16.0, 48.0, t).floor() as u32;

    let (mode, temperature) = match label {
        PatternLabel::Regular => (GenerationMode::Continuation, temperature * 0.8),
        PatternLabel::Spiky => (GenerationMode::EncodeDecode, temperature * 1.2),
        _ => (GenerationMode::Continuation, temperature),
    };

    GenerationPlan {
        mode,
        temperature,
        steps,
    }
}
