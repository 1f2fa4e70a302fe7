//! Single-tone preview of the latest motion sample: one C major scale degree
//! and a volume, both chosen by magnitude.

use serde::Serialize;

/// C4 to C5, in Hz.
pub const C_MAJOR_SCALE: [f64; 8] = [
    261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25,
];
pub const MIN_VOLUME: f64 = 0.1;
pub const MAX_VOLUME: f64 = 1.0;
/// Magnitudes at or above this reach the top of the scale.
pub const TONE_MAX_MAGNITUDE: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ToneNote {
    pub frequency: f64,
    pub volume: f64,
    pub magnitude: f64,
}

impl ToneNote {
    /// The silent note reported before any sample arrives.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_silent(&self) -> bool {
        self.frequency <= 0.0
    }
}

fn normalized(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        return 0.0;
    }
    magnitude.clamp(0.0, TONE_MAX_MAGNITUDE) / TONE_MAX_MAGNITUDE
}

pub fn tone_for(magnitude: f64) -> ToneNote {
    let norm = normalized(magnitude);
    let last = C_MAJOR_SCALE.len() - 1;
    let index = ((norm * C_MAJOR_SCALE.len() as f64) as usize).min(last);
    ToneNote {
        frequency: C_MAJOR_SCALE[index],
        volume: MIN_VOLUME + norm * (MAX_VOLUME - MIN_VOLUME),
        magnitude,
    }
}
