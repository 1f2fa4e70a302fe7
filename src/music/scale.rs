use serde::Serialize;

use super::mapping::{normalize_magnitude, MagnitudeBand};

/// C3.
pub const SCALE_ROOT: u8 = 48;
const SCALE_OCTAVES: usize = 2;
const OCTAVE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleKind {
    MinorPentatonic,
    Major,
    Mixolydian,
}

impl ScaleKind {
    pub fn for_band(band: MagnitudeBand) -> Self {
        match band {
            MagnitudeBand::Low => ScaleKind::MinorPentatonic,
            MagnitudeBand::Medium => ScaleKind::Major,
            MagnitudeBand::High => ScaleKind::Mixolydian,
        }
    }

    pub fn for_magnitude(magnitude: f64) -> Self {
        Self::for_band(MagnitudeBand::of(magnitude))
    }

    /// Semitone offsets of one octave, starting at the tonic.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
        }
    }

    /// Number of entries in the lookup table: two octaves plus the top tonic.
    pub fn table_len(&self) -> usize {
        self.intervals().len() * SCALE_OCTAVES + 1
    }

    /// Pitch of an arbitrary scale degree above the root. Degrees past the
    /// table wrap into higher octaves.
    pub fn pitch_at_degree(&self, degree: usize) -> u32 {
        let intervals = self.intervals();
        let octave = degree / intervals.len();
        let step = intervals[degree % intervals.len()] as usize;
        (SCALE_ROOT as usize + octave * OCTAVE + step) as u32
    }

    pub fn table(&self) -> Vec<u32> {
        (0..self.table_len()).map(|d| self.pitch_at_degree(d)).collect()
    }

    /// Table index selected by a magnitude.
    pub fn degree_for(&self, magnitude: f64) -> usize {
        let last = self.table_len() - 1;
        ((normalize_magnitude(magnitude) * last as f64).floor() as usize).min(last)
    }
}
