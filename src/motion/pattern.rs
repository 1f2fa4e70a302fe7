//! Heuristic classification of the recent motion shape.
//!
//! The classifier is a pure decision table over a handful of boolean
//! detectors. Given the same samples and thresholds it always yields the
//! same label.

use serde::Serialize;

use super::stats::{self, DEFAULT_PEAK_THRESHOLD};

pub const MIN_PATTERN_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternLabel {
    Calm,
    Regular,
    Spiky,
    Energetic,
    SustainedHigh,
    Irregular,
    InsufficientData,
}

impl PatternLabel {
    pub const ALL: [PatternLabel; 7] = [
        PatternLabel::Calm,
        PatternLabel::Regular,
        PatternLabel::Spiky,
        PatternLabel::Energetic,
        PatternLabel::SustainedHigh,
        PatternLabel::Irregular,
        PatternLabel::InsufficientData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternLabel::Calm => "calm",
            PatternLabel::Regular => "regular",
            PatternLabel::Spiky => "spiky",
            PatternLabel::Energetic => "energetic",
            PatternLabel::SustainedHigh => "sustained-high",
            PatternLabel::Irregular => "irregular",
            PatternLabel::InsufficientData => "insufficient-data",
        }
    }
}

impl std::fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternThresholds {
    pub min_samples: usize,
    /// Peaks below this value are ignored.
    pub peak_threshold: f64,
    pub min_regular_peaks: usize,
    /// Allowed deviation of each peak interval, as a fraction of the mean interval.
    pub regularity_tolerance: f64,
    pub spike_jump: f64,
    pub spike_level: f64,
    pub min_spikes: usize,
    pub high_level: f64,
    pub sustained_high_run: usize,
    pub low_level: f64,
    pub sustained_low_run: usize,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            min_samples: MIN_PATTERN_SAMPLES,
            peak_threshold: DEFAULT_PEAK_THRESHOLD,
            min_regular_peaks: 3,
            regularity_tolerance: 0.25,
            spike_jump: 0.5,
            spike_level: 1.5,
            min_spikes: 2,
            high_level: 1.5,
            sustained_high_run: 4,
            low_level: 0.8,
            sustained_low_run: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    #[serde(rename = "type")]
    pub label: PatternLabel,
    pub is_regular: bool,
    pub has_sudden_spikes: bool,
    pub has_sustained_high: bool,
    pub has_sustained_low: bool,
}

impl PatternReport {
    fn insufficient() -> Self {
        PatternReport {
            label: PatternLabel::InsufficientData,
            is_regular: false,
            has_sudden_spikes: false,
            has_sustained_high: false,
            has_sustained_low: false,
        }
    }
}

pub fn classify(data: &[f64], thresholds: &PatternThresholds) -> PatternReport {
    if data.len() < thresholds.min_samples {
        return PatternReport::insufficient();
    }

    let is_regular = is_regular(data, thresholds);
    let has_sudden_spikes = has_sudden_spikes(data, thresholds);
    let has_sustained_high = has_sustained_high(data, thresholds);
    let has_sustained_low = has_sustained_low(data, thresholds);

    // Spike labels outrank regularity: alternating spikes are perfectly periodic
    // but should never be reported as a steady rhythm.
    let label = if has_sustained_low {
        PatternLabel::Calm
    } else if has_sudden_spikes && has_sustained_high {
        PatternLabel::Energetic
    } else if has_sudden_spikes {
        PatternLabel::Spiky
    } else if is_regular {
        PatternLabel::Regular
    } else if has_sustained_high {
        PatternLabel::SustainedHigh
    } else {
        PatternLabel::Irregular
    };

    PatternReport {
        label,
        is_regular,
        has_sudden_spikes,
        has_sustained_high,
        has_sustained_low,
    }
}

pub fn is_regular(data: &[f64], thresholds: &PatternThresholds) -> bool {
    let peaks = stats::peak_indices(data, thresholds.peak_threshold);
    if peaks.len() < thresholds.min_regular_peaks.max(2) {
        return false;
    }

    let intervals: Vec<f64> = peaks.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    let avg_interval = stats::mean(&intervals);
    intervals
        .iter()
        .all(|interval| (interval - avg_interval).abs() < thresholds.regularity_tolerance * avg_interval)
}

pub fn has_sudden_spikes(data: &[f64], thresholds: &PatternThresholds) -> bool {
    let spikes = data
        .windows(2)
        .filter(|w| w[1] > thresholds.spike_level && w[1] - w[0] > thresholds.spike_jump)
        .count();
    spikes >= thresholds.min_spikes
}

pub fn has_sustained_high(data: &[f64], thresholds: &PatternThresholds) -> bool {
    longest_run(data, |v| v > thresholds.high_level) >= thresholds.sustained_high_run
}

pub fn has_sustained_low(data: &[f64], thresholds: &PatternThresholds) -> bool {
    longest_run(data, |v| v < thresholds.low_level) >= thresholds.sustained_low_run
}

fn longest_run(data: &[f64], predicate: impl Fn(f64) -> bool) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for value in data {
        if predicate(*value) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_of(data: &[f64]) -> PatternLabel {
        classify(data, &PatternThresholds::default()).label
    }

    #[test]
    fn short_input_is_insufficient() {
        assert_eq!(label_of(&[1.0; 9]), PatternLabel::InsufficientData);
        assert_eq!(label_of(&[]), PatternLabel::InsufficientData);
    }

    #[test]
    fn constant_low_input_is_calm() {
        let report = classify(&[0.6; 10], &PatternThresholds::default());
        assert_eq!(report.label, PatternLabel::Calm);
        assert!(report.has_sustained_low);
        assert!(!report.is_regular);
    }

    #[test]
    fn alternating_extremes_are_spiky() {
        let data: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 0.5 } else { 1.9 }).collect();
        let report = classify(&data, &PatternThresholds::default());
        assert!(report.has_sudden_spikes);
        assert!(!report.has_sustained_high);
        assert!(report.is_regular);
        assert_eq!(report.label, PatternLabel::Spiky);
    }

    #[test]
    fn spikes_with_sustained_high_are_energetic() {
        let data = [1.0, 1.8, 1.0, 1.9, 1.9, 1.8, 1.7, 1.0, 1.0, 1.0];
        assert_eq!(label_of(&data), PatternLabel::Energetic);
    }

    #[test]
    fn periodic_peaks_are_regular() {
        // peaks of 1.3 every four samples, no large jumps
        let data = [
            1.0, 1.1, 1.3, 1.1, 1.0, 1.1, 1.3, 1.1, 1.0, 1.1, 1.3, 1.1, 1.0,
        ];
        let report = classify(&data, &PatternThresholds::default());
        assert!(report.is_regular);
        assert!(!report.has_sudden_spikes);
        assert_eq!(report.label, PatternLabel::Regular);
    }

    #[test]
    fn regular_outranks_sustained_high_without_spikes() {
        let data = [
            1.6, 1.7, 1.9, 1.7, 1.6, 1.7, 1.9, 1.7, 1.6, 1.7, 1.9, 1.7, 1.6,
        ];
        let report = classify(&data, &PatternThresholds::default());
        assert!(report.is_regular && report.has_sustained_high);
        assert!(!report.has_sudden_spikes && !report.has_sustained_low);
        assert_eq!(report.label, PatternLabel::Regular);
    }

    #[test]
    fn uneven_peaks_are_not_regular() {
        let data = [
            1.0, 1.3, 1.0, 1.0, 1.0, 1.0, 1.3, 1.0, 1.3, 1.0, 1.0, 1.0,
        ];
        assert!(!is_regular(&data, &PatternThresholds::default()));
        assert_eq!(label_of(&data), PatternLabel::Irregular);
    }

    #[test]
    fn sustained_high_without_spikes() {
        let data = [1.4, 1.6, 1.7, 1.8, 1.7, 1.6, 1.4, 1.2, 1.1, 1.0];
        assert_eq!(label_of(&data), PatternLabel::SustainedHigh);
    }

    #[test]
    fn calm_wins_over_everything() {
        let data = [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 1.9, 0.5, 1.9, 1.9, 1.9, 1.9];
        let report = classify(&data, &PatternThresholds::default());
        assert!(report.has_sustained_low && report.has_sudden_spikes && report.has_sustained_high);
        assert_eq!(report.label, PatternLabel::Calm);
    }

    #[test]
    fn classification_is_deterministic() {
        let data = [0.9, 1.4, 0.7, 1.8, 1.2, 0.6, 1.6, 1.7, 1.1, 0.8, 1.5];
        let first = classify(&data, &PatternThresholds::default());
        for _ in 0..5 {
            assert_eq!(classify(&data, &PatternThresholds::default()), first);
        }
        assert!(PatternLabel::ALL.contains(&first.label));
    }

    #[test]
    fn labels_serialize_in_kebab_case() {
        let json = serde_json::to_string(&PatternLabel::SustainedHigh).unwrap();
        assert_eq!(json, "\"sustained-high\"");
        for label in PatternLabel::ALL {
            assert_eq!(serde_json::to_string(&label).unwrap(), format!("\"{}\"", label));
        }
    }

    #[test]
    fn report_serializes_type_field() {
        let report = classify(&[0.6; 10], &PatternThresholds::default());
        let value = serde_json::to_value(report).unwrap();
        assert_eq!(value["type"], "calm");
        assert_eq!(value["hasSustainedLow"], true);
    }
}
