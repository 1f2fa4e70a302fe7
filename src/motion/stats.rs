//! Descriptive statistics over a window of magnitude samples.

use serde::Serialize;

use super::AnalysisError;

/// Peak threshold used by both the statistics and the pattern classifier.
pub const DEFAULT_PEAK_THRESHOLD: f64 = 1.0;

/// Minimum number of points for a meaningful trend.
pub const MIN_TREND_POINTS: usize = 5;

const TREND_SCALE: f64 = 10.0;
const INTENSITY_SCALE: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
    pub variability: f64,
    pub peak_count: usize,
    pub trend_direction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamics {
    pub variability: f64,
    pub trend_direction: f64,
    pub peak_count: usize,
    /// Normalized in [0, 1].
    pub intensity: f64,
}

impl StatsSnapshot {
    pub fn dynamics(&self) -> Dynamics {
        Dynamics {
            variability: self.variability,
            trend_direction: self.trend_direction,
            peak_count: self.peak_count,
            intensity: (self.variability * INTENSITY_SCALE).min(1.0),
        }
    }
}

pub fn compute_stats(data: &[f64], peak_threshold: f64) -> Result<StatsSnapshot, AnalysisError> {
    if data.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let (minimum, maximum) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });

    Ok(StatsSnapshot {
        average: mean(data).clamp(minimum, maximum),
        maximum,
        minimum,
        variability: variability(data),
        peak_count: count_peaks(data, peak_threshold),
        trend_direction: trend_direction(data),
    })
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation. Exactly zero when every sample is equal.
pub fn variability(data: &[f64]) -> f64 {
    let Some(first) = data.first() else {
        return 0.0;
    };
    if data.iter().all(|v| v == first) {
        return 0.0;
    }
    let avg = mean(data);
    let variance = data.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Least-squares slope of value against index, scaled and clamped to [-1, 1].
pub fn trend_direction(data: &[f64]) -> f64 {
    if data.len() < MIN_TREND_POINTS {
        return 0.0;
    }

    let n = data.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in data.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    (slope * TREND_SCALE).clamp(-1.0, 1.0)
}

/// Interior indices strictly above both neighbours and above `threshold`.
pub fn peak_indices(data: &[f64], threshold: f64) -> Vec<usize> {
    data.windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2] && w[1] > threshold)
        .map(|(i, _)| i + 1)
        .collect()
}

pub fn count_peaks(data: &[f64], threshold: f64) -> usize {
    peak_indices(data, threshold).len()
}
