//! Accelerometer sample types and input normalization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("Axis series have different lengths (x: {x}, y: {y}, z: {z})")]
    MismatchedAxes { x: usize, y: usize, z: usize },
}

/// Combined intensity of a 3-axis acceleration reading.
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// A single stored accelerometer reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub timestamp: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub magnitude: f64,
}

impl AccelSample {
    /// Builds a sample stamped with the current UTC time.
    pub fn now(x: f64, y: f64, z: f64) -> Self {
        Self::at(chrono::Utc::now().to_rfc3339(), x, y, z)
    }

    pub fn at(timestamp: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        AccelSample {
            timestamp: timestamp.into(),
            x,
            y,
            z,
            magnitude: magnitude(x, y, z),
        }
    }
}

/// Three parallel per-axis series of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl AxisSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, SampleError> {
        if x.len() != y.len() || y.len() != z.len() {
            return Err(SampleError::MismatchedAxes {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(AxisSeries { x, y, z })
    }

    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a AccelSample>) -> Self {
        let mut series = AxisSeries::default();
        for sample in samples {
            series.x.push(sample.x);
            series.y.push(sample.y);
            series.z.push(sample.z);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| magnitude(*x, *y, *z))
            .collect()
    }
}

// Deserialized separately so that mismatched axis lengths are rejected
// at the boundary instead of being silently truncated.
#[derive(Debug, Deserialize)]
struct RawAxisSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl<'de> Deserialize<'de> for AxisSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawAxisSeries::deserialize(deserializer)?;
        AxisSeries::new(raw.x, raw.y, raw.z).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudePoint {
    pub magnitude: f64,
}

/// Every shape a batch of motion data has been submitted in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SampleInput {
    Magnitudes(Vec<f64>),
    Points(Vec<MagnitudePoint>),
    Axes(AxisSeries),
}

impl SampleInput {
    pub fn into_magnitudes(self) -> Vec<f64> {
        match self {
            SampleInput::Magnitudes(values) => values,
            SampleInput::Points(points) => points.into_iter().map(|p| p.magnitude).collect(),
            SampleInput::Axes(series) => series.magnitudes(),
        }
    }
}
