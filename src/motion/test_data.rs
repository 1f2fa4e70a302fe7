//! Synthetic sample batches for exercising the pipeline without a device.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

use super::sample::AccelSample;

/// Matches the 20 Hz rate of the phone collector.
const SAMPLE_INTERVAL_MS: i64 = 50;
const OSCILLATION_PERIOD: f64 = 8.0;
const SPIKE_EVERY: usize = 10;
const SPIKE_HEIGHT: f64 = 0.6;

// Fixed unit direction used to split a magnitude over the three axes.
const DIRECTION: [f64; 3] = [0.2, 0.3, 0.932_737_905_308_881_5];

#[derive(Debug, Error, PartialEq)]
pub enum TestDataError {
    #[error("Invalid intensity '{0}': expected low, medium, high or a number")]
    InvalidIntensity(String),
    #[error("Target magnitude must be a finite non-negative number, got {0}")]
    InvalidMagnitude(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intensity {
    Low,
    Medium,
    High,
    Magnitude(f64),
}

impl Intensity {
    pub fn parse(value: &str) -> Result<Self, TestDataError> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => other
                .parse::<f64>()
                .map_err(|_| TestDataError::InvalidIntensity(value.to_string()))
                .and_then(Intensity::from_magnitude),
        }
    }

    pub fn from_magnitude(magnitude: f64) -> Result<Self, TestDataError> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(TestDataError::InvalidMagnitude(magnitude));
        }
        Ok(Intensity::Magnitude(magnitude))
    }

    pub fn target_magnitude(&self) -> f64 {
        match self {
            Intensity::Low => 0.75,
            Intensity::Medium => 1.25,
            Intensity::High => 1.75,
            Intensity::Magnitude(m) => *m,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestDataSettings {
    pub sample_count: usize,
    pub noise_std_dev: f64,
    /// Fixed seed for reproducible batches; random when absent.
    pub seed: Option<u64>,
}

impl Default for TestDataSettings {
    fn default() -> Self {
        Self {
            sample_count: 50,
            noise_std_dev: 0.05,
            seed: None,
        }
    }
}

/// Generates an oscillating batch centred on the target magnitude.
///
/// Higher targets get a wider swing, and targets in the high band also get a
/// periodic spike so the pattern detectors have something to find.
pub fn generate(intensity: Intensity, settings: &TestDataSettings) -> Vec<AccelSample> {
    let target = intensity.target_magnitude();
    let normalized = ((target - 0.5) / 1.5).clamp(0.0, 1.0);
    let amplitude = 0.15 + 0.25 * normalized;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let noise = Normal::new(0.0, settings.noise_std_dev.max(0.0)).ok();

    let start = Utc::now();
    (0..settings.sample_count)
        .map(|i| {
            let phase = i as f64 / OSCILLATION_PERIOD * std::f64::consts::TAU;
            let mut value = target + amplitude * phase.sin();
            if target >= 1.5 && i % SPIKE_EVERY == SPIKE_EVERY - 1 {
                value += SPIKE_HEIGHT;
            }
            if let Some(noise) = &noise {
                value += noise.sample(&mut rng);
            }
            let value = value.max(0.0);

            let timestamp = start + Duration::milliseconds(SAMPLE_INTERVAL_MS * i as i64);
            AccelSample::at(
                timestamp.to_rfc3339(),
                value * DIRECTION[0],
                value * DIRECTION[1],
                value * DIRECTION[2],
            )
        })
        .collect()
}
