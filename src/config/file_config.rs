use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub buffer_capacity: Option<usize>,
    pub generator_url: Option<String>,
    pub generator_timeout_sec: Option<u64>,

    // Feature configs
    pub analysis: Option<AnalysisConfig>,
    pub mapping: Option<MappingFileConfig>,
    pub test_data: Option<TestDataConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_samples: Option<usize>,
    pub peak_threshold: Option<f64>,
    pub min_regular_peaks: Option<usize>,
    pub regularity_tolerance: Option<f64>,
    pub spike_jump: Option<f64>,
    pub spike_level: Option<f64>,
    pub min_spikes: Option<usize>,
    pub high_level: Option<f64>,
    pub sustained_high_run: Option<usize>,
    pub low_level: Option<f64>,
    pub sustained_low_run: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MappingFileConfig {
    pub tempo_min_bpm: Option<f64>,
    pub tempo_max_bpm: Option<f64>,
    pub seed_advance_ratio: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TestDataConfig {
    pub sample_count: Option<usize>,
    pub noise_std_dev: Option<f64>,
    /// Fixed RNG seed, for reproducible demo batches.
    pub seed: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
