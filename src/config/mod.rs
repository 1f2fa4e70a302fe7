mod file_config;

pub use file_config::{AnalysisConfig, FileConfig, MappingFileConfig, TestDataConfig};

use crate::analysis::AnalysisSettings;
use crate::motion::test_data::TestDataSettings;
use crate::motion::{PatternThresholds, DEFAULT_BUFFER_CAPACITY};
use crate::music::{MappingConfig, TempoRange};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub buffer_capacity: usize,
    pub generator_url: Option<String>,
    pub generator_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            generator_url: None,
            generator_timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub buffer_capacity: usize,
    pub generator_url: Option<String>,
    pub generator_timeout_sec: u64,

    // Feature configs (with defaults)
    pub analysis: AnalysisSettings,
    pub test_data: TestDataSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let buffer_capacity = file.buffer_capacity.unwrap_or(cli.buffer_capacity);
        if buffer_capacity == 0 {
            bail!("buffer_capacity must be greater than zero");
        }

        let generator_url = file
            .generator_url
            .or_else(|| cli.generator_url.clone())
            .filter(|url| !url.trim().is_empty());
        let generator_timeout_sec = file
            .generator_timeout_sec
            .unwrap_or(cli.generator_timeout_sec);

        let analysis = AnalysisSettings {
            thresholds: resolve_thresholds(file.analysis.unwrap_or_default())?,
            mapping: resolve_mapping(file.mapping.unwrap_or_default())?,
        };
        let test_data = resolve_test_data(file.test_data.unwrap_or_default())?;

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            buffer_capacity,
            generator_url,
            generator_timeout_sec,
            analysis,
            test_data,
        })
    }
}

fn resolve_thresholds(file: AnalysisConfig) -> Result<PatternThresholds> {
    let defaults = PatternThresholds::default();
    let thresholds = PatternThresholds {
        min_samples: file.min_samples.unwrap_or(defaults.min_samples),
        peak_threshold: file.peak_threshold.unwrap_or(defaults.peak_threshold),
        min_regular_peaks: file.min_regular_peaks.unwrap_or(defaults.min_regular_peaks),
        regularity_tolerance: file
            .regularity_tolerance
            .unwrap_or(defaults.regularity_tolerance),
        spike_jump: file.spike_jump.unwrap_or(defaults.spike_jump),
        spike_level: file.spike_level.unwrap_or(defaults.spike_level),
        min_spikes: file.min_spikes.unwrap_or(defaults.min_spikes),
        high_level: file.high_level.unwrap_or(defaults.high_level),
        sustained_high_run: file.sustained_high_run.unwrap_or(defaults.sustained_high_run),
        low_level: file.low_level.unwrap_or(defaults.low_level),
        sustained_low_run: file.sustained_low_run.unwrap_or(defaults.sustained_low_run),
    };

    for (name, value) in [
        ("peak_threshold", thresholds.peak_threshold),
        ("regularity_tolerance", thresholds.regularity_tolerance),
        ("spike_jump", thresholds.spike_jump),
        ("spike_level", thresholds.spike_level),
        ("high_level", thresholds.high_level),
        ("low_level", thresholds.low_level),
    ] {
        if !value.is_finite() || value <= 0.0 {
            bail!("analysis.{} must be a positive number, got {}", name, value);
        }
    }
    if thresholds.min_samples == 0 {
        bail!("analysis.min_samples must be greater than zero");
    }
    Ok(thresholds)
}

fn resolve_mapping(file: MappingFileConfig) -> Result<MappingConfig> {
    let defaults = MappingConfig::default();
    let tempo = TempoRange {
        min_bpm: file.tempo_min_bpm.unwrap_or(defaults.tempo.min_bpm),
        max_bpm: file.tempo_max_bpm.unwrap_or(defaults.tempo.max_bpm),
    };
    if !(tempo.min_bpm > 0.0 && tempo.min_bpm < tempo.max_bpm && tempo.max_bpm.is_finite()) {
        bail!(
            "Invalid tempo range: {} - {} BPM (min must be positive and below max)",
            tempo.min_bpm,
            tempo.max_bpm
        );
    }

    let seed_advance_ratio = file
        .seed_advance_ratio
        .unwrap_or(defaults.seed_advance_ratio);
    if !(seed_advance_ratio > 0.0 && seed_advance_ratio <= 1.0) {
        bail!(
            "mapping.seed_advance_ratio must be in (0, 1], got {}",
            seed_advance_ratio
        );
    }

    Ok(MappingConfig {
        tempo,
        seed_advance_ratio,
    })
}

fn resolve_test_data(file: TestDataConfig) -> Result<TestDataSettings> {
    let defaults = TestDataSettings::default();
    let settings = TestDataSettings {
        sample_count: file.sample_count.unwrap_or(defaults.sample_count),
        noise_std_dev: file.noise_std_dev.unwrap_or(defaults.noise_std_dev),
        seed: file.seed.or(defaults.seed),
    };
    if settings.sample_count == 0 {
        bail!("test_data.sample_count must be greater than zero");
    }
    if !settings.noise_std_dev.is_finite() || settings.noise_std_dev < 0.0 {
        bail!(
            "test_data.noise_std_dev must be non-negative, got {}",
            settings.noise_std_dev
        );
    }
    Ok(settings)
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
