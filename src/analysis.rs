//! The combined report derived from a window of magnitudes: statistics,
//! pattern, and every musical parameter mapped from them.

use serde::Serialize;

use crate::motion::{
    classify, compute_stats, AnalysisError, Dynamics, PatternReport, PatternThresholds,
    StatsSnapshot,
};
use crate::music::mapping::{map_instrumentation, map_timbre, plan_generation};
use crate::music::{
    build_seed_sequence, GenerationPlan, Instrumentation, MappingConfig, NoteSequence, ScaleKind,
    TimbreParams,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSettings {
    pub thresholds: PatternThresholds,
    pub mapping: MappingConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicStats {
    #[serde(flatten)]
    pub summary: StatsSnapshot,
    /// BPM.
    pub tempo: f64,
    pub timbre: TimbreParams,
    pub dynamics: Dynamics,
    pub patterns: PatternReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub sample_count: usize,
    pub stats: MusicStats,
    pub instrument_complexity: Instrumentation,
    pub scale: ScaleKind,
    pub generation: GenerationPlan,
    pub seed_sequence: NoteSequence,
}

impl ProcessedData {
    pub fn pattern(&self) -> &PatternReport {
        &self.stats.patterns
    }
}

/// Runs the full analysis over any non-empty window.
///
/// Windows shorter than the classifier minimum still get statistics and
/// mappings; their pattern is reported as insufficient data.
pub fn process(data: &[f64], settings: &AnalysisSettings) -> Result<ProcessedData, AnalysisError> {
    let summary = compute_stats(data, settings.thresholds.peak_threshold)?;
    let patterns = classify(data, &settings.thresholds);
    let tempo = settings.mapping.tempo.map(summary.average);

    Ok(ProcessedData {
        sample_count: data.len(),
        stats: MusicStats {
            summary,
            tempo,
            timbre: map_timbre(summary.average),
            dynamics: summary.dynamics(),
            patterns,
        },
        instrument_complexity: map_instrumentation(summary.average),
        scale: ScaleKind::for_magnitude(summary.average),
        generation: plan_generation(summary.average, patterns.label),
        seed_sequence: build_seed_sequence(
            data,
            patterns.label,
            tempo,
            settings.mapping.seed_advance_ratio,
        ),
    })
}

/// Like [`process`], but refuses windows too short to classify.
pub fn process_for_music(
    data: &[f64],
    settings: &AnalysisSettings,
) -> Result<ProcessedData, AnalysisError> {
    let required = settings.thresholds.min_samples;
    if data.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: data.len(),
        });
    }
    process(data, settings)
}
