//! Seams to the generative model, the style stage and the synthesizer, plus
//! the pipeline that ties them together.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::mapping::{GenerationMode, GenerationPlan, TimbreParams};
use super::sequence::{fallback_sequence, validate_sequence, NoteSequence};
use super::style::{MusicStyle, RuleBasedStyler};
use crate::motion::StatsSnapshot;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No sequence generator configured")]
    NotConfigured,
    #[error("Generator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Generator responded with status {0}")]
    Status(u16),
    #[error("Generator returned an empty sequence")]
    EmptySequence,
}

/// Extends a seed sequence. Implementations may call out to a model server.
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    async fn generate(
        &self,
        seed: &NoteSequence,
        plan: &GenerationPlan,
    ) -> Result<NoteSequence, GenerationError>;
}

pub trait StylePostProcessor: Send + Sync {
    fn apply_style(
        &self,
        sequence: NoteSequence,
        style: MusicStyle,
        stats: &StatsSnapshot,
    ) -> NoteSequence;
}

pub trait Synthesizer: Send + Sync {
    fn play(&self, sequence: &NoteSequence, timbre: &TimbreParams);
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    seed: &'a NoteSequence,
    mode: GenerationMode,
    steps: u32,
    temperature: f64,
}

/// HTTP client for an external sequence model service.
pub struct RemoteSequenceGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSequenceGenerator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SequenceGenerator for RemoteSequenceGenerator {
    async fn generate(
        &self,
        seed: &NoteSequence,
        plan: &GenerationPlan,
    ) -> Result<NoteSequence, GenerationError> {
        let url = format!("{}/generate", self.base_url);
        let body = GenerateRequest {
            seed,
            mode: plan.mode,
            steps: plan.steps,
            temperature: plan.temperature,
        };
        debug!("Requesting {} steps from {}", plan.steps, url);

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status().as_u16()));
        }

        let sequence: NoteSequence = response.json().await?;
        if sequence.notes.is_empty() {
            return Err(GenerationError::EmptySequence);
        }
        Ok(sequence)
    }
}

/// Sink that describes the performance in the log instead of rendering audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSynthesizer;

impl Synthesizer for TracingSynthesizer {
    fn play(&self, sequence: &NoteSequence, timbre: &TimbreParams) {
        info!(
            "Playing {} notes at {:.1} qpm with a {:?} oscillator",
            sequence.notes.len(),
            sequence.qpm,
            timbre.oscillator_type
        );
        let seconds_per_step =
            60.0 / sequence.qpm.max(1.0) / sequence.steps_per_quarter.max(1) as f64;
        for note in &sequence.notes {
            debug!(
                "  pitch {:>3} vel {:>3} at {:.3}s for {:.3}s",
                note.pitch,
                note.velocity,
                note.start_step as f64 * seconds_per_step,
                note.duration() as f64 * seconds_per_step + timbre.release
            );
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Composition {
    pub sequence: NoteSequence,
    /// True when the sequence came from the generator rather than the fallback.
    pub generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct MusicPipeline {
    generator: Option<Arc<dyn SequenceGenerator>>,
    styler: Arc<dyn StylePostProcessor>,
}

impl Default for MusicPipeline {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MusicPipeline {
    pub fn new(generator: Option<Arc<dyn SequenceGenerator>>) -> Self {
        Self {
            generator,
            styler: Arc::new(RuleBasedStyler),
        }
    }

    pub fn with_styler(mut self, styler: Arc<dyn StylePostProcessor>) -> Self {
        self.styler = styler;
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// seed -> generate -> validate -> style -> validate.
    ///
    /// A failing or missing generator never fails the composition: the
    /// fallback sequence is used and the reason is reported in `error`.
    pub async fn compose(
        &self,
        seed: &NoteSequence,
        plan: &GenerationPlan,
        stats: &StatsSnapshot,
        style: MusicStyle,
    ) -> Composition {
        let outcome = match &self.generator {
            Some(generator) => generator.generate(seed, plan).await,
            None => Err(GenerationError::NotConfigured),
        };

        let (mut sequence, generated, error) = match outcome {
            Ok(sequence) => (sequence, true, None),
            Err(err) => {
                warn!("Falling back to a local sequence: {}", err);
                let fallback = fallback_sequence(stats.average, seed.qpm, &mut rand::rng());
                (fallback, false, Some(err.to_string()))
            }
        };
        sequence.qpm = seed.qpm;

        validate_sequence(&mut sequence);
        let mut sequence = self.styler.apply_style(sequence, style, stats);
        validate_sequence(&mut sequence);

        info!(
            "Composed {} notes ({}, style {})",
            sequence.notes.len(),
            if generated { "generated" } else { "fallback" },
            style
        );

        Composition {
            sequence,
            generated,
            error,
        }
    }
}
