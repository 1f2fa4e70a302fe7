use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use motion_music_server::analysis::{self, ProcessedData};
use motion_music_server::config::{AppConfig, CliConfig, FileConfig};
use motion_music_server::motion::SampleInput;
use motion_music_server::music::{
    MusicPipeline, MusicStyle, NoteSequence, RemoteSequenceGenerator, SequenceGenerator,
    Synthesizer, TracingSynthesizer,
};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path))
}

/// Analyzes a recorded window of motion data and prints the musical result.
#[derive(Parser, Debug)]
struct CliArgs {
    /// JSON file holding magnitudes, `{"magnitude": ..}` points, or `{"x", "y", "z"}` series.
    #[clap(value_parser = parse_path, required_unless_present = "magnitudes")]
    pub input: Option<PathBuf>,

    /// Comma separated magnitudes, used instead of an input file.
    #[clap(long, conflicts_with = "input")]
    pub magnitudes: Option<String>,

    /// Path to the server TOML configuration, for analysis and mapping settings.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Style applied to the composed sequence.
    #[clap(long, default_value = "default")]
    pub style: String,

    /// URL of the sequence generator service.
    #[clap(long)]
    pub generator_url: Option<String>,

    /// Compose a full sequence and play it, rather than only printing the analysis.
    #[clap(long)]
    pub play: bool,
}

fn parse_magnitudes(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .with_context(|| format!("Invalid magnitude '{}'", part))
        })
        .collect()
}

fn load_magnitudes(args: &CliArgs) -> Result<Vec<f64>> {
    let magnitudes = match (&args.magnitudes, &args.input) {
        (Some(list), _) => parse_magnitudes(list)?,
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {:?}", path))?;
            serde_json::from_str::<SampleInput>(&content)
                .with_context(|| format!("Unrecognized motion data in {:?}", path))?
                .into_magnitudes()
        }
        (None, None) => bail!("Either an input file or --magnitudes is required"),
    };
    if let Some(bad) = magnitudes.iter().find(|m| !m.is_finite()) {
        bail!("Magnitude {} is not a finite number", bad);
    }
    Ok(magnitudes)
}

fn resolve_config(args: &CliArgs) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        generator_url: args.generator_url.clone(),
        ..Default::default()
    };
    AppConfig::resolve(&cli_config, file_config)
}

/// Everything printed to stdout, as a single JSON document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SonifyOutput<'a> {
    processed_data: &'a ProcessedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<NoteSequence>,
}

async fn compose_and_play(
    config: &AppConfig,
    processed: &ProcessedData,
    style: MusicStyle,
) -> Result<NoteSequence> {
    let generator = match &config.generator_url {
        Some(url) => {
            let client = RemoteSequenceGenerator::new(
                url,
                Duration::from_secs(config.generator_timeout_sec),
            )?;
            Some(Arc::new(client) as Arc<dyn SequenceGenerator>)
        }
        None => None,
    };
    let pipeline = MusicPipeline::new(generator);

    let composition = pipeline
        .compose(
            &processed.seed_sequence,
            &processed.generation,
            &processed.stats.summary,
            style,
        )
        .await;
    if let Some(err) = &composition.error {
        warn!("Generator unavailable, using fallback sequence: {}", err);
    }

    TracingSynthesizer.play(&composition.sequence, &processed.stats.timbre);
    Ok(composition.sequence)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let style: MusicStyle = args.style.parse()?;
    let config = resolve_config(&args)?;
    let magnitudes = load_magnitudes(&args)?;
    info!("Analyzing {} samples", magnitudes.len());

    let processed = if args.play {
        analysis::process_for_music(&magnitudes, &config.analysis)?
    } else {
        analysis::process(&magnitudes, &config.analysis)?
    };

    let sequence = if args.play {
        Some(compose_and_play(&config, &processed, style).await?)
    } else {
        None
    };
    let output = SonifyOutput {
        processed_data: &processed,
        sequence,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
