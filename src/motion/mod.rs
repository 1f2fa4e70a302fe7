pub mod buffer;
pub mod pattern;
pub mod sample;
pub mod stats;
pub mod test_data;

pub use buffer::{SampleBuffer, DEFAULT_BUFFER_CAPACITY};
pub use pattern::{classify, PatternLabel, PatternReport, PatternThresholds, MIN_PATTERN_SAMPLES};
pub use sample::{magnitude, AccelSample, AxisSeries, SampleError, SampleInput};
pub use stats::{compute_stats, Dynamics, StatsSnapshot};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("No samples to analyze")]
    EmptyInput,
    #[error("Not enough data: {actual} samples, at least {required} required")]
    InsufficientData { required: usize, actual: usize },
}
