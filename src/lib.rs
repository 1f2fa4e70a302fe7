//! Motion Music Server Library
//!
//! Turns accelerometer readings into musical parameters and note sequences.
//! This library exposes the internal modules for the binaries and tests.

pub mod analysis;
pub mod config;
pub mod motion;
pub mod music;
pub mod server;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisSettings, ProcessedData};
pub use motion::{AccelSample, PatternLabel, SampleBuffer, SampleInput};
pub use music::{MusicPipeline, MusicStyle, NoteSequence};
pub use server::{run_server, RequestsLoggingLevel};
