use axum::extract::FromRef;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::motion::SampleBuffer;
use crate::music::MusicPipeline;

use super::recording::{GuardedRecording, Recording};
use super::ServerConfig;

pub type GuardedSampleBuffer = Arc<Mutex<SampleBuffer>>;
pub type GuardedMusicPipeline = Arc<MusicPipeline>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub buffer: GuardedSampleBuffer,
    pub pipeline: GuardedMusicPipeline,
    pub recording: GuardedRecording,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: MusicPipeline) -> Self {
        let buffer = SampleBuffer::new(config.buffer_capacity);
        Self {
            config,
            start_time: Instant::now(),
            buffer: Arc::new(Mutex::new(buffer)),
            pipeline: Arc::new(pipeline),
            recording: Arc::new(Mutex::new(Recording::default())),
        }
    }
}

impl FromRef<ServerState> for GuardedSampleBuffer {
    fn from_ref(input: &ServerState) -> Self {
        input.buffer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedRecording {
    fn from_ref(input: &ServerState) -> Self {
        input.recording.clone()
    }
}
