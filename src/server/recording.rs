//! Timed recording sessions: while one runs, the tone of the latest sample is
//! captured at a fixed tick until the duration elapses or the session is stopped.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::state::GuardedSampleBuffer;
use crate::music::tone_for;

pub const DEFAULT_RECORDING_SECS: f64 = 20.0;
pub const MAX_RECORDING_SECS: f64 = 600.0;
pub const RECORDING_TICK: Duration = Duration::from_millis(100);

pub type GuardedRecording = Arc<Mutex<Recording>>;

#[derive(Debug, Error, PartialEq)]
pub enum RecordingError {
    #[error("Recording duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),
    #[error("Recording duration may not exceed 600 seconds, got {0}")]
    TooLong(f64),
}

/// Accepts a requested session length in seconds.
pub fn recording_duration(seconds: Option<f64>) -> Result<Duration, RecordingError> {
    let seconds = seconds.unwrap_or(DEFAULT_RECORDING_SECS);
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(RecordingError::InvalidDuration(seconds));
    }
    if seconds > MAX_RECORDING_SECS {
        return Err(RecordingError::TooLong(seconds));
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    #[default]
    Idle,
    Recording,
    Completed,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordedNote {
    /// Seconds since the session started.
    pub timestamp: f64,
    pub magnitude: f64,
    pub frequency: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordingSnapshot {
    pub status: RecordingStatus,
    pub duration: f64,
    pub notes: Vec<RecordedNote>,
}

#[derive(Debug, Default)]
pub struct Recording {
    status: RecordingStatus,
    duration: Duration,
    notes: Vec<RecordedNote>,
    session: u64,
    task: Option<JoinHandle<()>>,
}

impl Recording {
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn snapshot(&self) -> RecordingSnapshot {
        RecordingSnapshot {
            status: self.status,
            duration: self.duration.as_secs_f64(),
            notes: self.notes.clone(),
        }
    }

    /// Resets the notes and opens a new session, cancelling any running one.
    fn begin(&mut self, duration: Duration) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.session += 1;
        self.status = RecordingStatus::Recording;
        self.duration = duration;
        self.notes.clear();
        self.session
    }

    /// Ends the running session, keeping what was captured. Returns the note count.
    pub fn stop(&mut self) -> usize {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.status == RecordingStatus::Recording {
            self.status = RecordingStatus::Stopped;
            info!("Recording stopped with {} notes", self.notes.len());
        }
        self.notes.len()
    }

    fn is_current(&self, session: u64) -> bool {
        self.session == session && self.status == RecordingStatus::Recording
    }
}

/// Starts a new session in the background. Must be called from within a tokio runtime.
pub fn start_recording(
    recording: &GuardedRecording,
    buffer: GuardedSampleBuffer,
    duration: Duration,
) -> Result<(), RecordingPoisoned> {
    let mut guard = recording.lock().map_err(|_| RecordingPoisoned)?;
    let session = guard.begin(duration);
    info!(
        "Starting recording session {} for {:.1}s",
        session,
        duration.as_secs_f64()
    );
    let task = tokio::spawn(record(recording.clone(), buffer, session, duration));
    guard.task = Some(task);
    Ok(())
}

#[derive(Debug, Error)]
#[error("Recording state is unavailable")]
pub struct RecordingPoisoned;

async fn record(
    recording: GuardedRecording,
    buffer: GuardedSampleBuffer,
    session: u64,
    duration: Duration,
) {
    let started = Instant::now();
    let mut ticker = tokio::time::interval(RECORDING_TICK);
    // the first tick fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let elapsed = started.elapsed();
        if elapsed >= duration {
            break;
        }

        let magnitude = match buffer.lock() {
            Ok(buffer) => buffer.latest().map(|sample| sample.magnitude),
            Err(_) => {
                error!("Sample buffer lock is poisoned, ending recording {}", session);
                break;
            }
        };
        let Ok(mut guard) = recording.lock() else {
            error!("Recording lock is poisoned");
            return;
        };
        if !guard.is_current(session) {
            return;
        }
        if let Some(magnitude) = magnitude {
            let tone = tone_for(magnitude);
            guard.notes.push(RecordedNote {
                timestamp: elapsed.as_secs_f64(),
                magnitude,
                frequency: tone.frequency,
                volume: tone.volume,
            });
        }
    }

    if let Ok(mut guard) = recording.lock() {
        if guard.is_current(session) {
            guard.status = RecordingStatus::Completed;
            guard.task = None;
            info!(
                "Completed recording session {} with {} notes",
                session,
                guard.notes.len()
            );
        }
    }
}
