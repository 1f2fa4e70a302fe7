use anyhow::{Context, Result};
use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use super::metrics::{
    metrics_handler, record_generation, record_ingest_error, record_pattern,
    record_samples_ingested, set_buffer_size,
};
use super::recording::{recording_duration, start_recording, GuardedRecording, Recording};
use super::webhook::{self, IngestError};
use super::{log_requests, state::*, ServerConfig};
use crate::analysis::{self, ProcessedData};
use crate::config::AppConfig;
use crate::motion::test_data::{self, Intensity, TestDataError};
use crate::motion::{AccelSample, AnalysisError, AxisSeries, SampleBuffer};
use crate::music::{
    tone_for, GenerationPlan, MusicPipeline, MusicStyle, NoteSequence, RemoteSequenceGenerator,
    SequenceGenerator, TimbreParams, ToneNote,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct ServerStats {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime: String,
    pub samples: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataResponse {
    data: Vec<AccelSample>,
    count: usize,
    raw_data: Vec<f64>,
    #[serde(rename = "rawData3D")]
    raw_data_3d: AxisSeries,
    processed_data: Option<ProcessedData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestDataResponse {
    status: &'static str,
    target_magnitude: f64,
    count: usize,
    raw_data: Vec<f64>,
    #[serde(rename = "rawData3D")]
    raw_data_3d: AxisSeries,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MusicDataResponse {
    accelerometer_data: Vec<AccelSample>,
    processed_data: ProcessedData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    style: MusicStyle,
    generated: bool,
    sequence: NoteSequence,
    timbre: TimbreParams,
    plan: GenerationPlan,
    processed_data: ProcessedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TestDataQuery {
    pub intensity: Option<String>,
    pub magnitude: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateBody {
    pub style: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct PlayBody {
    /// Seconds.
    pub duration: Option<f64>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
        .into_response()
}

fn lock_buffer(buffer: &GuardedSampleBuffer) -> Result<MutexGuard<'_, SampleBuffer>, Response> {
    buffer.lock().map_err(|_| {
        error!("Sample buffer lock is poisoned");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Sample buffer is unavailable",
        )
    })
}

fn lock_recording(recording: &GuardedRecording) -> Result<MutexGuard<'_, Recording>, Response> {
    recording.lock().map_err(|_| {
        error!("Recording lock is poisoned");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Recording is unavailable")
    })
}

/// Parses an optional JSON body; an empty body is the default request.
fn parse_json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", err),
        )
    })
}

/// Runs the analysis and records the resulting pattern.
fn analyze(
    state: &ServerState,
    data: &[f64],
    require_pattern: bool,
) -> Result<ProcessedData, AnalysisError> {
    let settings = &state.config.analysis;
    let processed = if require_pattern {
        analysis::process_for_music(data, settings)?
    } else {
        analysis::process(data, settings)?
    };
    record_pattern(processed.pattern().label);
    Ok(processed)
}

async fn home(State(state): State<ServerState>) -> Response {
    let samples = match lock_buffer(&state.buffer) {
        Ok(buffer) => buffer.len(),
        Err(response) => return response,
    };
    Json(ServerStats {
        status: "running",
        version: VERSION,
        uptime: format_uptime(state.start_time.elapsed()),
        samples,
    })
    .into_response()
}

fn ingest_error(status: StatusCode, err: &IngestError, received: Value) -> Response {
    warn!("Rejected webhook payload: {}", err);
    record_ingest_error(err.reason());
    (
        status,
        Json(json!({
            "status": "error",
            "message": err.to_string(),
            "receivedData": received,
        })),
    )
        .into_response()
}

async fn post_webhook(State(state): State<ServerState>, body: Bytes) -> Response {
    let payload = match webhook::parse_body(&body) {
        Ok(payload) => payload,
        Err((err, echoed)) => return ingest_error(StatusCode::BAD_REQUEST, &err, echoed),
    };
    debug!("Webhook payload: {}", payload);

    let [x, y, z] = match webhook::extract_components(&payload) {
        Ok(components) => components,
        Err(err) => return ingest_error(StatusCode::BAD_REQUEST, &err, payload),
    };

    let sample = AccelSample::now(x, y, z);
    if !sample.magnitude.is_finite() {
        let err = IngestError::NonNumeric {
            name: "magnitude".to_string(),
            value: sample.magnitude.to_string(),
        };
        return ingest_error(StatusCode::BAD_REQUEST, &err, payload);
    }

    let evicted = match state.buffer.lock() {
        Ok(mut buffer) => {
            let evicted = buffer.push(sample.clone());
            set_buffer_size(buffer.len());
            evicted
        }
        Err(_) => {
            error!("Sample buffer lock is poisoned");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Sample buffer is unavailable",
                    "receivedData": payload,
                })),
            )
                .into_response();
        }
    };
    record_samples_ingested("webhook", 1, evicted);
    debug!("Stored data point with magnitude {:.3}", sample.magnitude);

    Json(json!({
        "status": "success",
        "message": "Data received and stored",
        "dataPoint": sample,
    }))
    .into_response()
}

async fn get_data(State(state): State<ServerState>) -> Response {
    let (data, raw_data, raw_data_3d) = match lock_buffer(&state.buffer) {
        Ok(buffer) => (buffer.snapshot(), buffer.magnitudes(), buffer.axes()),
        Err(response) => return response,
    };

    let processed_data = if raw_data.is_empty() {
        None
    } else {
        match analyze(&state, &raw_data, false) {
            Ok(processed) => Some(processed),
            Err(err) => {
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    };

    Json(DataResponse {
        count: data.len(),
        data,
        raw_data,
        raw_data_3d,
        processed_data,
    })
    .into_response()
}

async fn get_latest(State(buffer): State<GuardedSampleBuffer>) -> Response {
    match lock_buffer(&buffer) {
        Ok(buffer) => Json(json!({ "latest": buffer.latest() })).into_response(),
        Err(response) => response,
    }
}

fn requested_intensity(query: &TestDataQuery) -> Result<Intensity, TestDataError> {
    if let Some(magnitude) = &query.magnitude {
        let value = magnitude
            .trim()
            .parse::<f64>()
            .map_err(|_| TestDataError::InvalidIntensity(magnitude.clone()))?;
        return Intensity::from_magnitude(value);
    }
    match &query.intensity {
        Some(intensity) => Intensity::parse(intensity),
        None => Ok(Intensity::Medium),
    }
}

async fn get_test_data(
    State(config): State<ServerConfig>,
    State(buffer): State<GuardedSampleBuffer>,
    Query(query): Query<TestDataQuery>,
) -> Response {
    let intensity = match requested_intensity(&query) {
        Ok(intensity) => intensity,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let samples = test_data::generate(intensity, &config.test_data);
    let (raw_data, raw_data_3d) = match lock_buffer(&buffer) {
        Ok(mut buffer) => {
            buffer.replace(samples);
            set_buffer_size(buffer.len());
            (buffer.magnitudes(), buffer.axes())
        }
        Err(response) => return response,
    };
    record_samples_ingested("test_data", raw_data.len(), 0);
    info!(
        "Generated {} test samples around magnitude {}",
        raw_data.len(),
        intensity.target_magnitude()
    );

    Json(TestDataResponse {
        status: "success",
        target_magnitude: intensity.target_magnitude(),
        count: raw_data.len(),
        raw_data,
        raw_data_3d,
    })
    .into_response()
}

async fn get_music_data(State(state): State<ServerState>) -> Response {
    let (accelerometer_data, magnitudes) = match lock_buffer(&state.buffer) {
        Ok(buffer) => (buffer.snapshot(), buffer.magnitudes()),
        Err(response) => return response,
    };

    match analyze(&state, &magnitudes, true) {
        Ok(processed_data) => Json(MusicDataResponse {
            accelerometer_data,
            processed_data,
        })
        .into_response(),
        Err(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

async fn post_generate(State(state): State<ServerState>, body: Bytes) -> Response {
    let request: GenerateBody = match parse_json_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let style = match request.style.as_deref().map(str::parse::<MusicStyle>) {
        None => MusicStyle::Default,
        Some(Ok(style)) => style,
        Some(Err(err)) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let magnitudes = match lock_buffer(&state.buffer) {
        Ok(buffer) => buffer.magnitudes(),
        Err(response) => return response,
    };
    let processed_data = match analyze(&state, &magnitudes, true) {
        Ok(processed) => processed,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let start = Instant::now();
    let composition = state
        .pipeline
        .compose(
            &processed_data.seed_sequence,
            &processed_data.generation,
            &processed_data.stats.summary,
            style,
        )
        .await;
    record_generation(composition.generated, &style.to_string(), start.elapsed());

    Json(GenerateResponse {
        style,
        generated: composition.generated,
        sequence: composition.sequence,
        timbre: processed_data.stats.timbre,
        plan: processed_data.generation,
        processed_data,
        error: composition.error,
    })
    .into_response()
}

async fn post_clear(State(buffer): State<GuardedSampleBuffer>) -> Response {
    match lock_buffer(&buffer) {
        Ok(mut buffer) => {
            buffer.clear();
            set_buffer_size(0);
        }
        Err(response) => return response,
    }
    info!("Sample buffer cleared");
    Json(json!({ "status": "success", "message": "Data cleared", "count": 0 })).into_response()
}

async fn get_current_note(State(buffer): State<GuardedSampleBuffer>) -> Response {
    match lock_buffer(&buffer) {
        Ok(buffer) => Json(
            buffer
                .latest()
                .map(|sample| tone_for(sample.magnitude))
                .unwrap_or_else(ToneNote::silent),
        )
        .into_response(),
        Err(response) => response,
    }
}

async fn post_play(
    State(buffer): State<GuardedSampleBuffer>,
    State(recording): State<GuardedRecording>,
    body: Bytes,
) -> Response {
    let request: PlayBody = match parse_json_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let duration = match recording_duration(request.duration) {
        Ok(duration) => duration,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };
    if let Err(err) = start_recording(&recording, buffer, duration) {
        error!("Failed to start recording: {}", err);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }
    Json(json!({ "status": "started", "duration": duration.as_secs_f64() })).into_response()
}

async fn post_stop(State(recording): State<GuardedRecording>) -> Response {
    match lock_recording(&recording) {
        Ok(mut recording) => {
            let length = recording.stop();
            Json(json!({ "status": "stopped", "length": length })).into_response()
        }
        Err(response) => response,
    }
}

async fn get_recording(State(recording): State<GuardedRecording>) -> Response {
    match lock_recording(&recording) {
        Ok(recording) => Json(recording.snapshot()).into_response(),
        Err(response) => response,
    }
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router = Router::new()
        .route("/data", get(get_data))
        .route("/latest", get(get_latest))
        .route("/testData", get(get_test_data))
        .route("/musicData", get(get_music_data))
        .route("/generate", post(post_generate))
        .route("/clear", post(post_clear))
        .route("/current-note", get(get_current_note))
        .route("/play", post(post_play))
        .route("/stop", post(post_stop))
        .route("/recording", get(get_recording))
        .with_state(state.clone());

    let app: Router = Router::new()
        .route("/", get(home))
        .route("/webhook", post(post_webhook))
        .with_state(state.clone())
        .nest("/api", api_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Builds the composition pipeline, with a remote generator if one is configured.
pub fn make_pipeline(config: &AppConfig) -> Result<MusicPipeline> {
    let generator = match &config.generator_url {
        Some(url) => {
            info!("Sequence generator configured at {}", url);
            let client = RemoteSequenceGenerator::new(
                url,
                Duration::from_secs(config.generator_timeout_sec),
            )
            .context("Failed to create sequence generator client")?;
            Some(Arc::new(client) as Arc<dyn SequenceGenerator>)
        }
        None => {
            info!("No sequence generator configured, compositions use the fallback sequence");
            None
        }
    };
    Ok(MusicPipeline::new(generator))
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            buffer_capacity: config.buffer_capacity,
            analysis: config.analysis.clone(),
            test_data: config.test_data.clone(),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(config: &AppConfig) -> Result<()> {
    let state = ServerState::new(ServerConfig::from(config), make_pipeline(config)?);
    let app = make_app(state);

    let metrics_listener = TcpListener::bind(("0.0.0.0", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server failed: {}", e);
        }
    });

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::RequestsLoggingLevel;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for `oneshot`

    fn test_state() -> ServerState {
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            buffer_capacity: 20,
            ..Default::default()
        };
        ServerState::new(config, MusicPipeline::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn webhook_body(x: f64, y: f64, z: f64) -> String {
        json!({"values": [
            {"name": "accel_x", "value": x},
            {"name": "accel_y", "value": y},
            {"name": "accel_z", "value": z}
        ]})
        .to_string()
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn home_reports_version_and_samples() {
        let app = make_app(test_state());
        let (status, body) = send(&app, "GET", "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["samples"], 0);
    }

    #[tokio::test]
    async fn webhook_stores_data_point() {
        let state = test_state();
        let app = make_app(state.clone());

        let (status, body) = send(&app, "POST", "/webhook", &webhook_body(0.0, 0.6, 0.8)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert!((body["dataPoint"]["magnitude"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(state.buffer.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn webhook_rejects_bad_payloads() {
        let state = test_state();
        let app = make_app(state.clone());

        let (status, body) = send(&app, "POST", "/webhook", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["receivedData"], "not json");

        let partial = json!({"values": [{"name": "accel_x", "value": 1.0}]}).to_string();
        let (status, body) = send(&app, "POST", "/webhook", &partial).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Missing accelerometer components"));
        assert_eq!(body["receivedData"]["values"][0]["name"], "accel_x");

        assert!(state.buffer.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn buffer_keeps_newest_samples() {
        let state = test_state();
        let app = make_app(state.clone());
        for i in 0..25 {
            send(&app, "POST", "/webhook", &webhook_body(i as f64, 0.0, 0.0)).await;
        }
        let (_, body) = send(&app, "GET", "/api/data", "").await;
        assert_eq!(body["count"], 20);
        assert_eq!(body["rawData"][0], 5.0);
        assert_eq!(body["rawData3D"]["x"][19], 24.0);

        let (_, latest) = send(&app, "GET", "/api/latest", "").await;
        assert_eq!(latest["latest"]["x"], 24.0);
    }

    #[tokio::test]
    async fn empty_buffer_has_no_processed_data() {
        let app = make_app(test_state());
        let (status, body) = send(&app, "GET", "/api/data", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert!(body["processedData"].is_null());

        let (_, latest) = send(&app, "GET", "/api/latest", "").await;
        assert!(latest["latest"].is_null());
    }

    #[tokio::test]
    async fn music_endpoints_need_enough_samples() {
        let app = make_app(test_state());
        send(&app, "POST", "/webhook", &webhook_body(1.0, 0.0, 0.0)).await;

        let (status, body) = send(&app, "GET", "/api/musicData", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = send(&app, "POST", "/api/generate", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_data_validates_parameters() {
        let app = make_app(test_state());
        let (status, _) = send(&app, "GET", "/api/testData?intensity=loud", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "GET", "/api/testData?magnitude=-2", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "GET", "/api/testData?intensity=high", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targetMagnitude"], 1.75);
        // capped by the buffer capacity
        assert_eq!(body["count"], 20);
    }

    #[tokio::test]
    async fn generate_rejects_unknown_style() {
        let app = make_app(test_state());
        send(&app, "GET", "/api/testData?intensity=low", "").await;

        let (status, body) = send(&app, "POST", "/api/generate", r#"{"style":"polka"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("polka"));

        let (status, body) = send(&app, "POST", "/api/generate", r#"{"style":"slow"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["style"], "ambient");
        assert_eq!(body["generated"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn clear_empties_buffer() {
        let state = test_state();
        let app = make_app(state.clone());
        send(&app, "GET", "/api/testData", "").await;
        assert!(!state.buffer.lock().unwrap().is_empty());

        let (status, body) = send(&app, "POST", "/api/clear", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Data cleared");
        assert!(state.buffer.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn current_note_follows_latest_sample() {
        let app = make_app(test_state());
        let (status, body) = send(&app, "GET", "/api/current-note", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frequency"], 0.0);

        send(&app, "POST", "/webhook", &webhook_body(0.0, 0.0, 0.75)).await;
        let (_, body) = send(&app, "GET", "/api/current-note", "").await;
        assert_eq!(body["frequency"], 392.0);
        assert_eq!(body["magnitude"], 0.75);
        assert!((body["volume"].as_f64().unwrap() - 0.55).abs() < 1e-9);
    }

    #[tokio::test]
    async fn play_validates_duration() {
        let state = test_state();
        let app = make_app(state.clone());
        for body in [r#"{"duration":0}"#, r#"{"duration":-1}"#, r#"{"duration":900}"#, "[1"] {
            let (status, reply) = send(&app, "POST", "/api/play", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(reply["status"], "error");
        }
        let (_, recording) = send(&app, "GET", "/api/recording", "").await;
        assert_eq!(recording["status"], "idle");

        let (status, reply) = send(&app, "POST", "/api/play", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["duration"], 20.0);

        let (status, reply) = send(&app, "POST", "/api/stop", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["status"], "stopped");
        assert_eq!(reply["length"], 0);
        let (_, recording) = send(&app, "GET", "/api/recording", "").await;
        assert_eq!(recording["status"], "stopped");
        assert_eq!(recording["duration"], 20.0);
    }

    #[tokio::test]
    async fn metrics_app_serves_text() {
        crate::server::metrics::init_metrics();
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = make_metrics_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
