use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use std::time::Duration;

use crate::motion::PatternLabel;

/// Metric name prefix for all motion music metrics
const PREFIX: &str = "motion_music";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Ingestion Metrics
    pub static ref SAMPLES_INGESTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_samples_ingested_total"), "Samples added to the buffer"),
        &["source"]
    ).expect("Failed to create samples_ingested_total metric");

    pub static ref SAMPLES_EVICTED_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_samples_evicted_total"),
        "Samples dropped from the full buffer"
    ).expect("Failed to create samples_evicted_total metric");

    pub static ref INGEST_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_ingest_errors_total"), "Rejected webhook payloads"),
        &["reason"]
    ).expect("Failed to create ingest_errors_total metric");

    pub static ref BUFFER_SAMPLES: Gauge = Gauge::new(
        format!("{PREFIX}_buffer_samples"),
        "Samples currently held in the buffer"
    ).expect("Failed to create buffer_samples metric");

    // Analysis Metrics
    pub static ref PATTERN_CLASSIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            format!("{PREFIX}_pattern_classifications_total"),
            "Pattern labels produced by analysis"
        ),
        &["label"]
    ).expect("Failed to create pattern_classifications_total metric");

    // Generation Metrics
    pub static ref GENERATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_generations_total"), "Composition requests by outcome"),
        &["outcome", "style"]
    ).expect("Failed to create generations_total metric");

    pub static ref GENERATION_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_generation_duration_seconds"),
            "Time spent composing a sequence"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]),
        &["outcome"]
    ).expect("Failed to create generation_duration_seconds metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(SAMPLES_INGESTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SAMPLES_EVICTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(INGEST_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BUFFER_SAMPLES.clone()));
    let _ = REGISTRY.register(Box::new(PATTERN_CLASSIFICATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GENERATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GENERATION_DURATION_SECONDS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record samples appended to (or replacing) the buffer
pub fn record_samples_ingested(source: &str, count: usize, evicted: usize) {
    SAMPLES_INGESTED_TOTAL
        .with_label_values(&[source])
        .inc_by(count as u64);
    SAMPLES_EVICTED_TOTAL.inc_by(evicted as u64);
}

pub fn record_ingest_error(reason: &str) {
    INGEST_ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn set_buffer_size(len: usize) {
    BUFFER_SAMPLES.set(len as f64);
}

pub fn record_pattern(label: PatternLabel) {
    PATTERN_CLASSIFICATIONS_TOTAL
        .with_label_values(&[label.as_str()])
        .inc();
}

/// Record a composition; `generated` is false when the fallback was used
pub fn record_generation(generated: bool, style: &str, duration: Duration) {
    let outcome = if generated { "generated" } else { "fallback" };
    GENERATIONS_TOTAL.with_label_values(&[outcome, style]).inc();
    GENERATION_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
