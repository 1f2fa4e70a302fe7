//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// POST /webhook with the sensor logger payload shape
    pub async fn send_sample(&self, [x, y, z]: [f64; 3]) -> Response {
        self.send_webhook(json!({
            "values": [
                {"name": "accel_x", "value": x},
                {"name": "accel_y", "value": y},
                {"name": "accel_z", "value": z}
            ]
        }))
        .await
    }

    /// POST /webhook with an arbitrary JSON payload
    pub async fn send_webhook(&self, payload: Value) -> Response {
        self.client
            .post(self.url("/webhook"))
            .json(&payload)
            .send()
            .await
            .expect("Webhook request failed")
    }

    /// POST /webhook with a raw body
    pub async fn send_raw_webhook(&self, body: &str) -> Response {
        self.client
            .post(self.url("/webhook"))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Webhook request failed")
    }

    // ========================================================================
    // Read Endpoints
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    /// GET /api/data
    pub async fn get_data(&self) -> Response {
        self.get("/api/data").await
    }

    /// GET /api/latest
    pub async fn get_latest(&self) -> Response {
        self.get("/api/latest").await
    }

    /// GET /api/musicData
    pub async fn get_music_data(&self) -> Response {
        self.get("/api/musicData").await
    }

    /// GET /api/testData?intensity=...
    pub async fn load_test_data(&self, intensity: &str) -> Response {
        self.get(&format!("/api/testData?intensity={}", intensity))
            .await
    }

    /// GET /api/testData?magnitude=...
    pub async fn load_test_data_magnitude(&self, magnitude: f64) -> Response {
        self.get(&format!("/api/testData?magnitude={}", magnitude))
            .await
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// POST /api/generate, optionally with a style
    pub async fn generate(&self, style: Option<&str>) -> Response {
        let request = self.client.post(self.url("/api/generate"));
        let request = match style {
            Some(style) => request.json(&json!({ "style": style })),
            None => request,
        };
        request.send().await.expect("Generate request failed")
    }

    /// POST /api/clear
    pub async fn clear(&self) -> Response {
        self.client
            .post(self.url("/api/clear"))
            .send()
            .await
            .expect("Clear request failed")
    }

    // ========================================================================
    // Tone Recording
    // ========================================================================

    /// GET /api/current-note
    pub async fn current_note(&self) -> Response {
        self.get("/api/current-note").await
    }

    /// POST /api/play, optionally with a duration in seconds
    pub async fn play(&self, duration: Option<f64>) -> Response {
        let request = self.client.post(self.url("/api/play"));
        let request = match duration {
            Some(duration) => request.json(&json!({ "duration": duration })),
            None => request,
        };
        request.send().await.expect("Play request failed")
    }

    /// POST /api/stop
    pub async fn stop(&self) -> Response {
        self.client
            .post(self.url("/api/stop"))
            .send()
            .await
            .expect("Stop request failed")
    }

    /// GET /api/recording
    pub async fn get_recording(&self) -> Response {
        self.get("/api/recording").await
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }
}
