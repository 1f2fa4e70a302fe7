//! Stand-in for the external sequence model service

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
struct GeneratorState {
    status: StatusCode,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Answers `POST /generate` with a fixed three note melody, or with a fixed
/// error status.
pub struct MockGenerator {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

async fn generate(
    State(state): State<GeneratorState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body);
    if !state.status.is_success() {
        return (state.status, Json(json!({ "error": "model unavailable" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "stepsPerQuarter": 4,
            "qpm": 100.0,
            "totalQuantizedSteps": 12,
            "notes": [
                {"pitch": 60, "quantizedStartStep": 0, "quantizedEndStep": 4, "velocity": 90},
                {"pitch": 64, "quantizedStartStep": 4, "quantizedEndStep": 8, "velocity": 90},
                // out of range, the pipeline must clamp it
                {"pitch": 120, "quantizedStartStep": 8, "quantizedEndStep": 12, "velocity": 90}
            ]
        })),
    )
}

impl MockGenerator {
    pub async fn spawn() -> Self {
        Self::spawn_with_status(StatusCode::OK).await
    }

    pub async fn spawn_with_status(status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/generate", post(generate))
            .with_state(GeneratorState {
                status,
                requests: requests.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock generator failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockGenerator {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
