//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own sample buffer.

use super::constants::*;
use motion_music_server::motion::test_data::TestDataSettings;
use motion_music_server::music::{MusicPipeline, RemoteSequenceGenerator, SequenceGenerator};
use motion_music_server::server::server::make_app;
use motion_music_server::server::state::ServerState;
use motion_music_server::server::{RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance bound to a random local port
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Shared state, for inspecting the buffer directly
    pub state: ServerState,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server without a sequence generator
    pub async fn spawn() -> Self {
        Self::spawn_with_pipeline(MusicPipeline::default()).await
    }

    /// Spawns a server that composes through the generator at `generator_url`
    pub async fn spawn_with_generator(generator_url: &str) -> Self {
        let generator = RemoteSequenceGenerator::new(generator_url, Duration::from_secs(5))
            .expect("Failed to build generator client");
        let pipeline = MusicPipeline::new(Some(Arc::new(generator) as Arc<dyn SequenceGenerator>));
        Self::spawn_with_pipeline(pipeline).await
    }

    pub async fn spawn_with_pipeline(pipeline: MusicPipeline) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            buffer_capacity: TEST_BUFFER_CAPACITY,
            test_data: TestDataSettings {
                sample_count: TEST_DATA_SAMPLE_COUNT,
                seed: Some(TEST_DATA_SEED),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = ServerState::new(config, pipeline);
        let app = make_app(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Number of samples currently buffered
    pub fn buffered(&self) -> usize {
        self.state.buffer.lock().unwrap().len()
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
