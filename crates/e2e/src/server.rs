//! Fixture server - intercepting the signup endpoint with canned responses

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// A canned response for one method + path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intercept {
    /// Name to look the request up by later
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_path")]
    pub path: String,
    pub status: u16,
    pub body: serde_json::Value,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_path() -> String {
    "/auth".to_string()
}

impl Intercept {
    pub fn signup(alias: impl Into<String>, status: u16, body: serde_json::Value) -> Self {
        Self {
            alias: Some(alias.into()),
            method: default_method(),
            path: default_path(),
            status,
            body,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method.as_str()) && self.path == path
    }
}

/// A request the server saw, with the status it answered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub alias: Option<String>,
    pub method: String,
    pub path: String,
    pub body: serde_json::Value,
    pub status: u16,
}

#[derive(Default)]
struct ServerState {
    intercepts: RwLock<Vec<Intercept>>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running fixture server
pub struct FixtureServer {
    base_url: String,
    port: u16,
    state: Arc<ServerState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FixtureServer {
    /// Bind and start serving, then wait until `/health` answers
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let addr = format!("{}:{}", config.host, config.port.unwrap_or(0));
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| E2eError::ServerStartup(format!("Failed to bind {}: {}", addr, e)))?;
        let port = listener.local_addr()?.port();
        let base_url = format!("http://{}:{}", config.host, port);

        info!("Spawning fixture server on port {}", port);

        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .route("/health", get(health))
            .fallback(intercepted)
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = served {
                warn!("Fixture server exited with error: {}", e);
            }
        });

        let server = FixtureServer {
            base_url,
            port,
            state,
            shutdown: Some(tx),
            task: Some(task),
        };

        server.wait_for_healthy(config.startup_timeout).await?;

        info!("Fixture server is healthy at {}", server.base_url);
        Ok(server)
    }

    /// Wait for the server to respond to health checks
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}/health", self.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    // Connection refused is expected while the listener spins up
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(50)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Register a canned response. Later intercepts win over earlier ones
    /// for the same method and path.
    pub fn intercept(&self, intercept: Intercept) {
        debug!(
            method = %intercept.method,
            path = %intercept.path,
            status = intercept.status,
            "Registering intercept"
        );
        self.state.intercepts.write().push(intercept);
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.recorded.lock().clone()
    }

    /// First request answered by the intercept with this alias
    pub fn request_for(&self, alias: &str) -> Option<RecordedRequest> {
        self.state
            .recorded
            .lock()
            .iter()
            .find(|r| r.alias.as_deref() == Some(alias))
            .cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state.recorded.lock().len()
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop the server and wait for it to finish
    pub async fn stop(mut self) {
        info!("Stopping fixture server on port {}", self.port);
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn intercepted(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let request_body = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice::<serde_json::Value>(&body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    let matched = state
        .intercepts
        .read()
        .iter()
        .rev()
        .find(|i| i.matches(&method, &path))
        .cloned();

    let (alias, status, response_body) = match matched {
        Some(intercept) => (intercept.alias, intercept.status, intercept.body),
        None => {
            warn!("No intercept for {} {}", method, path);
            (
                None,
                StatusCode::NOT_FOUND.as_u16(),
                serde_json::json!({ "message": format!("No fixture for {} {}", method, path) }),
            )
        }
    };

    state.recorded.lock().push(RecordedRequest {
        alias,
        method: method.to_string(),
        path,
        body: request_body,
        status,
    });

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response_body)).into_response()
}

/// Configuration for spawning a fixture server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on (None = any free port)
    pub port: Option<u16>,

    /// Timeout for server startup
    pub startup_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            startup_timeout: Duration::from_secs(10),
        }
    }
}
