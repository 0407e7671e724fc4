use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use scholarai::{
    FixedClock, ScholarService,
    config::{Credential, Provider, ProviderConfig, RetryPolicy},
    provider::adapter_for,
    server::{AppState, router},
};
use serde_json::{Value, json};

/// A canned answer from the mock upstream.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(u16, Value),
    Html(u16, String),
}

/// A request the mock upstream received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Local HTTP server standing in for a provider API or a broken backend.
#[derive(Clone, Default)]
pub struct MockUpstream {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .fallback(mock_handler)
            .layer(DefaultBodyLimit::disable())
            .with_state(self.clone());
        let addr = spawn(app).await;
        format!("http://{addr}")
    }
}

async fn mock_handler(
    State(mock): State<MockUpstream>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let next = mock.responses.lock().unwrap().pop_front();
    match next {
        Some(MockResponse::Json(status, body)) => {
            (StatusCode::from_u16(status).unwrap(), Json(body)).into_response()
        }
        Some(MockResponse::Html(status, body)) => {
            (StatusCode::from_u16(status).unwrap(), Html(body)).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "mock script exhausted"}})),
        )
            .into_response(),
    }
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Successful Google `generateContent` body.
pub fn google_text(text: &str) -> MockResponse {
    MockResponse::Json(
        200,
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]}),
    )
}

/// Successful chat-completions body.
pub fn openrouter_text(text: &str) -> MockResponse {
    MockResponse::Json(
        200,
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]}),
    )
}

pub fn provider_error(code: u16, message: &str) -> MockResponse {
    MockResponse::Json(code, json!({"error": {"code": code, "message": message}}))
}

/// Config pointing `provider` at a mock base URL.
pub fn mock_config(provider: Provider, base_url: &str) -> ProviderConfig {
    ProviderConfig::new(provider, Credential::new("test-key"))
        .with_base_url(base_url)
        .unwrap()
}

/// Base64 JPEG of roughly `bytes` bytes, as a phone camera upload would be.
pub fn large_jpeg_base64(bytes: usize) -> String {
    format!("/9j/{}", "A".repeat(bytes.div_ceil(4) * 4))
}

/// Production attempt count and base delay; sleeps run on the `FixedClock`.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(1))
}

/// Service over a real HTTP adapter, with virtual time.
pub fn mock_service(config: ProviderConfig) -> (ScholarService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    let adapter = adapter_for(&config).unwrap();
    let service = ScholarService::new(adapter, config, fast_policy(), clock.clone());
    (service, clock)
}

/// Start the ScholarAI server and return its base URL.
pub async fn start_app(state: AppState) -> String {
    let addr = spawn(router(state)).await;
    format!("http://{addr}")
}

/// Start the ScholarAI server backed by `provider` at `upstream`.
pub async fn start_app_with(provider: Provider, upstream: &str) -> String {
    let (service, _) = mock_service(mock_config(provider, upstream));
    start_app(AppState::new(service)).await
}
