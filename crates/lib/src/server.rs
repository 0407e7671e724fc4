//! HTTP surface: the single JSON endpoint the frontend talks to.
//!
//! `POST /api/gemini` (aliased at `/api`) takes `{endpoint, ...fields}` and
//! answers `{result}` or `{error}`. CORS is permissive so a browser frontend
//! on any origin can call it.

use std::{future::Future, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    Error, ScholarService,
    api::{ApiFailure, ApiRequest, ApiSuccess},
    config::{ConfigError, Provider},
    provider::ProviderError,
};

/// Path of the operation endpoint.
pub const API_PATH: &str = "/api/gemini";

/// Largest accepted request body. Doubts carry base64 photos.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    provider: Provider,
    service: Option<Arc<ScholarService>>,
}

impl AppState {
    /// State backed by a configured service.
    pub fn new(service: ScholarService) -> Self {
        Self {
            provider: service.provider(),
            service: Some(Arc::new(service)),
        }
    }

    /// State for a server started without a credential: every operation fails
    /// with configuration guidance.
    pub fn unconfigured(provider: Provider) -> Self {
        Self {
            provider,
            service: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(API_PATH, api_routes())
        .route("/api", api_routes())
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> MethodRouter<AppState> {
    post(handle_api)
        .options(handle_preflight)
        .fallback(handle_method_not_allowed)
}

/// Serve `state` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// HTTP status for an error surfaced to the frontend.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Service(_) => StatusCode::BAD_REQUEST,
        Error::Provider(ProviderError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
        Error::Provider(ProviderError::Overloaded { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Provider(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiFailure {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Handler for POST /api/gemini - run one operation
async fn handle_api(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let Some(service) = state.service.as_ref() else {
        let err = ConfigError::missing_credential(state.provider);
        tracing::error!("{err}");
        return failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    };

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("Rejected body: {rejection}");
            return failure(rejection.status(), rejection.body_text());
        }
    };

    let request = match ApiRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!("Rejected request: {e}");
            return failure(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match service.execute(&request).await {
        Ok(result) => Json(ApiSuccess { result }).into_response(),
        Err(e) => {
            tracing::error!(operation = %request.operation(), module = e.module(), "Operation failed: {e}");
            failure(status_for(&e), e.to_string())
        }
    }
}

/// Handler for OPTIONS /api/gemini - bare preflight without CORS request headers
async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

async fn handle_method_not_allowed() -> Response {
    failure(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    provider: Provider,
    configured: bool,
}

/// Handler for GET /health - liveness and configuration summary
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        provider: state.provider,
        configured: state.is_configured(),
    })
}
