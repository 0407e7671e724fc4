//! Provider adapters.
//!
//! This module defines the trait every LLM wire format implements, so the
//! orchestrator can drive Google GenAI and OpenAI-compatible endpoints the
//! same way.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    Result,
    config::{ConfigError, Provider, ProviderConfig},
    tier::ModelTier,
    types::GenerationRequest,
};

pub mod google;
pub mod openrouter;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use google::GoogleAdapter;
pub use openrouter::OpenRouterAdapter;

/// Longest slice of a provider error body carried into messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors returned by an upstream provider call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Credential rejected (401/403).
    #[error("AI provider rejected the API key ({status}): {body}")]
    Auth { status: u16, body: String },

    /// Rate or quota exceeded (429).
    #[error("AI provider rate limit exceeded (429): {body}")]
    RateLimited { body: String },

    /// Provider overloaded (503).
    #[error("AI provider is overloaded (503): {body}")]
    Overloaded { body: String },

    /// Any other non-2xx status.
    #[error("AI provider error ({status}): {body}")]
    Http { status: u16, body: String },

    /// The request never completed at the network level.
    #[error("Failed to reach AI provider: {0}")]
    Transport(String),

    /// The provider answered with a body we could not decode.
    #[error("Malformed response from AI provider: {0}")]
    MalformedResponse(String),

    /// The provider answered successfully but produced no text.
    #[error("AI provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Classify a non-success status and its body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = truncate(body.trim(), ERROR_BODY_LIMIT);
        match status.as_u16() {
            401 | 403 => ProviderError::Auth {
                status: status.as_u16(),
                body,
            },
            429 => ProviderError::RateLimited { body },
            503 => ProviderError::Overloaded { body },
            code => ProviderError::Http { status: code, body },
        }
    }

    /// Rate limits and overloads are worth another attempt; nothing else is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Overloaded { .. }
        )
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ProviderError::Auth { .. })
    }

    /// HTTP status the provider answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Auth { status, .. } | ProviderError::Http { status, .. } => {
                Some(*status)
            }
            ProviderError::RateLimited { .. } => Some(429),
            ProviderError::Overloaded { .. } => Some(503),
            _ => None,
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Turn a provider response into its body text, or the classified error.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), "Provider returned an error");
        return Err(ProviderError::from_status(status, &body).into());
    }
    Ok(body)
}

/// Trait for LLM provider wire formats.
///
/// Each call makes exactly one outbound request; retries belong to the orchestrator.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Generate text with `tier`'s model.
    ///
    /// # Arguments
    /// * `tier` - The model tier to call; the request is already fitted to it
    /// * `request` - The provider-neutral request
    ///
    /// # Returns
    /// The generated text (a JSON document when `json_mode` was set).
    async fn generate(&self, tier: &ModelTier, request: &GenerationRequest) -> Result<String>;
}

/// Build the adapter matching the configured provider.
pub fn adapter_for(config: &ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("scholarai/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

    Ok(match config.provider {
        Provider::Google => Arc::new(GoogleAdapter::new(client, config.clone())),
        Provider::OpenRouter => Arc::new(OpenRouterAdapter::new(client, config.clone())),
    })
}
