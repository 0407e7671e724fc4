//!
//! ScholarAI: the request-routing core of an education assistant.
//! This library turns tutoring operations into prompts, sends them to a hosted
//! LLM provider with bounded retry and model-tier fallback, and shapes the
//! answers for the frontend.
//!
//! ## Core Concepts
//!
//! * **Operations (`prompts::Operation`)**: chat, notes, doubt, quiz, career and plan. Each maps to a fixed prompt template.
//! * **Providers (`provider::ProviderAdapter`)**: wire adapters for Google GenAI and OpenAI-compatible (OpenRouter) endpoints.
//! * **Tiers (`tier::ModelTier`)**: named model variants with an explicit capability descriptor.
//! * **Orchestrator (`orchestrator::Orchestrator`)**: retries rate-limited or overloaded calls with exponential backoff, downgrading tiers as it goes.
//! * **Service (`service::ScholarService`)**: the explicitly constructed entry point shared by the HTTP server and the client escape hatch.
//! * **Client (`client::ScholarClient`)**: calls the HTTP backend and falls back to a direct provider call using a locally stored credential.

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod local_store;
pub mod orchestrator;
pub mod prompts;
pub mod provider;
pub mod quiz;
pub mod server;
pub mod service;
pub mod session;
pub mod tier;
pub mod types;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use service::ScholarService;

/// Result type used throughout the ScholarAI library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the ScholarAI library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),

    /// Structured provider errors from the provider module
    #[error(transparent)]
    Provider(provider::ProviderError),

    /// Structured request validation errors from the service module
    #[error(transparent)]
    Service(service::ServiceError),

    /// Structured client errors from the client module
    #[error(transparent)]
    Client(client::ClientError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Provider(_) => "provider",
            Error::Service(_) => "service",
            Error::Client(_) => "client",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is worth another attempt (rate limited or overloaded).
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider(provider_err) => provider_err.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error means the server has no provider credential.
    pub fn is_missing_credential(&self) -> bool {
        match self {
            Error::Config(config_err) => config_err.is_missing_credential(),
            _ => false,
        }
    }

    /// Check if the caller sent a request that can never succeed as written.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// Check if the provider rejected the credential.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Provider(provider_err) => provider_err.is_auth_error(),
            _ => false,
        }
    }

    /// Check if this error came back from the upstream provider.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Error::Provider(_))
    }

    /// Check if the backend could not be reached and the escape hatch applies.
    pub fn is_backend_unreachable(&self) -> bool {
        match self {
            Error::Client(client_err) => client_err.is_backend_unreachable(),
            _ => false,
        }
    }

    /// Check if the escape hatch failed for lack of a locally stored credential.
    pub fn is_missing_local_credential(&self) -> bool {
        match self {
            Error::Client(client_err) => client_err.is_missing_local_credential(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

// Conversion implementations for structured errors
impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<provider::ProviderError> for Error {
    fn from(err: provider::ProviderError) -> Self {
        Error::Provider(err)
    }
}

impl From<service::ServiceError> for Error {
    fn from(err: service::ServiceError) -> Self {
        Error::Service(err)
    }
}

impl From<client::ClientError> for Error {
    fn from(err: client::ClientError) -> Self {
        Error::Client(err)
    }
}
