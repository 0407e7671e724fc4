//! Client for the ScholarAI backend, with a direct-call escape hatch.
//!
//! Every call goes to the backend first. If the backend cannot be reached
//! (transport failure, or a non-JSON 5xx page from a proxy), the client
//! loads the credential from the [`LocalStore`] and runs the same operation
//! against the provider itself.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    Clock, Error, Result, ScholarService, SystemClock,
    api::{ApiEnvelope, ApiRequest, Output},
    config::{ConfigError, ProviderConfig, RetryPolicy},
    local_store::LocalStore,
    provider::adapter_for,
    types::{ChatMessage, QuizQuestion, StudyPlanDetails},
};

/// Errors specific to the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The backend could not be reached, or a proxy answered for it.
    #[error("Backend unreachable: {reason}")]
    BackendUnreachable { reason: String },

    /// Fallback needed but no credential is stored locally.
    #[error(
        "The server is unreachable and no local API key is stored. Please enter your API key in settings to continue."
    )]
    MissingLocalCredential,

    /// The backend answered with an error body.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The backend answered with a result of the wrong shape for the call.
    #[error("Unexpected result from backend: expected {expected}")]
    UnexpectedResult { expected: &'static str },
}

impl ClientError {
    pub fn is_backend_unreachable(&self) -> bool {
        matches!(self, ClientError::BackendUnreachable { .. })
    }

    pub fn is_missing_local_credential(&self) -> bool {
        matches!(self, ClientError::MissingLocalCredential)
    }
}

/// Calls the backend and falls back to the provider directly.
#[derive(Debug, Clone)]
pub struct ScholarClient {
    http: reqwest::Client,
    endpoint: url::Url,
    store: LocalStore,
    direct_base_url: Option<String>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl ScholarClient {
    /// Client posting to `endpoint` (the full `/api/gemini` URL).
    pub fn new(endpoint: &str, store: LocalStore) -> Result<Self> {
        let endpoint = url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidBaseUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("scholarai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            store,
            direct_base_url: None,
            policy: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Provider base URL used by the escape hatch instead of the default.
    pub fn with_direct_base_url(mut self, url: impl Into<String>) -> Self {
        self.direct_base_url = Some(url.into());
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one operation, through the backend if possible.
    pub async fn call(&self, request: &ApiRequest) -> Result<Output> {
        match self.call_backend(request).await {
            Err(Error::Client(ClientError::BackendUnreachable { reason })) => {
                tracing::warn!(
                    operation = %request.operation(),
                    %reason,
                    "Backend unreachable, calling provider directly"
                );
                self.call_direct(request).await
            }
            other => other,
        }
    }

    async fn call_backend(&self, request: &ApiRequest) -> Result<Output> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::BackendUnreachable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::BackendUnreachable {
                reason: e.to_string(),
            })?;

        match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(ApiEnvelope::Success(success)) => Ok(success.result),
            Ok(ApiEnvelope::Failure(failure)) => Err(ClientError::Server {
                status: status.as_u16(),
                message: failure.error,
            }
            .into()),
            // A 4xx came from the backend itself.
            Err(_) if status.is_client_error() => Err(ClientError::Server {
                status: status.as_u16(),
                message: body.trim().to_string(),
            }
            .into()),
            Err(_) => Err(ClientError::BackendUnreachable {
                reason: format!("backend answered {status} without a JSON body"),
            }
            .into()),
        }
    }

    /// Run the operation against the provider with the locally stored credential.
    pub async fn call_direct(&self, request: &ApiRequest) -> Result<Output> {
        let local = self
            .store
            .credential()
            .await?
            .ok_or(ClientError::MissingLocalCredential)?;

        let mut config = ProviderConfig::new(local.provider, local.credential());
        if let Some(url) = &self.direct_base_url {
            config = config.with_base_url(url)?;
        }
        let adapter = adapter_for(&config)?;
        let service = ScholarService::new(adapter, config, self.policy, self.clock.clone());
        service.execute(request).await
    }

    async fn call_text(&self, request: ApiRequest) -> Result<String> {
        match self.call(&request).await? {
            Output::Text(text) => Ok(text),
            Output::Quiz(_) => Err(ClientError::UnexpectedResult { expected: "text" }.into()),
        }
    }

    pub async fn chat_with_coach(
        &self,
        history: &[ChatMessage],
        new_message: &str,
        user_context: &str,
    ) -> Result<String> {
        self.call_text(ApiRequest::Chat {
            history: history.to_vec(),
            new_message: new_message.to_string(),
            user_context: user_context.to_string(),
        })
        .await
    }

    pub async fn generate_notes(&self, topic: &str) -> Result<String> {
        self.call_text(ApiRequest::Notes {
            topic: topic.to_string(),
        })
        .await
    }

    pub async fn solve_doubt(&self, doubt: &str, image: Option<String>) -> Result<String> {
        self.call_text(ApiRequest::Doubt {
            doubt: doubt.to_string(),
            image,
        })
        .await
    }

    /// Quiz questions. A text result counts as an empty quiz.
    pub async fn generate_quiz(&self, topic: &str, difficulty: &str) -> Result<Vec<QuizQuestion>> {
        let output = self
            .call(&ApiRequest::Quiz {
                topic: topic.to_string(),
                difficulty: difficulty.to_string(),
            })
            .await?;
        Ok(output.into_quiz())
    }

    pub async fn career_advice(&self, profile: &str, query: &str) -> Result<String> {
        self.call_text(ApiRequest::Career {
            profile: profile.to_string(),
            query: query.to_string(),
        })
        .await
    }

    pub async fn study_plan(&self, details: &StudyPlanDetails) -> Result<String> {
        self.call_text(ApiRequest::Plan {
            details: details.clone(),
        })
        .await
    }
}
