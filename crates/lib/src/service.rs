//! The tutoring service: prompts in, shaped answers out.
//!
//! `ScholarService` is constructed explicitly and shared by reference (axum
//! state on the server, a local value in the client escape hatch). It owns
//! no mutable state, so one instance serves any number of requests.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    Clock, Result, SystemClock,
    api::{ApiRequest, Output},
    config::{Provider, ProviderConfig, RetryPolicy},
    orchestrator::Orchestrator,
    prompts::{self, Operation},
    provider::{ProviderAdapter, adapter_for},
    quiz::parse_quiz,
    types::{ChatMessage, GenerationRequest, GenerationResult, ImagePayload, QuizQuestion, StudyPlanDetails},
};

/// Errors in the request a caller sent.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The HTTP body was empty.
    #[error("Missing request body")]
    MissingBody,

    /// The `endpoint` field names no known operation.
    #[error("Invalid endpoint")]
    InvalidEndpoint { endpoint: String },

    /// A field was missing, empty or malformed.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ServiceError {
    fn empty(field: &str) -> Self {
        ServiceError::InvalidRequest {
            reason: format!("'{field}' must not be empty"),
        }
    }
}

fn require(value: &str, field: &str) -> std::result::Result<(), ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::empty(field))
    } else {
        Ok(())
    }
}

/// Entry point for every tutoring operation.
#[derive(Clone)]
pub struct ScholarService {
    orchestrator: Orchestrator,
    clock: Arc<dyn Clock>,
}

impl ScholarService {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        config: ProviderConfig,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(adapter, config, policy, clock.clone()),
            clock,
        }
    }

    /// Service talking to the configured provider over HTTP, with real time.
    pub fn from_config(config: ProviderConfig, policy: RetryPolicy) -> Result<Self> {
        let adapter = adapter_for(&config)?;
        Ok(Self::new(adapter, config, policy, Arc::new(SystemClock)))
    }

    pub fn provider(&self) -> Provider {
        self.orchestrator.config().provider
    }

    pub fn config(&self) -> &ProviderConfig {
        self.orchestrator.config()
    }

    async fn generate(
        &self,
        operation: Operation,
        request: GenerationRequest,
    ) -> Result<GenerationResult> {
        tracing::info!(%operation, "Handling operation");
        self.orchestrator
            .run(operation.primary_tier(), &request)
            .await
    }

    /// Tutoring chat turn.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        new_message: &str,
        user_context: &str,
    ) -> Result<String> {
        require(new_message, "newMessage")?;
        let request = prompts::chat(history, new_message, user_context);
        Ok(self.generate(Operation::Chat, request).await?.text)
    }

    /// Exam-ready notes on a topic.
    pub async fn notes(&self, topic: &str) -> Result<String> {
        require(topic, "topic")?;
        Ok(self
            .generate(Operation::Notes, prompts::notes(topic))
            .await?
            .text)
    }

    /// Step-by-step solution, optionally reading an attached image.
    pub async fn doubt(&self, doubt: &str, image: Option<&str>) -> Result<String> {
        let image = image
            .filter(|data| !data.trim().is_empty())
            .map(ImagePayload::from_base64)
            .transpose()?;
        if image.is_none() {
            require(doubt, "doubt")?;
        }
        Ok(self
            .generate(Operation::Doubt, prompts::doubt(doubt, image))
            .await?
            .text)
    }

    /// Multiple-choice quiz. Unusable model output yields an empty list.
    pub async fn quiz(&self, topic: &str, difficulty: &str) -> Result<Vec<QuizQuestion>> {
        require(topic, "topic")?;
        let result = self
            .generate(Operation::Quiz, prompts::quiz(topic, difficulty))
            .await?;
        Ok(parse_quiz(&result.text))
    }

    /// Career guidance for a student profile.
    pub async fn career(&self, profile: &str, query: &str) -> Result<String> {
        require(query, "query")?;
        Ok(self
            .generate(Operation::Career, prompts::career(profile, query))
            .await?
            .text)
    }

    /// Weekly study timetable.
    pub async fn plan(&self, details: &StudyPlanDetails) -> Result<String> {
        require(&details.subjects, "details.subjects")?;
        let request = prompts::plan(details, self.clock.today());
        Ok(self.generate(Operation::Plan, request).await?.text)
    }

    /// Dispatch a wire request to its operation.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Output> {
        Ok(match request {
            ApiRequest::Chat {
                history,
                new_message,
                user_context,
            } => Output::Text(self.chat(history, new_message, user_context).await?),
            ApiRequest::Notes { topic } => Output::Text(self.notes(topic).await?),
            ApiRequest::Doubt { doubt, image } => {
                Output::Text(self.doubt(doubt, image.as_deref()).await?)
            }
            ApiRequest::Quiz { topic, difficulty } => {
                Output::Quiz(self.quiz(topic, difficulty).await?)
            }
            ApiRequest::Career { profile, query } => {
                Output::Text(self.career(profile, query).await?)
            }
            ApiRequest::Plan { details } => Output::Text(self.plan(details).await?),
        })
    }
}
