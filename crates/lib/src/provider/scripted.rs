//! In-process provider that replays a fixed script of outcomes.
//!
//! Used by tests to drive the orchestrator and service without a network.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ProviderAdapter, ProviderError};
use crate::{Result, config::Provider, tier::ModelTier, types::GenerationRequest};

enum Outcome {
    Text(String),
    Status(u16, String),
    Transport(String),
}

/// A call the scripted provider received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: GenerationRequest,
}

/// Provider that answers from a queue of canned outcomes.
pub struct ScriptedProvider {
    provider: Provider,
    script: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful answer.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Outcome::Text(text.into()));
        self
    }

    /// Queue an HTTP failure with the given status.
    pub fn then_status(self, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Outcome::Status(status, body.into()));
        self
    }

    /// Queue a network-level failure.
    pub fn then_transport_error(self, reason: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Outcome::Transport(reason.into()));
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, tier: &ModelTier, request: &GenerationRequest) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: tier.model.clone(),
            request: request.clone(),
        });

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Outcome::Text(text)) => Ok(text),
            Some(Outcome::Status(status, body)) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Err(ProviderError::from_status(status, &body).into())
            }
            Some(Outcome::Transport(reason)) => Err(ProviderError::Transport(reason).into()),
            None => Err(ProviderError::Http {
                status: 500,
                body: "script exhausted".to_string(),
            }
            .into()),
        }
    }
}
