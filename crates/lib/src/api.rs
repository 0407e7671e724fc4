//! HTTP wire contract shared by the server and the client.
//!
//! Requests are a JSON object tagged by `endpoint`; responses are either
//! `{ "result": ... }` or `{ "error": "..." }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    prompts::Operation,
    service::ServiceError,
    types::{ChatMessage, QuizQuestion, StudyPlanDetails},
};

fn default_difficulty() -> String {
    "Medium".to_string()
}

/// A request to the `/api/gemini` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "endpoint", rename_all = "lowercase")]
pub enum ApiRequest {
    #[serde(rename_all = "camelCase")]
    Chat {
        #[serde(default)]
        history: Vec<ChatMessage>,
        new_message: String,
        #[serde(default)]
        user_context: String,
    },
    Notes {
        topic: String,
    },
    Doubt {
        doubt: String,
        /// Base64 image, optionally as a `data:` URL.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    Quiz {
        topic: String,
        #[serde(default = "default_difficulty")]
        difficulty: String,
    },
    Career {
        #[serde(default)]
        profile: String,
        query: String,
    },
    Plan {
        details: StudyPlanDetails,
    },
}

impl ApiRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ApiRequest::Chat { .. } => Operation::Chat,
            ApiRequest::Notes { .. } => Operation::Notes,
            ApiRequest::Doubt { .. } => Operation::Doubt,
            ApiRequest::Quiz { .. } => Operation::Quiz,
            ApiRequest::Career { .. } => Operation::Career,
            ApiRequest::Plan { .. } => Operation::Plan,
        }
    }

    /// Decode a raw request body, telling apart a missing body, an unknown
    /// endpoint and bad fields.
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ServiceError::MissingBody);
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ServiceError::InvalidRequest {
                reason: format!("body is not valid JSON: {e}"),
            }
        })?;

        let endpoint = value
            .get("endpoint")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !Operation::ALL.iter().any(|op| op.as_str() == endpoint) {
            return Err(ServiceError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| ServiceError::InvalidRequest {
            reason: e.to_string(),
        })
    }
}

/// What an operation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
    /// Markdown text.
    Text(String),
    /// Parsed quiz questions.
    Quiz(Vec<QuizQuestion>),
}

impl Output {
    /// Quiz questions; any non-quiz output counts as an empty quiz.
    pub fn into_quiz(self) -> Vec<QuizQuestion> {
        match self {
            Output::Quiz(questions) => questions,
            Output::Text(_) => Vec::new(),
        }
    }
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSuccess {
    pub result: Output,
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub error: String,
}

/// Either response body, as seen by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope {
    Success(ApiSuccess),
    Failure(ApiFailure),
}
