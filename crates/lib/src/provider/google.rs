//! Google GenAI adapter (`models/{model}:generateContent`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ProviderAdapter, ProviderError, read_success_body};
use crate::{
    Result,
    config::{Provider, ProviderConfig},
    tier::ModelTier,
    types::{GenerationRequest, Role},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let last = request.turns.len().saturating_sub(1);
    let contents = request
        .turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let mut parts = vec![Part::Text { text: &turn.text }];
            if i == last
                && turn.role == Role::User
                && let Some(image) = &request.image
            {
                parts.push(Part::InlineData {
                    inline_data: InlineData {
                        mime_type: &image.mime_type,
                        data: &image.data,
                    },
                });
            }
            Content {
                role: match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                },
                parts,
            }
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: request
            .system_instruction
            .as_deref()
            .map(|text| SystemInstruction {
                parts: vec![Part::Text { text }],
            }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type: request.json_mode.then_some("application/json"),
            thinking_config: request
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        },
    }
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse.into());
    }
    Ok(text)
}

/// Adapter for the Google GenAI REST API.
pub struct GoogleAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl GoogleAdapter {
    pub fn new(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn generate(&self, tier: &ModelTier, request: &GenerationRequest) -> Result<String> {
        let url = self
            .config
            .endpoint(&format!("v1beta/models/{}:generateContent", tier.model));
        tracing::debug!(provider = "google", model = %tier.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.credential.expose())
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body = read_success_body(response).await?;
        extract_text(&body)
    }
}
