//! OpenAI-compatible chat-completions adapter, used with OpenRouter.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ProviderAdapter, ProviderError, read_success_body};
use crate::{
    Result,
    config::{Provider, ProviderConfig},
    tier::ModelTier,
    types::{GenerationRequest, Role},
};

const SITE_URL: &str = "https://scholarai.vercel.app";
const SITE_NAME: &str = "ScholarAI";
const TOP_P: f32 = 0.9;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Reasoning {
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<EmbeddedError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenRouter sometimes reports upstream failures inside a 200 body.
#[derive(Deserialize)]
struct EmbeddedError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

fn build_body<'a>(tier: &'a ModelTier, request: &'a GenerationRequest) -> ChatCompletionRequest<'a> {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    if let Some(system) = &request.system_instruction {
        messages.push(Message {
            role: "system",
            content: MessageContent::Text(system),
        });
    }

    let last = request.turns.len().saturating_sub(1);
    for (i, turn) in request.turns.iter().enumerate() {
        let content = match (&request.image, turn.role) {
            (Some(image), Role::User) if i == last => MessageContent::Parts(vec![
                ContentPart::Text { text: &turn.text },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
            _ => MessageContent::Text(&turn.text),
        };
        messages.push(Message {
            role: match turn.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content,
        });
    }

    ChatCompletionRequest {
        model: &tier.model,
        messages,
        temperature: request.temperature,
        top_p: TOP_P,
        response_format: request.json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
        reasoning: request
            .thinking_budget
            .map(|max_tokens| Reasoning { max_tokens }),
    }
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    if let Some(error) = parsed.error {
        let status = error
            .code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(ProviderError::from_status(status, &error.message).into());
    }

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse.into());
    }
    Ok(text)
}

/// Adapter for OpenRouter and other OpenAI-compatible endpoints.
pub struct OpenRouterAdapter {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenRouterAdapter {
    pub fn new(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }

    async fn generate(&self, tier: &ModelTier, request: &GenerationRequest) -> Result<String> {
        let url = self.config.endpoint("api/v1/chat/completions");
        tracing::debug!(provider = "openrouter", model = %tier.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.credential.expose())
            .header("HTTP-Referer", SITE_URL)
            .header("X-Title", SITE_NAME)
            .json(&build_body(tier, request))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body = read_success_body(response).await?;
        extract_text(&body)
    }
}
