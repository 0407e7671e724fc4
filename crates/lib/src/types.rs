//! Data model shared by the service, the HTTP surface and the client.
//!
//! Everything here is transient: messages and quizzes live in the caller's
//! session, generation requests are built per call and dropped afterwards.

use std::fmt;

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Provider;
use crate::service::ServiceError;

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a tutoring conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Milliseconds since Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

/// Number of options every quiz question carries.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// A multiple-choice question recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// True when the question has the expected option count and a valid answer index.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == QUIZ_OPTION_COUNT && self.correct_answer < self.options.len()
    }
}

/// Inputs to the study planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDetails {
    #[serde(default)]
    pub subjects: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub hours_per_day: String,
    #[serde(default)]
    pub exam_date: String,
    #[serde(default)]
    pub weak_areas: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Academic stream a student is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stream {
    Science,
    Commerce,
    Arts,
    General,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::Science => "Science",
            Stream::Commerce => "Commerce",
            Stream::Arts => "Arts",
            Stream::General => "General",
        };
        f.write_str(name)
    }
}

/// The student using the assistant. Held client-side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Stream>,
    #[serde(default)]
    pub competitive_exams: Vec<String>,
}

impl UserProfile {
    /// Context line handed to the tutoring coach.
    pub fn user_context(&self) -> String {
        let mut context = format!("Student: {}, {}", self.name, self.grade);
        if let Some(stream) = self.stream {
            context.push_str(&format!(" ({stream} stream)"));
        }
        if !self.competitive_exams.is_empty() {
            context.push_str(&format!(
                ". Preparing for: {}",
                self.competitive_exams.join(", ")
            ));
        }
        context
    }

    /// Profile summary used for career counselling.
    pub fn career_profile(&self) -> String {
        let stream = self
            .stream
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Undecided".to_string());
        let exams = if self.competitive_exams.is_empty() {
            "None".to_string()
        } else {
            self.competitive_exams.join(", ")
        };
        format!(
            "Grade: {}, Stream: {}, Target exams: {}",
            self.grade, stream, exams
        )
    }
}

/// An image attached to a doubt, base64 encoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    /// Validate a base64 upload and detect its MIME type from the decoded bytes.
    ///
    /// Accepts either bare base64 or a `data:<mime>;base64,` URL.
    pub fn from_base64(input: &str) -> Result<Self, ServiceError> {
        let data = match input.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => input,
        };
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if data.is_empty() {
            return Err(ServiceError::InvalidRequest {
                reason: "image is empty".to_string(),
            });
        }

        let bytes = Base64::decode_vec(&data).map_err(|e| ServiceError::InvalidRequest {
            reason: format!("image is not valid base64: {e}"),
        })?;

        Ok(Self {
            mime_type: sniff_image_mime(&bytes).to_string(),
            data,
        })
    }

    /// `data:` URL form used by OpenAI-compatible vision inputs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("bytes_b64", &self.data.len())
            .finish()
    }
}

fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

/// A single message in a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A provider-neutral generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub turns: Vec<Turn>,
    pub system_instruction: Option<String>,
    pub temperature: f32,
    pub json_mode: bool,
    /// Attached to the final user turn.
    pub image: Option<ImagePayload>,
    /// Extended reasoning budget in tokens, for tiers that support it.
    pub thinking_budget: Option<u32>,
}

impl GenerationRequest {
    /// A request made of a conversation history.
    pub fn conversation(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            system_instruction: None,
            temperature: DEFAULT_TEMPERATURE,
            json_mode: false,
            image: None,
            thinking_budget: None,
        }
    }

    /// A single-prompt request.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::conversation(vec![Turn::user(text)])
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_image(mut self, image: Option<ImagePayload>) -> Self {
        self.image = image;
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}

/// Optional request features a model tier may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOption {
    Thinking,
    JsonMode,
    Image,
}

impl fmt::Display for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestOption::Thinking => "thinking",
            RequestOption::JsonMode => "json_mode",
            RequestOption::Image => "image",
        };
        f.write_str(name)
    }
}

/// Text produced by a provider, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub provider: Provider,
    /// Model that produced the answer, after any downgrade.
    pub model: String,
    /// Number of attempts it took, starting at 1.
    pub attempts: u32,
    /// Options the answering tier could not honor.
    pub dropped_options: Vec<RequestOption>,
}
