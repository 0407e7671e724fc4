//! Prompt templates for each tutoring operation.
//!
//! Every operation maps to a fixed instruction text, a sampling temperature
//! and a starting model tier. Latency-sensitive operations start on the fast
//! tier; reasoning-heavy ones start on the reasoning tier with a thinking budget.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    tier::TierKind,
    types::{ChatMessage, GenerationRequest, ImagePayload, Role, StudyPlanDetails, Turn},
};

/// Thinking budget requested by reasoning-tier operations.
pub const THINKING_BUDGET: u32 = 2048;

/// Number of questions requested per quiz.
pub const QUIZ_QUESTION_COUNT: usize = 5;

pub const SYSTEM_INSTRUCTION_COACH: &str = r#"You are "ScholarAI Coach", a friendly, encouraging, and intelligent tutor for students (Grade 9 to College) in India.
GOAL: Explain complex topics simply, using analogies, stories, and memory tricks.
FORMATTING: Use Markdown, Headings, Bullet points, Tables, Bold text.
BEHAVIOR: Adjust language to student level. Be encouraging. Provide step-by-step solutions."#;

pub const SYSTEM_INSTRUCTION_CAREER: &str = "You are a Career Counselor expert for the Indian education system.
FORMATTING: Use Markdown tables, Bullet points, Bold.
CONTENT: Guidance on streams, degrees, scope, salary (INR), difficulty.";

pub const SYSTEM_INSTRUCTION_DOUBT: &str = "You are an expert academic doubt solver. Think through the problem step-by-step and provide clear, accurate solutions.";

/// A logical tutoring operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Chat,
    Notes,
    Doubt,
    Quiz,
    Career,
    Plan,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Chat,
        Operation::Notes,
        Operation::Doubt,
        Operation::Quiz,
        Operation::Career,
        Operation::Plan,
    ];

    /// Tier the operation starts on.
    pub fn primary_tier(self) -> TierKind {
        match self {
            Operation::Chat | Operation::Notes | Operation::Quiz => TierKind::Fast,
            Operation::Doubt | Operation::Career | Operation::Plan => TierKind::Reasoning,
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            Operation::Chat | Operation::Quiz | Operation::Career => 0.7,
            Operation::Notes => 0.3,
            Operation::Doubt => 0.2,
            Operation::Plan => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Chat => "chat",
            Operation::Notes => "notes",
            Operation::Doubt => "doubt",
            Operation::Quiz => "quiz",
            Operation::Career => "career",
            Operation::Plan => "plan",
        }
    }

    /// Base request for this operation: temperature and thinking budget set.
    fn request(self, turns: Vec<Turn>) -> GenerationRequest {
        let request = GenerationRequest::conversation(turns).with_temperature(self.temperature());
        match self.primary_tier() {
            TierKind::Reasoning => request.with_thinking_budget(THINKING_BUDGET),
            TierKind::Fast => request,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coach conversation: prior history followed by the new message.
pub fn chat(history: &[ChatMessage], new_message: &str, user_context: &str) -> GenerationRequest {
    let mut turns: Vec<Turn> = history
        .iter()
        .filter(|m| !m.text.trim().is_empty())
        .map(|m| Turn {
            role: m.role,
            text: m.text.clone(),
        })
        .collect();
    // Providers expect the conversation to open with a user turn.
    while turns.first().is_some_and(|t| t.role == Role::Model) {
        turns.remove(0);
    }
    turns.push(Turn::user(new_message));

    Operation::Chat
        .request(turns)
        .with_system(format!(
            "{SYSTEM_INSTRUCTION_COACH}\n\nUser Context: {user_context}"
        ))
}

pub fn notes(topic: &str) -> GenerationRequest {
    let prompt = format!(
        "Role: Expert academic content writer. Task: Create exam-ready study notes on \"{topic}\".
Include: Definitions, Formulas (in Tables), Comparisons (in Tables), Step-by-step methods.
Format: Markdown with Headers (##) and Horizontal Rules (---)."
    );
    Operation::Notes.request(vec![Turn::user(prompt)])
}

pub fn doubt(doubt: &str, image: Option<ImagePayload>) -> GenerationRequest {
    let prompt = format!("Solve this academic doubt step-by-step using Markdown. Doubt: {doubt}");
    Operation::Doubt
        .request(vec![Turn::user(prompt)])
        .with_system(SYSTEM_INSTRUCTION_DOUBT)
        .with_image(image)
}

pub fn quiz(topic: &str, difficulty: &str) -> GenerationRequest {
    let prompt = format!(
        "Generate {QUIZ_QUESTION_COUNT} multiple choice questions (MCQs) for \"{topic}\" at \"{difficulty}\" level.
Each question must have exactly 4 options.
Return ONLY a JSON array. Keys: id, question, options (array), correctAnswer (index), explanation.
Do not wrap in markdown code blocks. Just raw JSON."
    );
    Operation::Quiz
        .request(vec![Turn::user(prompt)])
        .with_json_mode()
}

pub fn career(profile: &str, query: &str) -> GenerationRequest {
    let prompt = format!(
        "User Profile: {profile}\n\nUser Query: {query}\n\nUse Markdown tables and bullet points."
    );
    Operation::Career
        .request(vec![Turn::user(prompt)])
        .with_system(SYSTEM_INSTRUCTION_CAREER)
}

/// Study plan. `today` is used to count the days left before an ISO exam date.
pub fn plan(details: &StudyPlanDetails, today: NaiveDate) -> GenerationRequest {
    let mut prompt = format!(
        "Create a study plan. Subjects: {}. Hours: {}.
Exam: {}. Weakness: {}.",
        details.subjects, details.hours_per_day, details.exam_date, details.weak_areas
    );
    if let Some(days) = days_until(&details.exam_date, today) {
        prompt.push_str(&format!(" Days remaining until the exam: {days}."));
    }
    prompt.push_str(
        "\nOutput: Weekly timetable in Markdown Table. Strategy section with bullet points.",
    );
    Operation::Plan.request(vec![Turn::user(prompt)])
}

fn days_until(exam_date: &str, today: NaiveDate) -> Option<i64> {
    let date = NaiveDate::parse_from_str(exam_date.trim(), "%Y-%m-%d").ok()?;
    let days = (date - today).num_days();
    (days >= 0).then_some(days)
}
