//! Recovering quiz questions from model output.
//!
//! Models wrap JSON in code fences, nest the array inside an object, or emit
//! answer indices as strings. [`parse_quiz`] tolerates all of that and never
//! fails: unusable output becomes an empty list and a warning in the log.

use serde_json::Value;

use crate::types::QuizQuestion;

/// Remove a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// Parse model output into well-formed quiz questions.
///
/// Questions are renumbered from 1 so ids are unique within the quiz.
pub fn parse_quiz(raw: &str) -> Vec<QuizQuestion> {
    let cleaned = strip_code_fence(raw);
    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Quiz JSON parse error: {e}");
            return Vec::new();
        }
    };

    let Some(items) = question_array(value) else {
        tracing::warn!("Quiz response held no question array");
        return Vec::new();
    };

    let total = items.len();
    let questions: Vec<QuizQuestion> = items
        .iter()
        .filter_map(read_question)
        .enumerate()
        .map(|(i, mut q)| {
            q.id = i as u32 + 1;
            q
        })
        .collect();

    if questions.len() < total {
        tracing::warn!(
            kept = questions.len(),
            total,
            "Dropped malformed quiz questions"
        );
    }
    questions
}

/// The array of questions, either bare or as the first array field of an object.
fn question_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("questions") {
                return Some(items);
            }
            // Keys iterate sorted, so pick by content rather than position.
            map.into_iter().find_map(|(_, v)| match v {
                Value::Array(items) if items.iter().any(|item| item.get("question").is_some()) => {
                    Some(items)
                }
                _ => None,
            })
        }
        _ => None,
    }
}

fn read_question(value: &Value) -> Option<QuizQuestion> {
    let question = value.get("question")?.as_str()?.trim().to_string();
    if question.is_empty() {
        return None;
    }

    let options: Vec<String> = value
        .get("options")?
        .as_array()?
        .iter()
        .map(|o| match o {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect::<Option<_>>()?;

    let correct_answer = match value.get("correctAnswer")? {
        Value::Number(n) => n.as_u64()? as usize,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let question = QuizQuestion {
        id: 0,
        question,
        options,
        correct_answer,
        explanation,
    };
    question.is_well_formed().then_some(question)
}
