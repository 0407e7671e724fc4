//! Client-side session state: the coach conversation and a running quiz.
//!
//! Neither survives a restart. The chat history is replayed to the backend
//! on every turn, so the server stays stateless.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    Clock, Result,
    service::ServiceError,
    types::{ChatMessage, QuizQuestion, Role},
};

/// Opening line from the coach.
pub fn coach_greeting(user_name: &str) -> String {
    format!(
        "Hello {user_name}! I'm your AI Study Coach. Which topic are you finding difficult today? I can explain concepts, solve problems, or tell you a story to help you remember!"
    )
}

/// Ordered, in-memory tutoring conversation.
#[derive(Debug, Clone)]
pub struct ChatSession {
    user_name: String,
    clock: Arc<dyn Clock>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// New session seeded with the coach greeting.
    pub fn new(user_name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self {
            user_name: user_name.into(),
            clock,
            messages: Vec::new(),
        };
        session.reset();
        session
    }

    fn push(&mut self, role: Role, text: impl Into<String>) -> &ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: self.clock.now_millis(),
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Role::User, text)
    }

    pub fn push_model(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Role::Model, text)
    }

    /// Record a failed turn as a model reply so roles keep alternating.
    pub fn push_failure(&mut self, err: impl std::fmt::Display) -> &ChatMessage {
        self.push(Role::Model, format!("**Error:** {err}"))
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Everything except the newest message, which is sent separately as
    /// `newMessage`.
    pub fn prior_history(&self) -> &[ChatMessage] {
        let end = self.messages.len().saturating_sub(1);
        &self.messages[..end]
    }

    /// Drop the conversation and start over with a fresh greeting.
    pub fn reset(&mut self) {
        self.messages.clear();
        let greeting = coach_greeting(&self.user_name);
        self.push(Role::Model, greeting);
    }
}

/// Result of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Correct,
    Incorrect { correct_answer: usize },
    /// The question was already answered; the first choice stands.
    AlreadyAnswered,
}

/// A quiz being taken, one question at a time.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    selected: Option<usize>,
    score: usize,
    finished: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let finished = questions.is_empty();
        Self {
            questions,
            current: 0,
            selected: None,
            score: 0,
            finished,
        }
    }

    /// The question being shown, if the quiz is still running.
    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Answer the current question.
    pub fn select(&mut self, option: usize) -> Result<Selection> {
        let Some(question) = self.current() else {
            return Err(ServiceError::InvalidRequest {
                reason: "quiz is finished".to_string(),
            }
            .into());
        };
        if option >= question.options.len() {
            return Err(ServiceError::InvalidRequest {
                reason: format!(
                    "option {option} out of range (0..{})",
                    question.options.len()
                ),
            }
            .into());
        }
        if self.selected.is_some() {
            return Ok(Selection::AlreadyAnswered);
        }

        let correct_answer = question.correct_answer;
        self.selected = Some(option);
        if option == correct_answer {
            self.score += 1;
            Ok(Selection::Correct)
        } else {
            Ok(Selection::Incorrect { correct_answer })
        }
    }

    /// Move to the next question, or finish after the last one.
    pub fn next(&mut self) {
        if self.finished {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
        } else {
            self.finished = true;
        }
    }
}
