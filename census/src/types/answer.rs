use serde::{Deserialize, Serialize};
use std::fmt;

/// A predefined choice for a question. `value` is unique within its question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub value: String,
    pub text: String,
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.question_id, self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnswer {
    pub value: String,
    pub text: String,
}

impl NewAnswer {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// How a replier designates the chosen answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerChoice {
    /// The answer's slug, resolved against the question's answers.
    Value(String),
    /// An answer already loaded by the caller.
    Answer(Answer),
}

impl AnswerChoice {
    /// An empty slug carries no choice at all.
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, AnswerChoice::Value(value) if value.is_empty())
    }
}

impl From<Answer> for AnswerChoice {
    fn from(answer: Answer) -> Self {
        AnswerChoice::Answer(answer)
    }
}

impl From<&str> for AnswerChoice {
    fn from(value: &str) -> Self {
        AnswerChoice::Value(value.to_string())
    }
}
