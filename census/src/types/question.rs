use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub status: QuestionStatus,
    pub question_type: QuestionType,
    pub position: i64,
    pub author: UserId,
    pub created_at: i64,
    pub updated_at: i64,
    pub published_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub archived_at: Option<i64>,
}

impl Question {
    /// Whether the question is visible to repliers (published or completed).
    pub fn is_public(&self) -> bool {
        self.status.is_public()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Fields supplied by an administrator when creating a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub question_type: QuestionType,
    pub author: UserId,
}

impl NewQuestion {
    pub fn new(code: impl Into<String>, title: impl Into<String>, author: UserId) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            description: String::new(),
            short_description: String::new(),
            question_type: QuestionType::default(),
            author,
        }
    }

    pub fn with_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    #[default]
    Draft,
    Published,
    Completed,
    Archived,
}

impl QuestionStatus {
    pub const ALL: [QuestionStatus; 4] = [
        QuestionStatus::Draft,
        QuestionStatus::Published,
        QuestionStatus::Completed,
        QuestionStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Draft => "draft",
            QuestionStatus::Published => "published",
            QuestionStatus::Completed => "completed",
            QuestionStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionStatus::Draft => "Draft",
            QuestionStatus::Published => "Published",
            QuestionStatus::Completed => "Completed",
            QuestionStatus::Archived => "Archived",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, QuestionStatus::Published | QuestionStatus::Completed)
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question status \"{0}\"")]
pub struct UnknownStatus(pub String);

impl FromStr for QuestionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuestionStatus::Draft),
            "published" => Ok(QuestionStatus::Published),
            "completed" => Ok(QuestionStatus::Completed),
            "archived" => Ok(QuestionStatus::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    #[default]
    Single,
    Multi,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Single => "single",
            QuestionType::Multi => "multi",
        }
    }

    /// Choice questions carry a set of predefined answers.
    pub fn is_choice(&self) -> bool {
        !matches!(self, QuestionType::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question type \"{0}\"")]
pub struct UnknownType(pub String);

impl FromStr for QuestionType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(QuestionType::Text),
            "single" => Ok(QuestionType::Single),
            "multi" => Ok(QuestionType::Multi),
            other => Err(UnknownType(other.to_string())),
        }
    }
}

/// A question row as shown in the admin list, with its reply count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: Question,
    pub reply_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in QuestionStatus::ALL {
            assert_eq!(status.as_str().parse::<QuestionStatus>(), Ok(status));
        }
        assert_eq!(
            "closed".parse::<QuestionStatus>(),
            Err(UnknownStatus("closed".to_string()))
        );
    }

    #[test]
    fn test_public_statuses() {
        assert!(QuestionStatus::Published.is_public());
        assert!(QuestionStatus::Completed.is_public());
        assert!(!QuestionStatus::Draft.is_public());
        assert!(!QuestionStatus::Archived.is_public());
    }

    #[test]
    fn test_defaults_match_new_question() {
        let new = NewQuestion::new("q", "Q", UserId::from("admin"));
        assert_eq!(new.question_type, QuestionType::Single);
        assert_eq!(QuestionStatus::default(), QuestionStatus::Draft);
        assert!(!QuestionType::Text.is_choice());
        assert!(QuestionType::Multi.is_choice());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&QuestionStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        let status: QuestionStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, QuestionStatus::Archived);
    }
}
