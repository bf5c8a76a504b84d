use crate::storage::StorageError;
use crate::types::{QuestionStatus, UserId};

/// Reasons a reply is refused. These are the only recoverable failures of
/// reply admission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplyRejected {
    #[error("User \"{replier}\" already replied to \"{question}\"")]
    DuplicateReply { question: String, replier: UserId },

    #[error("Question \"{question}\" is not Published (currently {status})")]
    QuestionNotOpen {
        question: String,
        status: QuestionStatus,
    },

    #[error("Answer \"{value}\" does not exist for question \"{question}\"")]
    AnswerNotFound { question: String, value: String },

    #[error("Invalid answer \"{answer}\" for question \"{question}\"")]
    InvalidAnswer { question: String, answer: String },
}

impl ReplyRejected {
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyRejected::DuplicateReply { .. } => "duplicate_reply",
            ReplyRejected::QuestionNotOpen { .. } => "question_not_open",
            ReplyRejected::AnswerNotFound { .. } => "answer_not_found",
            ReplyRejected::InvalidAnswer { .. } => "invalid_answer",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CensusError {
    #[error(transparent)]
    Rejected(#[from] ReplyRejected),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CensusError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, CensusError::Rejected(_))
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CensusError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
