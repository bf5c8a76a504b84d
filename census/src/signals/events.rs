use super::Signal;
use crate::types::{Question, QuestionStatus, Reply};

/// Sent after a question's status has been changed and saved.
#[derive(Debug, Clone)]
pub struct StatusChanged {
    pub question: Question,
    pub old_status: QuestionStatus,
}

/// Sent after a reply has been committed.
#[derive(Debug, Clone)]
pub struct ReplyCreated {
    pub question: Question,
    pub reply: Reply,
}

#[derive(Debug, Clone)]
pub struct CensusSignals {
    pub status_changed: Signal<StatusChanged>,
    pub reply_created: Signal<ReplyCreated>,
}

impl CensusSignals {
    pub fn new() -> Self {
        Self {
            status_changed: Signal::new("question_status_changed"),
            reply_created: Signal::new("question_reply"),
        }
    }
}

impl Default for CensusSignals {
    fn default() -> Self {
        Self::new()
    }
}
