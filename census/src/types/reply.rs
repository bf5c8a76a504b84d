use super::UserId;
use serde::{Deserialize, Serialize};

/// One user's reply to one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub id: i64,
    pub question_id: i64,
    pub replier: UserId,
    pub answer_id: Option<i64>,
    pub text: String,
    pub position: i64,
    pub replied_at: i64,
}

impl Reply {
    /// 1-based sequence number of the reply within its question.
    pub fn counter(&self) -> i64 {
        self.position + 1
    }
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub question_id: i64,
    pub replier: UserId,
    pub answer_id: Option<i64>,
    pub text: String,
    pub replied_at: i64,
}
