use crate::error::CensusError;
use crate::ordering::Direction;
use crate::types::{
    Answer, NewAnswer, NewQuestion, NewReply, Question, QuestionStatus, QuestionSummary, Reply,
    UserId,
};

mod memory;
mod sqlite;

pub use memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

/// The unit of work run by [`CensusStorage::in_transaction`].
pub type ReplyUnit<'a> = dyn FnMut(&mut dyn ReplyScope) -> Result<Reply, CensusError> + 'a;

/// Persistence for questions, answers and replies.
///
/// Creation enforces the natural-key uniqueness constraints (question code,
/// answer value within a question, one reply per replier and question) and
/// reports violations as [`StorageError::UniqueViolation`].
pub trait CensusStorage: Send + Sync {
    fn create_question(&self, question: NewQuestion) -> Result<Question, StorageError>;
    fn get_question(&self, id: i64) -> Result<Option<Question>, StorageError>;
    fn get_question_by_code(&self, code: &str) -> Result<Option<Question>, StorageError>;
    /// All questions in display order, with their reply counts.
    fn list_questions(&self) -> Result<Vec<QuestionSummary>, StorageError>;
    /// Persists the mutable fields of `question` and refreshes its `updated_at`.
    fn save_question(&self, question: &mut Question) -> Result<(), StorageError>;
    fn move_question(&self, id: i64, direction: Direction) -> Result<bool, StorageError>;

    fn create_answer(&self, question_id: i64, answer: NewAnswer) -> Result<Answer, StorageError>;
    fn get_answer(&self, id: i64) -> Result<Option<Answer>, StorageError>;
    fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, StorageError>;
    fn move_answer(&self, id: i64, direction: Direction) -> Result<bool, StorageError>;

    fn list_replies(&self, question_id: i64) -> Result<Vec<Reply>, StorageError>;
    fn count_replies(&self, question_id: i64) -> Result<i64, StorageError>;
    fn move_reply(&self, id: i64, direction: Direction) -> Result<bool, StorageError>;

    /// Runs `unit` atomically. Nothing it wrote survives if it returns `Err`.
    fn in_transaction(&self, unit: &mut ReplyUnit<'_>) -> Result<Reply, CensusError>;
}

/// Reads and writes available inside a reply transaction.
pub trait ReplyScope {
    fn question_status(&mut self, question_id: i64) -> Result<QuestionStatus, StorageError>;
    fn reply_exists(&mut self, question_id: i64, replier: &UserId) -> Result<bool, StorageError>;
    fn find_answer(&mut self, question_id: i64, value: &str)
        -> Result<Option<Answer>, StorageError>;
    fn answer_belongs(&mut self, question_id: i64, answer_id: i64) -> Result<bool, StorageError>;
    fn insert_reply(&mut self, reply: NewReply) -> Result<Reply, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, message)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StorageError::UniqueViolation(message.clone().unwrap_or_else(|| err.to_string()))
            }
            rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(err.to_string()),
            _ => StorageError::OperationFailed(err.to_string()),
        }
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
