//! Survey questions with ordered answers and one-reply-per-user admission.
//!
//! [`CensusManager`] is the entry point: it moves questions through their
//! statuses, admits replies, and notifies receivers connected to its
//! [`CensusSignals`]. Persistence goes through [`CensusStorage`], backed by
//! SQLite ([`SqliteStorage`]) or process memory ([`InMemoryStorage`]).

pub mod database;
pub mod error;
pub mod manager;
pub mod ordering;
pub mod signals;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::{CensusError, ReplyRejected};
pub use manager::CensusManager;
pub use ordering::Direction;
pub use signals::{CensusSignals, ReplyCreated, Signal, SignalError, StatusChanged};
pub use storage::{CensusStorage, InMemoryStorage, SqliteStorage, StorageError};
pub use types::{
    Answer, AnswerChoice, NewAnswer, NewQuestion, Question, QuestionStatus, QuestionSummary,
    QuestionType, Reply, UserId,
};
