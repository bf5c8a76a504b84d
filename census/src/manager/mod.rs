//! Question lifecycle and reply admission.

use crate::error::{CensusError, ReplyRejected};
use crate::ordering::Direction;
use crate::signals::{CensusSignals, ReplyCreated, StatusChanged};
use crate::storage::{now, CensusStorage, ReplyScope, StorageError};
use crate::types::{
    Answer, AnswerChoice, NewAnswer, NewQuestion, NewReply, Question, QuestionStatus,
    QuestionSummary, Reply, UserId,
};
use crate::validation::{validate_new_answer, validate_new_question};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service object owning the storage handle and the notification channels.
#[derive(Clone)]
pub struct CensusManager {
    storage: Arc<dyn CensusStorage>,
    signals: CensusSignals,
}

impl CensusManager {
    pub fn new(storage: Arc<dyn CensusStorage>) -> Self {
        Self::with_signals(storage, CensusSignals::new())
    }

    pub fn with_signals(storage: Arc<dyn CensusStorage>, signals: CensusSignals) -> Self {
        Self { storage, signals }
    }

    pub fn signals(&self) -> &CensusSignals {
        &self.signals
    }

    pub fn storage(&self) -> &Arc<dyn CensusStorage> {
        &self.storage
    }

    // Questions and answers

    pub fn create_question(&self, question: NewQuestion) -> Result<Question, CensusError> {
        validate_new_question(&question)?;
        let question = self.storage.create_question(question)?;
        info!(
            question_id = question.id,
            code = %question.code,
            author = %question.author,
            "Created question"
        );
        Ok(question)
    }

    pub fn question(&self, id: i64) -> Result<Option<Question>, CensusError> {
        Ok(self.storage.get_question(id)?)
    }

    pub fn question_by_code(&self, code: &str) -> Result<Option<Question>, CensusError> {
        Ok(self.storage.get_question_by_code(code)?)
    }

    pub fn questions(&self) -> Result<Vec<QuestionSummary>, CensusError> {
        Ok(self.storage.list_questions()?)
    }

    pub fn add_answer(&self, question: &Question, answer: NewAnswer) -> Result<Answer, CensusError> {
        validate_new_answer(&answer)?;
        let answer = self.storage.create_answer(question.id, answer)?;
        info!(
            question_id = question.id,
            answer_id = answer.id,
            value = %answer.value,
            "Added answer"
        );
        Ok(answer)
    }

    pub fn answer(&self, id: i64) -> Result<Option<Answer>, CensusError> {
        Ok(self.storage.get_answer(id)?)
    }

    pub fn answers(&self, question: &Question) -> Result<Vec<Answer>, CensusError> {
        Ok(self.storage.list_answers(question.id)?)
    }

    pub fn replies(&self, question: &Question) -> Result<Vec<Reply>, CensusError> {
        Ok(self.storage.list_replies(question.id)?)
    }

    pub fn reply_count(&self, question: &Question) -> Result<i64, CensusError> {
        Ok(self.storage.count_replies(question.id)?)
    }

    // Status

    /// Sets `question` to `new_status`, whatever its current status is,
    /// saves it and notifies `status_changed` receivers with the old status.
    pub fn set_status(
        &self,
        question: &mut Question,
        new_status: QuestionStatus,
    ) -> Result<(), CensusError> {
        let old_status = question.status;
        question.status = new_status;

        let timestamp = now();
        match new_status {
            QuestionStatus::Published => question.published_at = Some(timestamp),
            QuestionStatus::Completed => question.completed_at = Some(timestamp),
            QuestionStatus::Archived => question.archived_at = Some(timestamp),
            QuestionStatus::Draft => {}
        }

        self.storage.save_question(question)?;
        info!(
            question_id = question.id,
            code = %question.code,
            old_status = %old_status,
            new_status = %new_status,
            "Question status changed"
        );

        self.signals.status_changed.send_robust(&StatusChanged {
            question: question.clone(),
            old_status,
        });
        Ok(())
    }

    pub fn publish(&self, question: &mut Question) -> Result<(), CensusError> {
        self.set_status(question, QuestionStatus::Published)
    }

    pub fn complete(&self, question: &mut Question) -> Result<(), CensusError> {
        self.set_status(question, QuestionStatus::Completed)
    }

    pub fn archive(&self, question: &mut Question) -> Result<(), CensusError> {
        self.set_status(question, QuestionStatus::Archived)
    }

    // Replies

    /// Records `replier`'s reply to `question`.
    ///
    /// Checks run in a fixed order inside one transaction: an existing reply
    /// from the same user, then the question being published, then the
    /// answer (resolved by value, or checked for ownership when given
    /// directly). Any rejection leaves no reply behind.
    pub fn reply(
        &self,
        question: &Question,
        replier: &UserId,
        answer: Option<AnswerChoice>,
        text: &str,
    ) -> Result<Reply, CensusError> {
        let answer = answer.filter(|choice| !choice.is_empty());

        let result = self.storage.in_transaction(&mut |scope: &mut dyn ReplyScope| {
            admit(scope, question, replier, answer.as_ref(), text)
        });

        let reply = match result {
            Ok(reply) => reply,
            Err(CensusError::Rejected(rejected)) => {
                warn!(
                    question_id = question.id,
                    replier = %replier,
                    reason = rejected.kind(),
                    "Reply rejected"
                );
                return Err(rejected.into());
            }
            Err(e) => return Err(e),
        };

        info!(
            question_id = question.id,
            reply_id = reply.id,
            replier = %replier,
            counter = reply.counter(),
            "Reply recorded"
        );

        // Receivers see the stored question, which was published at commit
        // even when the caller's copy is stale.
        let current = match self.storage.get_question(question.id) {
            Ok(Some(current)) => current,
            Ok(None) | Err(_) => Question {
                status: QuestionStatus::Published,
                ..question.clone()
            },
        };
        self.signals.reply_created.send_robust(&ReplyCreated {
            question: current,
            reply: reply.clone(),
        });
        Ok(reply)
    }

    /// Like [`reply`](Self::reply), but a rejected reply yields `Ok(None)`.
    /// Any other error is returned unchanged.
    pub fn reply_safely(
        &self,
        question: &Question,
        replier: &UserId,
        answer: Option<AnswerChoice>,
        text: &str,
    ) -> Result<Option<Reply>, CensusError> {
        match self.reply(question, replier, answer, text) {
            Ok(reply) => Ok(Some(reply)),
            Err(CensusError::Rejected(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // Ordering

    pub fn move_question(&self, id: i64, direction: Direction) -> Result<bool, CensusError> {
        let moved = self.storage.move_question(id, direction)?;
        debug!(question_id = id, %direction, moved, "Moved question");
        Ok(moved)
    }

    pub fn move_answer(&self, id: i64, direction: Direction) -> Result<bool, CensusError> {
        let moved = self.storage.move_answer(id, direction)?;
        debug!(answer_id = id, %direction, moved, "Moved answer");
        Ok(moved)
    }

    pub fn move_reply(&self, id: i64, direction: Direction) -> Result<bool, CensusError> {
        let moved = self.storage.move_reply(id, direction)?;
        debug!(reply_id = id, %direction, moved, "Moved reply");
        Ok(moved)
    }
}

fn admit(
    scope: &mut dyn ReplyScope,
    question: &Question,
    replier: &UserId,
    answer: Option<&AnswerChoice>,
    text: &str,
) -> Result<Reply, CensusError> {
    if scope.reply_exists(question.id, replier)? {
        return Err(ReplyRejected::DuplicateReply {
            question: question.code.clone(),
            replier: replier.clone(),
        }
        .into());
    }

    let status = scope.question_status(question.id)?;
    if status != QuestionStatus::Published {
        return Err(ReplyRejected::QuestionNotOpen {
            question: question.code.clone(),
            status,
        }
        .into());
    }

    let answer_id = match answer {
        None => None,
        Some(AnswerChoice::Value(value)) => match scope.find_answer(question.id, value)? {
            Some(found) => Some(found.id),
            None => {
                return Err(ReplyRejected::AnswerNotFound {
                    question: question.code.clone(),
                    value: value.clone(),
                }
                .into())
            }
        },
        Some(AnswerChoice::Answer(given)) => {
            if given.question_id != question.id || !scope.answer_belongs(question.id, given.id)? {
                return Err(ReplyRejected::InvalidAnswer {
                    question: question.code.clone(),
                    answer: given.value.clone(),
                }
                .into());
            }
            Some(given.id)
        }
    };

    let inserted = scope.insert_reply(NewReply {
        question_id: question.id,
        replier: replier.clone(),
        answer_id,
        text: text.to_string(),
        replied_at: now(),
    });

    match inserted {
        Ok(reply) => Ok(reply),
        // A concurrent admission won the race; the unique index caught it.
        Err(StorageError::UniqueViolation(_)) => Err(ReplyRejected::DuplicateReply {
            question: question.code.clone(),
            replier: replier.clone(),
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}
