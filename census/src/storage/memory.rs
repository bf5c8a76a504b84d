use super::{now, CensusStorage, ReplyScope, ReplyUnit, StorageError};
use crate::error::CensusError;
use crate::ordering::{neighbour, next_position, Direction};
use crate::types::{
    Answer, NewAnswer, NewQuestion, NewReply, Question, QuestionStatus, QuestionSummary, Reply,
    UserId,
};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    answers: Vec<Answer>,
    replies: Vec<Reply>,
    last_question_id: i64,
    last_answer_id: i64,
    last_reply_id: i64,
}

impl Tables {
    fn question(&self, id: i64) -> Result<&Question, StorageError> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("Question {}", id)))
    }

    fn insert_reply(&mut self, reply: NewReply) -> Result<Reply, StorageError> {
        self.question(reply.question_id)?;
        if self
            .replies
            .iter()
            .any(|r| r.question_id == reply.question_id && r.replier == reply.replier)
        {
            return Err(StorageError::UniqueViolation(
                "census_replies.question_id, census_replies.replier".to_string(),
            ));
        }

        let position = next_position(
            self.replies
                .iter()
                .filter(|r| r.question_id == reply.question_id)
                .map(|r| r.position)
                .max(),
        );
        self.last_reply_id += 1;
        let reply = Reply {
            id: self.last_reply_id,
            question_id: reply.question_id,
            replier: reply.replier,
            answer_id: reply.answer_id,
            text: reply.text,
            position,
            replied_at: reply.replied_at,
        };
        self.replies.push(reply.clone());
        Ok(reply)
    }
}

/// Keeps everything in process memory. Mostly useful for tests and for
/// embedding the manager where durability is not needed.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::OperationFailed(format!("Lock error: {}", e)))
    }
}

/// Swaps the position of the record `id` with its neighbour in the same scope.
fn swap_positions<T>(
    records: &mut [T],
    id: i64,
    direction: Direction,
    key: impl Fn(&T) -> (i64, i64, i64),
    set_position: impl Fn(&mut T, i64),
    kind: &str,
) -> Result<bool, StorageError> {
    let (_, scope, position) = records
        .iter()
        .map(&key)
        .find(|(record_id, _, _)| *record_id == id)
        .ok_or_else(|| StorageError::NotFound(format!("{} {}", kind, id)))?;

    let siblings = records
        .iter()
        .map(&key)
        .filter(|(_, record_scope, _)| *record_scope == scope)
        .map(|(record_id, _, record_position)| (record_id, record_position));

    let Some((other_id, other_position)) = neighbour(siblings, position, direction) else {
        return Ok(false);
    };

    for record in records.iter_mut() {
        let (record_id, _, _) = key(&*record);
        if record_id == id {
            set_position(record, other_position);
        } else if record_id == other_id {
            set_position(record, position);
        }
    }
    Ok(true)
}

fn sorted<T>(records: impl Iterator<Item = T>, order: impl Fn(&T) -> (i64, i64)) -> Vec<T> {
    let mut records: Vec<T> = records.collect();
    records.sort_by_key(|r| order(r));
    records
}

impl CensusStorage for InMemoryStorage {
    fn create_question(&self, question: NewQuestion) -> Result<Question, StorageError> {
        let mut tables = self.lock()?;
        if tables.questions.iter().any(|q| q.code == question.code) {
            return Err(StorageError::UniqueViolation(
                "census_questions.code".to_string(),
            ));
        }

        let position = next_position(tables.questions.iter().map(|q| q.position).max());
        let timestamp = now();
        tables.last_question_id += 1;
        let question = Question {
            id: tables.last_question_id,
            code: question.code,
            title: question.title,
            description: question.description,
            short_description: question.short_description,
            status: QuestionStatus::Draft,
            question_type: question.question_type,
            position,
            author: question.author,
            created_at: timestamp,
            updated_at: timestamp,
            published_at: None,
            completed_at: None,
            archived_at: None,
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    fn get_question(&self, id: i64) -> Result<Option<Question>, StorageError> {
        Ok(self.lock()?.questions.iter().find(|q| q.id == id).cloned())
    }

    fn get_question_by_code(&self, code: &str) -> Result<Option<Question>, StorageError> {
        Ok(self
            .lock()?
            .questions
            .iter()
            .find(|q| q.code == code)
            .cloned())
    }

    fn list_questions(&self) -> Result<Vec<QuestionSummary>, StorageError> {
        let tables = self.lock()?;
        let questions = sorted(tables.questions.iter().cloned(), |q| (q.position, q.id));
        Ok(questions
            .into_iter()
            .map(|question| {
                let reply_count = tables
                    .replies
                    .iter()
                    .filter(|r| r.question_id == question.id)
                    .count() as i64;
                QuestionSummary {
                    question,
                    reply_count,
                }
            })
            .collect())
    }

    fn save_question(&self, question: &mut Question) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        let stored = tables
            .questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or_else(|| StorageError::NotFound(format!("Question {}", question.id)))?;

        question.updated_at = now();
        stored.title = question.title.clone();
        stored.description = question.description.clone();
        stored.short_description = question.short_description.clone();
        stored.status = question.status;
        stored.question_type = question.question_type;
        stored.updated_at = question.updated_at;
        stored.published_at = question.published_at;
        stored.completed_at = question.completed_at;
        stored.archived_at = question.archived_at;
        Ok(())
    }

    fn move_question(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut tables = self.lock()?;
        swap_positions(
            &mut tables.questions,
            id,
            direction,
            |q| (q.id, 0, q.position),
            |q, position| q.position = position,
            "Question",
        )
    }

    fn create_answer(&self, question_id: i64, answer: NewAnswer) -> Result<Answer, StorageError> {
        let mut tables = self.lock()?;
        tables.question(question_id)?;
        if tables
            .answers
            .iter()
            .any(|a| a.question_id == question_id && a.value == answer.value)
        {
            return Err(StorageError::UniqueViolation(
                "census_answers.question_id, census_answers.value".to_string(),
            ));
        }

        let position = next_position(
            tables
                .answers
                .iter()
                .filter(|a| a.question_id == question_id)
                .map(|a| a.position)
                .max(),
        );
        let timestamp = now();
        tables.last_answer_id += 1;
        let answer = Answer {
            id: tables.last_answer_id,
            question_id,
            value: answer.value,
            text: answer.text,
            position,
            created_at: timestamp,
            updated_at: timestamp,
        };
        tables.answers.push(answer.clone());
        Ok(answer)
    }

    fn get_answer(&self, id: i64) -> Result<Option<Answer>, StorageError> {
        Ok(self.lock()?.answers.iter().find(|a| a.id == id).cloned())
    }

    fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, StorageError> {
        let tables = self.lock()?;
        Ok(sorted(
            tables
                .answers
                .iter()
                .filter(|a| a.question_id == question_id)
                .cloned(),
            |a| (a.position, a.id),
        ))
    }

    fn move_answer(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut tables = self.lock()?;
        swap_positions(
            &mut tables.answers,
            id,
            direction,
            |a| (a.id, a.question_id, a.position),
            |a, position| a.position = position,
            "Answer",
        )
    }

    fn list_replies(&self, question_id: i64) -> Result<Vec<Reply>, StorageError> {
        let tables = self.lock()?;
        Ok(sorted(
            tables
                .replies
                .iter()
                .filter(|r| r.question_id == question_id)
                .cloned(),
            |r| (r.position, r.id),
        ))
    }

    fn count_replies(&self, question_id: i64) -> Result<i64, StorageError> {
        let tables = self.lock()?;
        Ok(tables
            .replies
            .iter()
            .filter(|r| r.question_id == question_id)
            .count() as i64)
    }

    fn move_reply(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut tables = self.lock()?;
        swap_positions(
            &mut tables.replies,
            id,
            direction,
            |r| (r.id, r.question_id, r.position),
            |r, position| r.position = position,
            "Reply",
        )
    }

    fn in_transaction(&self, unit: &mut ReplyUnit<'_>) -> Result<Reply, CensusError> {
        // The lock is held for the whole unit, which serializes transactions.
        // A scope only appends replies, so undoing means dropping the tail.
        let mut tables = self.lock()?;
        let replies_len = tables.replies.len();
        let last_reply_id = tables.last_reply_id;

        let result = unit(&mut MemoryScope {
            tables: &mut tables,
        });
        if result.is_err() {
            tables.replies.truncate(replies_len);
            tables.last_reply_id = last_reply_id;
        }
        result
    }
}

struct MemoryScope<'a> {
    tables: &'a mut Tables,
}

impl ReplyScope for MemoryScope<'_> {
    fn question_status(&mut self, question_id: i64) -> Result<QuestionStatus, StorageError> {
        Ok(self.tables.question(question_id)?.status)
    }

    fn reply_exists(&mut self, question_id: i64, replier: &UserId) -> Result<bool, StorageError> {
        Ok(self
            .tables
            .replies
            .iter()
            .any(|r| r.question_id == question_id && &r.replier == replier))
    }

    fn find_answer(
        &mut self,
        question_id: i64,
        value: &str,
    ) -> Result<Option<Answer>, StorageError> {
        Ok(self
            .tables
            .answers
            .iter()
            .find(|a| a.question_id == question_id && a.value == value)
            .cloned())
    }

    fn answer_belongs(&mut self, question_id: i64, answer_id: i64) -> Result<bool, StorageError> {
        Ok(self
            .tables
            .answers
            .iter()
            .any(|a| a.id == answer_id && a.question_id == question_id))
    }

    fn insert_reply(&mut self, reply: NewReply) -> Result<Reply, StorageError> {
        self.tables.insert_reply(reply)
    }
}
