use super::{now, CensusStorage, ReplyScope, ReplyUnit, StorageError};
use crate::database::{Database, DbConnection};
use crate::error::CensusError;
use crate::ordering::{next_position, Direction};
use crate::types::{
    Answer, NewAnswer, NewQuestion, NewReply, Question, QuestionStatus, QuestionSummary, Reply,
    UserId,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::MutexGuard;

const QUESTION_COLUMNS: &str = "id, code, title, description, short_description, status, \
     question_type, position, author, created_at, updated_at, published_at, completed_at, \
     archived_at";

const ANSWER_COLUMNS: &str = "id, question_id, value, text, position, created_at, updated_at";

const REPLY_COLUMNS: &str = "id, question_id, replier, answer_id, text, position, replied_at";

pub struct SqliteStorage {
    connection: DbConnection,
}

impl SqliteStorage {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    /// Opens (or creates) the database at `db_path` and applies migrations.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        let database = Database::new(db_path)?;
        Ok(Self::new(database.connection()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection
            .lock()
            .map_err(|e| StorageError::OperationFailed(format!("Lock error: {}", e)))
    }
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    let author: String = row.get(8)?;
    Ok(Question {
        id: row.get(0)?,
        code: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        short_description: row.get(4)?,
        status: parse_column(row, 5)?,
        question_type: parse_column(row, 6)?,
        position: row.get(7)?,
        author: UserId::from(author),
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        published_at: row.get(11)?,
        completed_at: row.get(12)?,
        archived_at: row.get(13)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        question_id: row.get(1)?,
        value: row.get(2)?,
        text: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn reply_from_row(row: &Row<'_>) -> rusqlite::Result<Reply> {
    let replier: String = row.get(2)?;
    Ok(Reply {
        id: row.get(0)?,
        question_id: row.get(1)?,
        replier: UserId::from(replier),
        answer_id: row.get(3)?,
        text: row.get(4)?,
        position: row.get(5)?,
        replied_at: row.get(6)?,
    })
}

fn question_exists(conn: &Connection, question_id: i64) -> Result<(), StorageError> {
    let exists = conn
        .prepare("SELECT 1 FROM census_questions WHERE id = ?1")?
        .exists(params![question_id])?;
    if exists {
        Ok(())
    } else {
        Err(StorageError::NotFound(format!("Question {}", question_id)))
    }
}

/// Swaps `id` with the adjacent row of the same scope. `scope_column` names
/// the column grouping the rows (`None` for a table-wide order).
fn swap_with_neighbour(
    conn: &mut Connection,
    table: &str,
    scope_column: Option<&str>,
    id: i64,
    direction: Direction,
) -> Result<bool, StorageError> {
    let scope_expr = scope_column.unwrap_or("0");
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (position, scope): (i64, i64) = tx
        .query_row(
            &format!("SELECT position, {scope_expr} FROM {table} WHERE id = ?1"),
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("{} row {}", table, id)))?;

    let (comparison, order) = match direction {
        Direction::Up => ("<", "DESC"),
        Direction::Down => (">", "ASC"),
    };
    let neighbour: Option<(i64, i64)> = tx
        .query_row(
            &format!(
                "SELECT id, position FROM {table}
                 WHERE {scope_expr} = ?1 AND position {comparison} ?2
                 ORDER BY position {order}
                 LIMIT 1"
            ),
            params![scope, position],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((other_id, other_position)) = neighbour else {
        return Ok(false);
    };

    let update = format!("UPDATE {table} SET position = ?1 WHERE id = ?2");
    tx.execute(&update, params![other_position, id])?;
    tx.execute(&update, params![position, other_id])?;
    tx.commit()?;
    Ok(true)
}

impl CensusStorage for SqliteStorage {
    fn create_question(&self, question: NewQuestion) -> Result<Question, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let timestamp = now();

        let max: Option<i64> =
            tx.query_row("SELECT MAX(position) FROM census_questions", [], |row| {
                row.get(0)
            })?;
        let position = next_position(max);

        tx.execute(
            r#"
            INSERT INTO census_questions
                (code, title, description, short_description, status, question_type,
                 position, author, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                question.code,
                question.title,
                question.description,
                question.short_description,
                QuestionStatus::Draft.as_str(),
                question.question_type.as_str(),
                position,
                question.author.as_str(),
                timestamp,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Question {
            id,
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
        })
    }

    fn get_question(&self, id: i64) -> Result<Option<Question>, StorageError> {
        let conn = self.lock()?;
        let question = conn
            .query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM census_questions WHERE id = ?1"),
                params![id],
                question_from_row,
            )
            .optional()?;
        Ok(question)
    }

    fn get_question_by_code(&self, code: &str) -> Result<Option<Question>, StorageError> {
        let conn = self.lock()?;
        let question = conn
            .query_row(
                &format!("SELECT {QUESTION_COLUMNS} FROM census_questions WHERE code = ?1"),
                params![code],
                question_from_row,
            )
            .optional()?;
        Ok(question)
    }

    fn list_questions(&self) -> Result<Vec<QuestionSummary>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS},
                    (SELECT COUNT(*) FROM census_replies
                     WHERE census_replies.question_id = census_questions.id)
             FROM census_questions
             ORDER BY position ASC, id ASC"
        ))?;

        let questions = stmt
            .query_map([], |row| {
                Ok(QuestionSummary {
                    question: question_from_row(row)?,
                    reply_count: row.get(14)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(questions)
    }

    fn save_question(&self, question: &mut Question) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let updated_at = now();

        let changed = conn.execute(
            r#"
            UPDATE census_questions
            SET title = ?1, description = ?2, short_description = ?3, status = ?4,
                question_type = ?5, updated_at = ?6, published_at = ?7,
                completed_at = ?8, archived_at = ?9
            WHERE id = ?10
            "#,
            params![
                question.title,
                question.description,
                question.short_description,
                question.status.as_str(),
                question.question_type.as_str(),
                updated_at,
                question.published_at,
                question.completed_at,
                question.archived_at,
                question.id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::NotFound(format!("Question {}", question.id)));
        }
        question.updated_at = updated_at;
        Ok(())
    }

    fn move_question(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut conn = self.lock()?;
        swap_with_neighbour(&mut conn, "census_questions", None, id, direction)
    }

    fn create_answer(&self, question_id: i64, answer: NewAnswer) -> Result<Answer, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        question_exists(&tx, question_id)?;
        let timestamp = now();

        let max: Option<i64> = tx.query_row(
            "SELECT MAX(position) FROM census_answers WHERE question_id = ?1",
            params![question_id],
            |row| row.get(0),
        )?;
        let position = next_position(max);

        tx.execute(
            r#"
            INSERT INTO census_answers
                (question_id, value, text, position, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![question_id, answer.value, answer.text, position, timestamp],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Answer {
            id,
            question_id,
            value: answer.value,
            text: answer.text,
            position,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    fn get_answer(&self, id: i64) -> Result<Option<Answer>, StorageError> {
        let conn = self.lock()?;
        let answer = conn
            .query_row(
                &format!("SELECT {ANSWER_COLUMNS} FROM census_answers WHERE id = ?1"),
                params![id],
                answer_from_row,
            )
            .optional()?;
        Ok(answer)
    }

    fn list_answers(&self, question_id: i64) -> Result<Vec<Answer>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ANSWER_COLUMNS} FROM census_answers
             WHERE question_id = ?1
             ORDER BY position ASC, id ASC"
        ))?;
        let answers = stmt
            .query_map(params![question_id], answer_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(answers)
    }

    fn move_answer(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut conn = self.lock()?;
        swap_with_neighbour(&mut conn, "census_answers", Some("question_id"), id, direction)
    }

    fn list_replies(&self, question_id: i64) -> Result<Vec<Reply>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPLY_COLUMNS} FROM census_replies
             WHERE question_id = ?1
             ORDER BY position ASC, id ASC"
        ))?;
        let replies = stmt
            .query_map(params![question_id], reply_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(replies)
    }

    fn count_replies(&self, question_id: i64) -> Result<i64, StorageError> {
        let conn = self.lock()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM census_replies WHERE question_id = ?1",
            params![question_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn move_reply(&self, id: i64, direction: Direction) -> Result<bool, StorageError> {
        let mut conn = self.lock()?;
        swap_with_neighbour(&mut conn, "census_replies", Some("question_id"), id, direction)
    }

    fn in_transaction(&self, unit: &mut ReplyUnit<'_>) -> Result<Reply, CensusError> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the write lock up front so the duplicate check and
        // the insert cannot interleave with another writer.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        let reply = {
            let mut scope = SqliteScope { conn: &tx };
            unit(&mut scope)?
        };

        tx.commit().map_err(StorageError::from)?;
        Ok(reply)
    }
}

struct SqliteScope<'a> {
    conn: &'a Connection,
}

impl ReplyScope for SqliteScope<'_> {
    fn question_status(&mut self, question_id: i64) -> Result<QuestionStatus, StorageError> {
        self.conn
            .query_row(
                "SELECT status FROM census_questions WHERE id = ?1",
                params![question_id],
                |row| parse_column(row, 0),
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("Question {}", question_id)))
    }

    fn reply_exists(&mut self, question_id: i64, replier: &UserId) -> Result<bool, StorageError> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM census_replies WHERE question_id = ?1 AND replier = ?2")?
            .exists(params![question_id, replier.as_str()])?;
        Ok(exists)
    }

    fn find_answer(
        &mut self,
        question_id: i64,
        value: &str,
    ) -> Result<Option<Answer>, StorageError> {
        let answer = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ANSWER_COLUMNS} FROM census_answers
                     WHERE question_id = ?1 AND value = ?2"
                ),
                params![question_id, value],
                answer_from_row,
            )
            .optional()?;
        Ok(answer)
    }

    fn answer_belongs(&mut self, question_id: i64, answer_id: i64) -> Result<bool, StorageError> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM census_answers WHERE id = ?1 AND question_id = ?2")?
            .exists(params![answer_id, question_id])?;
        Ok(exists)
    }

    fn insert_reply(&mut self, reply: NewReply) -> Result<Reply, StorageError> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(position) FROM census_replies WHERE question_id = ?1",
            params![reply.question_id],
            |row| row.get(0),
        )?;
        let position = next_position(max);

        self.conn.execute(
            r#"
            INSERT INTO census_replies
                (question_id, replier, answer_id, text, position, replied_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                reply.question_id,
                reply.replier.as_str(),
                reply.answer_id,
                reply.text,
                position,
                reply.replied_at,
            ],
        )?;

        Ok(Reply {
            id: self.conn.last_insert_rowid(),
            question_id: reply.question_id,
            replier: reply.replier,
            answer_id: reply.answer_id,
            text: reply.text,
            position,
            replied_at: reply.replied_at,
        })
    }
}
