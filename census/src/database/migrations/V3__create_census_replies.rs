/// Create the census_replies table
///
/// The unique index on (question_id, replier) backs the one-reply-per-user
/// rule when two admissions race.
pub fn migration() -> String {
    r#"
CREATE TABLE census_replies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL,
    replier TEXT NOT NULL,
    answer_id INTEGER,
    text TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL,
    replied_at INTEGER NOT NULL,
    FOREIGN KEY (question_id) REFERENCES census_questions (id) ON DELETE CASCADE,
    FOREIGN KEY (answer_id) REFERENCES census_answers (id) ON DELETE SET NULL
);

CREATE UNIQUE INDEX idx_census_replies_question_replier
    ON census_replies(question_id, replier);

CREATE INDEX idx_census_replies_position
    ON census_replies(question_id, position);
"#
    .to_string()
}
