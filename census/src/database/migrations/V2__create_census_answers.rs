/// Create the census_answers table holding the choices of each question
pub fn migration() -> String {
    r#"
CREATE TABLE census_answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL,
    value TEXT NOT NULL,
    text TEXT NOT NULL,
    position INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    FOREIGN KEY (question_id) REFERENCES census_questions (id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX idx_census_answers_question_value
    ON census_answers(question_id, value);

CREATE INDEX idx_census_answers_position
    ON census_answers(question_id, position);
"#
    .to_string()
}
