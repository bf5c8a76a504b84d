/// Create the census_questions table
pub fn migration() -> String {
    r#"
CREATE TABLE census_questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    short_description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published', 'completed', 'archived')),
    question_type TEXT NOT NULL DEFAULT 'single' CHECK (question_type IN ('text', 'single', 'multi')),
    position INTEGER NOT NULL,
    author TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    published_at INTEGER,
    completed_at INTEGER,
    archived_at INTEGER
);

CREATE UNIQUE INDEX idx_census_questions_code
    ON census_questions(code);

CREATE INDEX idx_census_questions_position
    ON census_questions(position);
"#
    .to_string()
}
