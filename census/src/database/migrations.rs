use refinery::embed_migrations;

// Embed migrations from the migrations directory
embed_migrations!("src/database/migrations");

/// Run census migrations on a database connection
///
/// Creates the survey tables:
/// - census_questions: questions with status, type and ordering
/// - census_answers: ordered choices of a question
/// - census_replies: one reply per user and question
///
/// Public so that host applications can migrate their own connection before
/// handing it to [`crate::storage::SqliteStorage::new`].
///
/// # Example
/// ```no_run
/// use rusqlite::Connection;
/// use census::database::migrations::run_census_migrations;
///
/// let mut conn = Connection::open("census.db")?;
/// run_census_migrations(&mut conn)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_census_migrations<C>(conn: &mut C) -> anyhow::Result<()>
where
    C: refinery::Migrate,
{
    migrations::runner().run(conn)?;
    Ok(())
}

/// Check if census tables exist in database
pub fn has_census_schema(conn: &rusqlite::Connection) -> anyhow::Result<bool> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='census_questions'")?;
    Ok(stmt.exists([])?)
}
