use crate::database::migrations::{has_census_schema, run_census_migrations};
use crate::database::Database;
use rusqlite::Connection;

#[test]
fn test_census_migrations() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert!(!has_census_schema(&conn).unwrap());

    run_census_migrations(&mut conn).expect("Migrations should succeed");

    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert!(tables.contains(&"census_questions".to_string()));
    assert!(tables.contains(&"census_answers".to_string()));
    assert!(tables.contains(&"census_replies".to_string()));
    assert!(tables.contains(&"refinery_schema_history".to_string()));
    assert!(has_census_schema(&conn).unwrap());
}

#[test]
fn test_migrations_are_idempotent() {
    let mut conn = Connection::open_in_memory().unwrap();

    run_census_migrations(&mut conn).expect("First migration should succeed");
    run_census_migrations(&mut conn).expect("Second migration should succeed");

    let migration_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
            row.get(0)
        })
        .unwrap();

    assert_eq!(migration_count, 3);
}

#[test]
fn test_reply_uniqueness_is_enforced_by_schema() {
    let mut conn = Connection::open_in_memory().unwrap();
    run_census_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO census_questions (code, title, position, author, created_at, updated_at)
         VALUES ('q', 'Q', 0, 'admin', 1, 1)",
        [],
    )
    .unwrap();
    let insert = "INSERT INTO census_replies (question_id, replier, position, replied_at)
                  VALUES (1, 'member', ?1, 1)";
    conn.execute(insert, [0]).unwrap();

    let err = conn.execute(insert, [1]).unwrap_err();
    assert!(matches!(
        crate::storage::StorageError::from(err),
        crate::storage::StorageError::UniqueViolation(_)
    ));
}

#[test]
fn test_status_check_constraint() {
    let mut conn = Connection::open_in_memory().unwrap();
    run_census_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO census_questions (code, title, status, position, author, created_at, updated_at)
         VALUES ('q', 'Q', 'closed', 0, 'admin', 1, 1)",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn test_database_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("census.db");

    let database = Database::new(&path).unwrap();
    assert!(path.exists());

    let conn = database.connection();
    let conn = conn.lock().unwrap();
    assert!(has_census_schema(&conn).unwrap());
}
