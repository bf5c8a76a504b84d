pub mod migrations;

#[cfg(test)]
mod migrations_test;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type DbConnection = Arc<Mutex<Connection>>;

/// A migrated SQLite connection shared behind a mutex.
pub struct Database {
    connection: DbConnection,
}

impl Database {
    /// Opens the database at `db_path` (`:memory:` for a private in-memory
    /// database) and brings the census schema up to date.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let in_memory = db_path.as_os_str() == ":memory:";
        if !in_memory {
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let mut conn = if in_memory {
            Connection::open_in_memory()?
        } else {
            Connection::open(db_path)?
        };
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations::run_census_migrations(&mut conn)?;

        tracing::debug!(path = %db_path.display(), "Census database ready");

        Ok(Database {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> DbConnection {
        self.connection.clone()
    }
}
