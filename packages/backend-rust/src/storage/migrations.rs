//! Schema migrations
//!
//! Each migration runs in its own transaction and is recorded in
//! `schema_migrations`, so re-running is a no-op.

use rusqlite::Connection;

use crate::storage::{StorageError, StorageResult};

pub const CURRENT_SCHEMA_VERSION: i32 = 2;

const INIT_SCHEMA: &str = include_str!("schema.sql");

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// All migrations in version order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "initial tables", INIT_SCHEMA),
        Migration::new(
            2,
            "progress lookup indexes",
            r#"
            CREATE INDEX IF NOT EXISTS idx_progress_user_practiced
                ON practice_progress(user_id, last_practiced_at);

            CREATE INDEX IF NOT EXISTS idx_reference_difficulty
                ON gesture_reference(difficulty, name);
            "#,
        ),
    ]
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    Ok(())
}

pub fn get_current_version(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

pub fn run_migrations(conn: &Connection) -> StorageResult<()> {
    let current = get_current_version(conn)?;

    for migration in get_migrations()
        .into_iter()
        .filter(|m| m.version > current)
    {
        conn.execute_batch("BEGIN;")?;
        let applied = conn.execute_batch(&migration.sql).and_then(|_| {
            conn.execute(
                "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                rusqlite::params![migration.version, migration.name],
            )
        });

        match applied {
            Ok(_) => conn.execute_batch("COMMIT;")?,
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK;");
                return Err(StorageError::Migration(format!(
                    "migration {} ({}) failed: {}",
                    migration.version, migration.name, e
                )));
            }
        }

        tracing::info!(version = migration.version, name = %migration.name, "applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory connection");

        run_migrations(&conn).expect("first run failed");
        assert_eq!(get_current_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        run_migrations(&conn).expect("second run failed");
        assert_eq!(get_current_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_progress_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO practice_progress (user_id, gesture_id, attempts, successful_attempts)
             VALUES ('u', 'g', 1, 2)",
            [],
        );
        assert!(result.is_err());
    }
}
