//! Practice progress repository

use gesture_algo::{MasteryPolicy, PracticeProgressRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use crate::storage::{lock_connection, StorageResult};

// ============================================================
// ProgressRepository
// ============================================================

pub struct ProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn get_progress(
        &self,
        user_id: &str,
        gesture_id: &str,
    ) -> StorageResult<Option<PracticeProgressRecord>> {
        let conn = lock_connection(&self.conn)?;
        select_record(&conn, user_id, gesture_id)
    }

    /// Most recently practiced first; never-practiced rows last
    pub fn list_progress_by_user(&self, user_id: &str) -> StorageResult<Vec<PracticeProgressRecord>> {
        let conn = lock_connection(&self.conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM practice_progress
            WHERE user_id = ?1
            ORDER BY last_practiced_at IS NULL, last_practiced_at DESC, gesture_id
            "#,
        )?;

        let records = stmt
            .query_map(params![user_id], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Apply one attempt atomically. The read-modify-write runs in a single
    /// transaction while holding the connection lock, so concurrent callers
    /// for the same (user, gesture) never lose an increment.
    pub fn record_attempt(
        &self,
        user_id: &str,
        gesture_id: &str,
        is_successful: bool,
        practiced_at: i64,
        policy: &MasteryPolicy,
    ) -> StorageResult<PracticeProgressRecord> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction()?;

        let current = select_record(&tx, user_id, gesture_id)?
            .unwrap_or_else(|| PracticeProgressRecord::new(user_id, gesture_id));
        let next = gesture_algo::record_attempt(&current, is_successful, practiced_at, policy);

        tx.execute(
            r#"
            INSERT INTO practice_progress
                (user_id, gesture_id, attempts, successful_attempts, mastered, last_practiced_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, gesture_id) DO UPDATE SET
                attempts = excluded.attempts,
                successful_attempts = excluded.successful_attempts,
                mastered = excluded.mastered,
                last_practiced_at = excluded.last_practiced_at
            "#,
            params![
                next.user_id,
                next.gesture_id,
                next.attempts,
                next.successful_attempts,
                next.mastered as i32,
                next.last_practiced_at,
            ],
        )?;
        tx.commit()?;

        if next.mastered && !current.mastered {
            tracing::info!(user_id, gesture_id, attempts = next.attempts, "gesture mastered");
        }

        Ok(next)
    }
}

// ============================================================
// Row helpers
// ============================================================

fn select_record(
    conn: &Connection,
    user_id: &str,
    gesture_id: &str,
) -> StorageResult<Option<PracticeProgressRecord>> {
    let record = conn
        .query_row(
            "SELECT * FROM practice_progress WHERE user_id = ?1 AND gesture_id = ?2",
            params![user_id, gesture_id],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PracticeProgressRecord> {
    Ok(PracticeProgressRecord {
        user_id: row.get("user_id")?,
        gesture_id: row.get("gesture_id")?,
        attempts: row.get("attempts")?,
        successful_attempts: row.get("successful_attempts")?,
        mastered: row.get::<_, i32>("mastered")? != 0,
        last_practiced_at: row.get("last_practiced_at")?,
    })
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DatabaseManager;
    use gesture_algo::PracticeStage;

    fn repo() -> ProgressRepository {
        DatabaseManager::in_memory()
            .expect("Failed to create in-memory database")
            .progress()
    }

    #[test]
    fn test_missing_progress_is_none() {
        assert!(repo().get_progress("u", "g").unwrap().is_none());
    }

    #[test]
    fn test_first_attempt_creates_row() {
        let repo = repo();
        let record = repo
            .record_attempt("u", "g", false, 1_000, &MasteryPolicy::default())
            .unwrap();

        assert_eq!(record.attempts, 1);
        assert_eq!(record.successful_attempts, 0);
        assert_eq!(record.stage(), PracticeStage::Practicing);

        let stored = repo.get_progress("u", "g").unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn test_mastery_persists() {
        let repo = repo();
        let policy = MasteryPolicy::default();
        for t in 0..3 {
            repo.record_attempt("u", "g", true, t, &policy).unwrap();
        }
        let record = repo.record_attempt("u", "g", false, 10, &policy).unwrap();

        assert_eq!(record.attempts, 4);
        assert_eq!(record.successful_attempts, 3);
        assert!(record.mastered);
        assert!(repo.get_progress("u", "g").unwrap().unwrap().mastered);
    }

    #[test]
    fn test_records_are_scoped_per_user_and_gesture() {
        let repo = repo();
        let policy = MasteryPolicy::default();
        repo.record_attempt("u1", "g1", true, 1, &policy).unwrap();
        repo.record_attempt("u1", "g2", true, 5, &policy).unwrap();
        repo.record_attempt("u2", "g1", false, 3, &policy).unwrap();

        let listed = repo.list_progress_by_user("u1").unwrap();
        let gestures: Vec<&str> = listed.iter().map(|r| r.gesture_id.as_str()).collect();
        assert_eq!(gestures, vec!["g2", "g1"]);

        let other = repo.get_progress("u2", "g1").unwrap().unwrap();
        assert_eq!(other.attempts, 1);
        assert_eq!(other.successful_attempts, 0);
    }
}
