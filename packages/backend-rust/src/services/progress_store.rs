//! Progress persistence seam
//!
//! Updates to one (user, gesture) record must be serialized; independent
//! records may proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use gesture_algo::{MasteryPolicy, PracticeProgressRecord};
use parking_lot::Mutex;

use crate::storage::{ProgressRepository, StorageResult};

// ============================================================
// ProgressStore
// ============================================================

pub trait ProgressStore: Send + Sync {
    fn get_progress(
        &self,
        user_id: &str,
        gesture_id: &str,
    ) -> StorageResult<Option<PracticeProgressRecord>>;

    fn record_attempt(
        &self,
        user_id: &str,
        gesture_id: &str,
        is_successful: bool,
        practiced_at: i64,
        policy: &MasteryPolicy,
    ) -> StorageResult<PracticeProgressRecord>;
}

// ============================================================
// SQLite store
// ============================================================

impl ProgressStore for ProgressRepository {
    fn get_progress(
        &self,
        user_id: &str,
        gesture_id: &str,
    ) -> StorageResult<Option<PracticeProgressRecord>> {
        ProgressRepository::get_progress(self, user_id, gesture_id)
    }

    fn record_attempt(
        &self,
        user_id: &str,
        gesture_id: &str,
        is_successful: bool,
        practiced_at: i64,
        policy: &MasteryPolicy,
    ) -> StorageResult<PracticeProgressRecord> {
        ProgressRepository::record_attempt(
            self,
            user_id,
            gesture_id,
            is_successful,
            practiced_at,
            policy,
        )
    }
}

// ============================================================
// In-memory store
// ============================================================

type RecordKey = (String, String);

/// Process-local store with one lock per record
#[derive(Default)]
pub struct InMemoryProgressStore {
    records: Mutex<HashMap<RecordKey, Arc<Mutex<PracticeProgressRecord>>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user_id: &str, gesture_id: &str) -> Arc<Mutex<PracticeProgressRecord>> {
        let mut records = self.records.lock();
        records
            .entry((user_id.to_string(), gesture_id.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(PracticeProgressRecord::new(user_id, gesture_id))))
            .clone()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn get_progress(
        &self,
        user_id: &str,
        gesture_id: &str,
    ) -> StorageResult<Option<PracticeProgressRecord>> {
        let slot = {
            let records = self.records.lock();
            records
                .get(&(user_id.to_string(), gesture_id.to_string()))
                .cloned()
        };
        Ok(slot
            .map(|slot| slot.lock().clone())
            .filter(|record| record.attempts > 0))
    }

    fn record_attempt(
        &self,
        user_id: &str,
        gesture_id: &str,
        is_successful: bool,
        practiced_at: i64,
        policy: &MasteryPolicy,
    ) -> StorageResult<PracticeProgressRecord> {
        let slot = self.entry(user_id, gesture_id);
        let mut record = slot.lock();
        let next = gesture_algo::record_attempt(&record, is_successful, practiced_at, policy);
        *record = next.clone();
        Ok(next)
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_unknown_record_is_none() {
        let store = InMemoryProgressStore::new();
        assert!(store.get_progress("u", "g").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_attempts_are_not_lost() {
        let store = Arc::new(InMemoryProgressStore::new());
        let policy = MasteryPolicy::default();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                let policy = policy.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .record_attempt("u", "g", (worker + i) % 2 == 0, i, &policy)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = store.get_progress("u", "g").unwrap().unwrap();
        assert_eq!(record.attempts, 400);
        assert_eq!(record.successful_attempts, 200);
    }
}
