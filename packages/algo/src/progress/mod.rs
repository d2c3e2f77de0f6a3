//! Practice Progress
//!
//! Per (user, gesture) counters and the one-way mastery flag.
//!
//! Stages are derived from the counters, never stored:
//! - New: no attempts yet
//! - Practicing: at least one attempt, not mastered
//! - Mastered: `successful >= min_successful_attempts` and
//!   `accuracy >= min_accuracy` were met at some attempt; never cleared

use serde::{Deserialize, Serialize};

use crate::config::MasteryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeStage {
    New,
    Practicing,
    Mastered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeProgressRecord {
    pub user_id: String,
    pub gesture_id: String,
    pub attempts: u32,
    /// Always <= attempts
    pub successful_attempts: u32,
    pub mastered: bool,
    /// Epoch milliseconds of the latest attempt
    pub last_practiced_at: Option<i64>,
}

impl PracticeProgressRecord {
    pub fn new(user_id: impl Into<String>, gesture_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            gesture_id: gesture_id.into(),
            attempts: 0,
            successful_attempts: 0,
            mastered: false,
            last_practiced_at: None,
        }
    }

    /// Success rate in percent; 0 before the first attempt
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successful_attempts as f64 / self.attempts as f64 * 100.0
    }

    pub fn stage(&self) -> PracticeStage {
        if self.mastered {
            PracticeStage::Mastered
        } else if self.attempts == 0 {
            PracticeStage::New
        } else {
            PracticeStage::Practicing
        }
    }
}

/// Pass/fail verdict for a similarity score
pub fn is_successful(similarity_score: f64, policy: &MasteryPolicy) -> bool {
    similarity_score >= policy.pass_threshold
}

pub fn meets_mastery(record: &PracticeProgressRecord, policy: &MasteryPolicy) -> bool {
    record.successful_attempts >= policy.min_successful_attempts
        && record.accuracy() >= policy.min_accuracy
}

/// Apply one attempt to a record. Pure; persisting the result is up to the
/// caller, which must serialize concurrent updates of the same record.
pub fn record_attempt(
    record: &PracticeProgressRecord,
    is_successful: bool,
    practiced_at: i64,
    policy: &MasteryPolicy,
) -> PracticeProgressRecord {
    let mut next = record.clone();
    next.attempts = next.attempts.saturating_add(1);
    if is_successful {
        next.successful_attempts = next.successful_attempts.saturating_add(1);
    }
    next.last_practiced_at = Some(practiced_at);

    if !next.mastered && meets_mastery(&next, policy) {
        tracing::debug!(
            user_id = %next.user_id,
            gesture_id = %next.gesture_id,
            attempts = next.attempts,
            "gesture mastered"
        );
        next.mastered = true;
    }

    next
}
