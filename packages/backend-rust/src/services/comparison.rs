//! Attempt evaluation
//!
//! Looks up the reference gesture, runs the comparer and records progress for
//! measured attempts. Attempts without a detected hand, and comparisons
//! against a reference without landmarks, leave progress untouched.

use std::sync::Arc;

use chrono::Utc;
use gesture_algo::{
    ComparisonConfig, ComparisonOutcome, GestureComparer, LandmarkSequence, PracticeProgressRecord,
};
use serde::Serialize;

use crate::services::detector::{extract_landmarks, LandmarkDetector, RasterFrame};
use crate::services::progress_store::ProgressStore;
use crate::services::{ServiceError, NEUTRAL_ERROR_MESSAGE};
use crate::storage::ReferenceRepository;

pub const NO_HAND_MESSAGE: &str =
    "No hand was detected. Make sure your hand is fully visible and try again.";

pub const NO_REFERENCE_MESSAGE: &str = "This gesture has no reference recording yet.";

// ============================================================
// Reports
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "record", rename_all = "snake_case")]
pub enum ProgressUpdate {
    Recorded(PracticeProgressRecord),
    /// Nothing was measured
    NotRecorded,
    /// The evaluation stands; persisting it failed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptReport {
    pub user_id: String,
    pub gesture_id: String,
    pub outcome: ComparisonOutcome,
    pub progress: ProgressUpdate,
}

impl AttemptReport {
    pub fn user_message(&self) -> String {
        match &self.outcome {
            ComparisonOutcome::Scored(evaluation) => {
                let feedback = &evaluation.feedback;
                format!(
                    "{} ({:.0}/100). {}",
                    feedback.rating,
                    feedback.overall_score,
                    feedback.weak_points.messages().join(" ")
                )
            }
            ComparisonOutcome::NoHandDetected => NO_HAND_MESSAGE.to_string(),
            ComparisonOutcome::NoReference => NO_REFERENCE_MESSAGE.to_string(),
        }
    }

    pub fn progress_record(&self) -> Option<&PracticeProgressRecord> {
        match &self.progress {
            ProgressUpdate::Recorded(record) => Some(record),
            _ => None,
        }
    }
}

// ============================================================
// ComparisonService
// ============================================================

pub struct ComparisonService {
    comparer: GestureComparer,
    references: ReferenceRepository,
    progress: Arc<dyn ProgressStore>,
}

impl ComparisonService {
    pub fn new(
        config: ComparisonConfig,
        references: ReferenceRepository,
        progress: Arc<dyn ProgressStore>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            comparer: GestureComparer::new(config)?,
            references,
            progress,
        })
    }

    pub fn comparer(&self) -> &GestureComparer {
        &self.comparer
    }

    pub fn evaluate_attempt(
        &self,
        user_id: &str,
        gesture_id: &str,
        attempt: &LandmarkSequence,
    ) -> Result<AttemptReport, ServiceError> {
        let reference = self
            .references
            .get_reference(gesture_id)?
            .ok_or_else(|| ServiceError::ReferenceNotFound(gesture_id.to_string()))?;

        let outcome = self
            .comparer
            .compare(&reference.landmarks, attempt)
            .inspect_err(|err| {
                tracing::warn!(user_id, gesture_id, error = %err, "attempt rejected");
            })?;

        let progress = match outcome.evaluation() {
            Some(evaluation) => self.record(user_id, gesture_id, evaluation.passed),
            None => ProgressUpdate::NotRecorded,
        };

        tracing::info!(
            user_id,
            gesture_id,
            similarity = outcome.similarity_score(),
            recorded = matches!(progress, ProgressUpdate::Recorded(_)),
            "attempt evaluated"
        );

        Ok(AttemptReport {
            user_id: user_id.to_string(),
            gesture_id: gesture_id.to_string(),
            outcome,
            progress,
        })
    }

    /// Evaluate an attempt in the detector JSON layout. Malformed input is a
    /// `ServiceError::Gesture`, shown to learners as the neutral message.
    pub fn evaluate_attempt_json(
        &self,
        user_id: &str,
        gesture_id: &str,
        attempt_json: &str,
    ) -> Result<AttemptReport, ServiceError> {
        let attempt = LandmarkSequence::from_json(attempt_json).inspect_err(|err| {
            tracing::warn!(user_id, gesture_id, error = %err, "malformed attempt landmarks");
        })?;
        self.evaluate_attempt(user_id, gesture_id, &attempt)
    }

    /// Detect landmarks in raw frames, then evaluate
    pub fn evaluate_frames(
        &self,
        user_id: &str,
        gesture_id: &str,
        detector: &dyn LandmarkDetector,
        frames: &[RasterFrame],
    ) -> Result<AttemptReport, ServiceError> {
        let attempt = extract_landmarks(detector, frames);
        self.evaluate_attempt(user_id, gesture_id, &attempt)
    }

    fn record(&self, user_id: &str, gesture_id: &str, passed: bool) -> ProgressUpdate {
        let now = Utc::now().timestamp_millis();
        match self.progress.record_attempt(
            user_id,
            gesture_id,
            passed,
            now,
            &self.comparer.config().mastery,
        ) {
            Ok(record) => ProgressUpdate::Recorded(record),
            Err(err) => {
                tracing::error!(user_id, gesture_id, error = %err, "failed to record progress");
                ProgressUpdate::Failed(NEUTRAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::detector::DetectorError;
    use crate::services::progress_store::InMemoryProgressStore;
    use crate::storage::{DatabaseManager, GestureReference, StorageError, StorageResult};
    use gesture_algo::{FrameLandmarks, HandFrame, MasteryPolicy, GestureError};

    fn hand(tip_y: f64) -> HandFrame {
        let mut coords = vec![[0.1, 0.1, 0.0]; 21];
        coords[0] = [0.0, 0.0, 0.0];
        coords[9] = [1.0, 0.0, 0.0];
        coords[8] = [0.5, tip_y, 0.0];
        HandFrame::from_coordinates(&coords).unwrap()
    }

    fn sequence(tips: &[f64]) -> LandmarkSequence {
        LandmarkSequence::new(tips.iter().map(|&t| FrameLandmarks::single(hand(t))).collect())
    }

    fn service_with(progress: Arc<dyn ProgressStore>) -> ComparisonService {
        let db = DatabaseManager::in_memory().unwrap();
        let references = db.references();
        references
            .save_reference(&GestureReference::new(
                "wave",
                "Wave",
                "hello",
                sequence(&[0.0, 0.2, 0.4, 0.2]),
            ))
            .unwrap();
        references
            .save_reference(&GestureReference::new(
                "blank",
                "Blank",
                "",
                LandmarkSequence::default(),
            ))
            .unwrap();
        ComparisonService::new(ComparisonConfig::default(), references, progress).unwrap()
    }

    fn service() -> (ComparisonService, Arc<InMemoryProgressStore>) {
        let store = Arc::new(InMemoryProgressStore::new());
        (service_with(store.clone()), store)
    }

    #[test]
    fn test_identical_attempt_passes_and_records() {
        let (service, store) = service();
        let report = service
            .evaluate_attempt("u", "wave", &sequence(&[0.0, 0.2, 0.4, 0.2]))
            .unwrap();

        let evaluation = report.outcome.evaluation().expect("scored");
        assert_eq!(evaluation.result.similarity_score, 100.0);
        assert!(evaluation.passed);

        let record = report.progress_record().expect("recorded");
        assert_eq!(record.attempts, 1);
        assert_eq!(record.successful_attempts, 1);
        assert_eq!(store.get_progress("u", "wave").unwrap().unwrap(), *record);
        assert!(report.user_message().starts_with("Excellent (100/100)."));
    }

    #[test]
    fn test_slower_attempt_still_scores_100() {
        let (service, _) = service();
        let report = service
            .evaluate_attempt("u", "wave", &sequence(&[0.0, 0.0, 0.2, 0.2, 0.4, 0.4, 0.2, 0.2]))
            .unwrap();
        assert_eq!(report.outcome.similarity_score(), 100.0);
    }

    #[test]
    fn test_no_hand_does_not_touch_progress() {
        let (service, store) = service();
        let attempt = LandmarkSequence::new(vec![FrameLandmarks::empty(); 5]);

        let report = service.evaluate_attempt("u", "wave", &attempt).unwrap();
        assert_eq!(report.outcome, ComparisonOutcome::NoHandDetected);
        assert_eq!(report.progress, ProgressUpdate::NotRecorded);
        assert_eq!(report.user_message(), NO_HAND_MESSAGE);
        assert!(store.get_progress("u", "wave").unwrap().is_none());
    }

    #[test]
    fn test_reference_without_landmarks() {
        let (service, store) = service();
        let report = service
            .evaluate_attempt("u", "blank", &sequence(&[0.1]))
            .unwrap();
        assert_eq!(report.outcome, ComparisonOutcome::NoReference);
        assert_eq!(report.user_message(), NO_REFERENCE_MESSAGE);
        assert!(store.get_progress("u", "blank").unwrap().is_none());
    }

    #[test]
    fn test_unknown_reference_is_an_error() {
        let (service, _) = service();
        let err = service
            .evaluate_attempt("u", "missing", &sequence(&[0.1]))
            .unwrap_err();
        assert!(matches!(err, ServiceError::ReferenceNotFound(ref id) if id == "missing"));
    }

    #[test]
    fn test_oversized_attempt_is_rejected_neutrally() {
        let (service, store) = service();
        let attempt = sequence(&vec![0.1; 901]);

        let err = service.evaluate_attempt("u", "wave", &attempt).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Gesture(GestureError::SequenceTooLong { .. })
        ));
        assert_eq!(err.user_message(), NEUTRAL_ERROR_MESSAGE);
        assert!(store.get_progress("u", "wave").unwrap().is_none());
    }

    #[test]
    fn test_malformed_attempt_json_is_neutral_and_unrecorded() {
        let (service, store) = service();
        // One hand with two landmarks instead of 21
        let err = service
            .evaluate_attempt_json("u", "wave", "[[[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]]]")
            .unwrap_err();

        assert!(matches!(err, ServiceError::Gesture(ref e) if e.is_malformed_input()));
        assert_eq!(err.user_message(), NEUTRAL_ERROR_MESSAGE);
        assert!(!err.user_message().contains("21"));
        assert!(store.get_progress("u", "wave").unwrap().is_none());

        let err = service.evaluate_attempt_json("u", "wave", "not json").unwrap_err();
        assert_eq!(err.user_message(), NEUTRAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_attempt_json_matches_in_memory_evaluation() {
        let (service, _) = service();
        let json = sequence(&[0.0, 0.2, 0.4, 0.2]).to_json().unwrap();
        let report = service.evaluate_attempt_json("u", "wave", &json).unwrap();
        assert_eq!(report.outcome.similarity_score(), 100.0);
    }

    struct BrokenStore;

    impl ProgressStore for BrokenStore {
        fn get_progress(&self, _: &str, _: &str) -> StorageResult<Option<PracticeProgressRecord>> {
            Ok(None)
        }

        fn record_attempt(
            &self,
            _: &str,
            _: &str,
            _: bool,
            _: i64,
            _: &MasteryPolicy,
        ) -> StorageResult<PracticeProgressRecord> {
            Err(StorageError::LockError("poisoned".to_string()))
        }
    }

    #[test]
    fn test_storage_failure_keeps_evaluation() {
        let service = service_with(Arc::new(BrokenStore));
        let report = service
            .evaluate_attempt("u", "wave", &sequence(&[0.0, 0.2, 0.4, 0.2]))
            .unwrap();

        assert_eq!(report.outcome.similarity_score(), 100.0);
        assert!(matches!(report.progress, ProgressUpdate::Failed(_)));
    }

    struct FixedDetector(Option<HandFrame>);

    impl LandmarkDetector for FixedDetector {
        fn detect(&self, _: &RasterFrame) -> Result<Vec<HandFrame>, DetectorError> {
            Ok(self.0.iter().cloned().collect())
        }
    }

    #[test]
    fn test_evaluate_frames_runs_detector() {
        let (service, _) = service();
        let frames = vec![RasterFrame::rgb(1, 1, vec![0, 0, 0]).unwrap(); 3];

        let report = service
            .evaluate_frames("u", "wave", &FixedDetector(None), &frames)
            .unwrap();
        assert_eq!(report.outcome, ComparisonOutcome::NoHandDetected);

        let report = service
            .evaluate_frames("u", "wave", &FixedDetector(Some(hand(0.2))), &frames)
            .unwrap();
        assert!(report.outcome.evaluation().is_some());
    }

    #[test]
    fn test_report_serializes_with_tags() {
        let (service, _) = service();
        let report = service
            .evaluate_attempt("u", "wave", &LandmarkSequence::default())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "no_hand_detected");
        assert_eq!(json["progress"]["state"], "not_recorded");
    }
}
