pub mod comparison;
pub mod detector;
pub mod progress_store;

pub use comparison::{AttemptReport, ComparisonService, ProgressUpdate};
pub use detector::{extract_landmarks, DetectorError, LandmarkDetector, RasterFrame};
pub use progress_store::{InMemoryProgressStore, ProgressStore};

use gesture_algo::GestureError;

use crate::storage::StorageError;

// ============================================================
// Errors
// ============================================================

/// Shown instead of internal error details
pub const NEUTRAL_ERROR_MESSAGE: &str = "We could not evaluate this attempt. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("reference gesture not found: {0}")]
    ReferenceNotFound(String),
    #[error(transparent)]
    Gesture(#[from] GestureError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Text safe to show a learner; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ServiceError::ReferenceNotFound(_) => "This gesture is not available for practice yet.",
            _ => NEUTRAL_ERROR_MESSAGE,
        }
    }
}
