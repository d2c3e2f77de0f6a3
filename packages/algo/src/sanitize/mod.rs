//! Input Sanitization
//!
//! Boundary checks for detector output.
//!
//! Functions:
//! - Landmark count validation (the 21-point contract)
//! - Non-finite coordinate detection
//! - Frame-count ceiling for DTW inputs

use crate::error::{GestureError, SequenceSide};
use crate::types::{LandmarkPoint, LandmarkSequence, LANDMARKS_PER_HAND};

/// Enforce the detector contract for one hand
pub fn validate_hand_points(points: &[LandmarkPoint]) -> Result<(), GestureError> {
    if points.len() != LANDMARKS_PER_HAND {
        return Err(GestureError::MalformedLandmarks {
            expected: LANDMARKS_PER_HAND,
            actual: points.len(),
        });
    }

    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(GestureError::NonFiniteCoordinate { index });
    }

    Ok(())
}

/// Bound DTW cost: O(R*A) time and memory
pub fn check_frame_limit(
    sequence: &LandmarkSequence,
    side: SequenceSide,
    max_frames: Option<usize>,
) -> Result<(), GestureError> {
    match max_frames {
        Some(max) if sequence.len() > max => Err(GestureError::SequenceTooLong {
            side,
            len: sequence.len(),
            max,
        }),
        _ => Ok(()),
    }
}
