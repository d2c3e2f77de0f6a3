//! Gesture comparison pipeline.
//!
//! normalize -> encode -> align -> score -> feedback, in that order. The
//! comparer is a plain value holding its configuration; construct one per
//! service rather than sharing a global.

use serde::{Deserialize, Serialize};

use crate::config::ComparisonConfig;
use crate::dtw::align;
use crate::encode::encode;
use crate::error::{GestureError, SequenceSide};
use crate::feedback::{generate_feedback, Feedback};
use crate::normalize::normalize_sequence;
use crate::progress::is_successful;
use crate::sanitize::check_frame_limit;
use crate::score::{score, ComparisonResult};
use crate::types::LandmarkSequence;

// ============================================================================
// Outcomes
// ============================================================================

/// A measured comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub result: ComparisonResult,
    pub feedback: Feedback,
    /// Similarity reached the pass threshold
    pub passed: bool,
}

/// Outcome of a comparison request.
///
/// `NoHandDetected` and `NoReference` are not low scores: nothing could be
/// measured, and callers must not treat them as failed attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Scored(Evaluation),
    NoHandDetected,
    NoReference,
}

impl ComparisonOutcome {
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            ComparisonOutcome::Scored(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    pub fn similarity_score(&self) -> f64 {
        self.evaluation()
            .map(|e| e.result.similarity_score)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// GestureComparer
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct GestureComparer {
    config: ComparisonConfig,
}

impl GestureComparer {
    pub fn new(config: ComparisonConfig) -> Result<Self, GestureError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Run the full pipeline. Errors only on inputs beyond `max_frames`;
    /// empty or hand-less sequences produce a dedicated outcome.
    pub fn compare(
        &self,
        reference: &LandmarkSequence,
        attempt: &LandmarkSequence,
    ) -> Result<ComparisonOutcome, GestureError> {
        check_frame_limit(reference, SequenceSide::Reference, self.config.max_frames)?;
        check_frame_limit(attempt, SequenceSide::Attempt, self.config.max_frames)?;

        if !reference.has_any_hand() {
            tracing::debug!(frames = reference.len(), "reference has no landmarks");
            return Ok(ComparisonOutcome::NoReference);
        }
        if !attempt.has_any_hand() {
            tracing::debug!(frames = attempt.len(), "attempt has no landmarks");
            return Ok(ComparisonOutcome::NoHandDetected);
        }

        let reference_encoded = encode(&normalize_sequence(reference));
        let attempt_encoded = encode(&normalize_sequence(attempt));

        let alignment = align(&reference_encoded, &attempt_encoded);
        let result = score(&alignment, &self.config.scoring);
        let feedback = generate_feedback(&result, &self.config.feedback);
        let passed = is_successful(result.similarity_score, &self.config.mastery);

        tracing::debug!(
            reference_frames = reference.len(),
            attempt_frames = attempt.len(),
            path_len = result.path.len(),
            distance = alignment.distance,
            similarity = result.similarity_score,
            rating = %feedback.rating,
            "gesture compared"
        );

        Ok(ComparisonOutcome::Scored(Evaluation {
            result,
            feedback,
            passed,
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
