//! Tunable parameters of the comparison pipeline.
//!
//! The score scale and jump threshold are empirical values carried over
//! from the first version of the trainer; they have no derivation and are
//! meant to be overridden rather than re-derived.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

/// Points subtracted per unit of Euclidean distance
pub const DEFAULT_SCORE_SCALE: f64 = 10.0;

/// Frame-score change that starts a new feedback segment
pub const DEFAULT_JUMP_THRESHOLD: f64 = 15.0;

/// Segments averaging below this are reported as weak
pub const DEFAULT_WEAK_SEGMENT_THRESHOLD: f64 = 70.0;

/// Similarity needed for an attempt to count as successful
pub const DEFAULT_PASS_THRESHOLD: f64 = 80.0;

pub const DEFAULT_MIN_SUCCESSFUL_ATTEMPTS: u32 = 3;

pub const DEFAULT_MIN_MASTERY_ACCURACY: f64 = 70.0;

/// Per-side frame ceiling; DTW is O(R*A)
pub const DEFAULT_MAX_FRAMES: usize = 900;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub score_scale: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            score_scale: DEFAULT_SCORE_SCALE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub jump_threshold: f64,
    pub weak_segment_threshold: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
            weak_segment_threshold: DEFAULT_WEAK_SEGMENT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryPolicy {
    pub pass_threshold: f64,
    pub min_successful_attempts: u32,
    pub min_accuracy: f64,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            min_successful_attempts: DEFAULT_MIN_SUCCESSFUL_ATTEMPTS,
            min_accuracy: DEFAULT_MIN_MASTERY_ACCURACY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub scoring: ScoringConfig,
    pub feedback: FeedbackConfig,
    pub mastery: MasteryPolicy,
    /// `None` disables the ceiling
    pub max_frames: Option<usize>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            feedback: FeedbackConfig::default(),
            mastery: MasteryPolicy::default(),
            max_frames: Some(DEFAULT_MAX_FRAMES),
        }
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<(), GestureError> {
        let scale = self.scoring.score_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GestureError::InvalidConfig(format!(
                "score_scale must be positive, got {scale}"
            )));
        }

        let jump = self.feedback.jump_threshold;
        if !jump.is_finite() || jump < 0.0 {
            return Err(GestureError::InvalidConfig(format!(
                "jump_threshold must be non-negative, got {jump}"
            )));
        }

        for (name, value) in [
            ("weak_segment_threshold", self.feedback.weak_segment_threshold),
            ("pass_threshold", self.mastery.pass_threshold),
            ("min_accuracy", self.mastery.min_accuracy),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(GestureError::InvalidConfig(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }

        if self.max_frames == Some(0) {
            return Err(GestureError::InvalidConfig(
                "max_frames must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
