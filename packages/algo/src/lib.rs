//! # gesture-algo - gesture practice core algorithms
//!
//! Compares a learner's recorded hand gesture with a reference gesture:
//!
//! - **Normalization** - translation and scale invariant hand poses
//! - **Encoding** - one 63-dimensional vector per frame
//! - **DTW** - speed-invariant alignment of reference and attempt
//! - **Scoring** - overall and per-frame similarity in [0, 100]
//! - **Feedback** - rating label and weak motion segments
//! - **Progress** - attempt counters and one-way mastery
//!
//! ## Module structure
//!
//! - [`types`] - landmark types and constants
//! - [`sanitize`] - detector contract checks
//! - [`normalize`] - per-frame normalization
//! - [`encode`] - frame vectors
//! - [`dtw`] - alignment engine
//! - [`score`] - similarity scores
//! - [`feedback`] - ratings and weak segments
//! - [`progress`] - practice progress transitions
//! - [`comparer`] - the full pipeline
//! - [`config`] - tunable thresholds
//!
//! ## Example
//!
//! ```rust
//! use gesture_algo::{FrameLandmarks, GestureComparer, HandFrame, LandmarkSequence};
//!
//! let mut coords = vec![[0.0, 0.0, 0.0]; 21];
//! coords[9] = [1.0, 0.0, 0.0];
//! let hand = HandFrame::from_coordinates(&coords).unwrap();
//! let reference = LandmarkSequence::new(vec![FrameLandmarks::single(hand)]);
//!
//! let outcome = GestureComparer::default()
//!     .compare(&reference, &reference.clone())
//!     .unwrap();
//! assert_eq!(outcome.similarity_score(), 100.0);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod comparer;
pub mod config;
pub mod dtw;
pub mod encode;
pub mod error;
pub mod feedback;
pub mod normalize;
pub mod progress;
pub mod sanitize;
pub mod score;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use comparer::{ComparisonOutcome, Evaluation, GestureComparer};
pub use config::{ComparisonConfig, FeedbackConfig, MasteryPolicy, ScoringConfig};
pub use dtw::{align, Alignment};
pub use encode::encode;
pub use error::{GestureError, SequenceSide};
pub use feedback::{
    analyze_weak_segments, generate_feedback, rating_for, Feedback, Rating, WeakPoints,
    WeakSegment,
};
pub use normalize::{normalize, normalize_sequence};
pub use progress::{is_successful, record_attempt, PracticeProgressRecord, PracticeStage};
pub use score::{score, ComparisonResult};
