//! Similarity Scoring
//!
//! Linear penalty model on top of the DTW output:
//! - overall   = max(0, 100 - mean_pair_cost * scale)
//! - per pair  = max(0, 100 - pair_cost * scale)
//!
//! `scale` (default 10) converts distances between normalized hands into
//! points. It is a tunable heuristic, not a calibrated model.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::dtw::Alignment;
use crate::types::AlignmentPath;

pub const MAX_SCORE: f64 = 100.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Overall similarity in [0, 100]
    pub similarity_score: f64,
    /// One score per entry of `path`, each in [0, 100]
    pub frame_scores: Vec<f64>,
    pub path: AlignmentPath,
    /// False when there was nothing to align
    pub comparable: bool,
}

impl ComparisonResult {
    pub fn not_comparable() -> Self {
        Self::default()
    }
}

#[inline]
pub fn distance_to_score(distance: f64, scale: f64) -> f64 {
    let score = MAX_SCORE - distance * scale;
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

pub fn score(alignment: &Alignment, config: &ScoringConfig) -> ComparisonResult {
    if alignment.is_empty() {
        return ComparisonResult::not_comparable();
    }

    let scale = config.score_scale;
    let frame_scores = alignment
        .pair_costs
        .iter()
        .map(|&cost| distance_to_score(cost, scale))
        .collect();

    ComparisonResult {
        similarity_score: distance_to_score(alignment.mean_cost(), scale),
        frame_scores,
        path: alignment.path.clone(),
        comparable: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtw::align;
    use crate::types::{EncodedSequence, FEATURE_DIMENSION};

    #[test]
    fn test_empty_alignment_is_not_comparable() {
        let result = score(&Alignment::default(), &ScoringConfig::default());
        assert_eq!(result.similarity_score, 0.0);
        assert!(result.frame_scores.is_empty());
        assert!(!result.comparable);
    }

    #[test]
    fn test_overall_uses_mean_pair_cost() {
        let alignment = Alignment {
            distance: 3.0,
            path: vec![(0, 0), (1, 1), (2, 2)],
            pair_costs: vec![0.5, 1.0, 1.5],
        };
        let result = score(&alignment, &ScoringConfig::default());

        assert!((result.similarity_score - 90.0).abs() < 1e-12);
        assert_eq!(result.frame_scores, vec![95.0, 90.0, 85.0]);
        assert_eq!(result.frame_scores.len(), result.path.len());
        assert!(result.comparable);
    }

    #[test]
    fn test_scores_clamp_at_zero() {
        let alignment = Alignment {
            distance: 50.0,
            path: vec![(0, 0)],
            pair_costs: vec![50.0],
        };
        let result = score(&alignment, &ScoringConfig::default());
        assert_eq!(result.similarity_score, 0.0);
        assert_eq!(result.frame_scores, vec![0.0]);
    }

    #[test]
    fn test_custom_scale() {
        let alignment = Alignment {
            distance: 2.0,
            path: vec![(0, 0), (1, 1)],
            pair_costs: vec![1.0, 1.0],
        };
        let result = score(&alignment, &ScoringConfig { score_scale: 20.0 });
        assert!((result.similarity_score - 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_hand_frames_score_low_but_deterministic() {
        let mut hand = [0.0; FEATURE_DIMENSION];
        hand[27] = 1.0; // middle MCP x after normalization
        hand[3] = 0.4;
        let norm = (1.0f64 + 0.16).sqrt();

        let reference = EncodedSequence::new(vec![hand; 10]);
        let attempt = EncodedSequence::new(vec![[0.0; FEATURE_DIMENSION]; 10]);
        let result = score(&align(&reference, &attempt), &ScoringConfig::default());

        let expected = (100.0 - norm * 10.0).max(0.0);
        assert!(result.comparable);
        assert!(!result.frame_scores.is_empty());
        for s in &result.frame_scores {
            assert!((s - expected).abs() < 1e-9);
        }
    }
}
