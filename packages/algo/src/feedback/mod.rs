//! Weak-Segment Feedback
//!
//! Turns per-frame scores into a rating label and a list of segments the
//! learner should work on.
//!
//! Segmentation walks the scores left to right. A segment closes at the last
//! index or when the score jumps by more than `jump_threshold` from the
//! previous frame; the frame that triggered the jump closes the old segment
//! and the next one starts after it. Segments averaging below
//! `weak_segment_threshold` are reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FeedbackConfig;
use crate::score::ComparisonResult;

// ============================================================================
// Messages and Ratings
// ============================================================================

pub const MATCHES_THROUGHOUT_MESSAGE: &str =
    "Your gesture matches the template well throughout the entire motion.";

pub const UNAVAILABLE_MESSAGE: &str = "Unable to identify specific areas for improvement.";

/// Rating tiers; lower bounds are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    VeryGood,
    Good,
    Fair,
    NeedsPractice,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::VeryGood => "Very Good",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::NeedsPractice => "Needs Practice",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn rating_for(score: f64) -> Rating {
    if score >= 90.0 {
        Rating::Excellent
    } else if score >= 80.0 {
        Rating::VeryGood
    } else if score >= 70.0 {
        Rating::Good
    } else if score >= 60.0 {
        Rating::Fair
    } else {
        Rating::NeedsPractice
    }
}

// ============================================================================
// Weak Segments
// ============================================================================

/// Contiguous run of `frame_scores`, indices inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakSegment {
    pub start_index: usize,
    pub end_index: usize,
    pub average_score: f64,
}

impl WeakSegment {
    pub fn describe(&self) -> String {
        format!(
            "Segment {} to {} needs improvement (score: {:.1})",
            self.start_index, self.end_index, self.average_score
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "segments", rename_all = "snake_case")]
pub enum WeakPoints {
    Segments(Vec<WeakSegment>),
    MatchesThroughout,
    /// No frame scores to analyze
    Unavailable,
}

impl WeakPoints {
    pub fn segments(&self) -> &[WeakSegment] {
        match self {
            WeakPoints::Segments(segments) => segments,
            _ => &[],
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self {
            WeakPoints::Segments(segments) => segments.iter().map(WeakSegment::describe).collect(),
            WeakPoints::MatchesThroughout => vec![MATCHES_THROUGHOUT_MESSAGE.to_string()],
            WeakPoints::Unavailable => vec![UNAVAILABLE_MESSAGE.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub overall_score: f64,
    pub rating: Rating,
    pub weak_points: WeakPoints,
}

pub fn analyze_weak_segments(frame_scores: &[f64], config: &FeedbackConfig) -> WeakPoints {
    if frame_scores.is_empty() {
        return WeakPoints::Unavailable;
    }

    let last = frame_scores.len() - 1;
    let mut weak = Vec::new();
    let mut start = 0;
    let mut sum = 0.0;

    for (i, &score) in frame_scores.iter().enumerate() {
        sum += score;

        let jumped = i > 0 && (score - frame_scores[i - 1]).abs() > config.jump_threshold;
        if i == last || jumped {
            let average = sum / (i - start + 1) as f64;
            if average < config.weak_segment_threshold {
                weak.push(WeakSegment {
                    start_index: start,
                    end_index: i,
                    average_score: average,
                });
            }
            start = i + 1;
            sum = 0.0;
        }
    }

    if weak.is_empty() {
        WeakPoints::MatchesThroughout
    } else {
        WeakPoints::Segments(weak)
    }
}

pub fn generate_feedback(result: &ComparisonResult, config: &FeedbackConfig) -> Feedback {
    Feedback {
        overall_score: result.similarity_score,
        rating: rating_for(result.similarity_score),
        weak_points: analyze_weak_segments(&result.frame_scores, config),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_boundaries() {
        assert_eq!(rating_for(100.0), Rating::Excellent);
        assert_eq!(rating_for(90.0), Rating::Excellent);
        assert_eq!(rating_for(89.99), Rating::VeryGood);
        assert_eq!(rating_for(80.0), Rating::VeryGood);
        assert_eq!(rating_for(70.0), Rating::Good);
        assert_eq!(rating_for(60.0), Rating::Fair);
        assert_eq!(rating_for(59.9), Rating::NeedsPractice);
        assert_eq!(rating_for(0.0).to_string(), "Needs Practice");
        assert_eq!(Rating::VeryGood.to_string(), "Very Good");
    }

    #[test]
    fn test_uniformly_good_scores_match_throughout() {
        let points = analyze_weak_segments(&[95.0, 92.0, 90.0, 93.0], &FeedbackConfig::default());
        assert_eq!(points, WeakPoints::MatchesThroughout);
        assert_eq!(points.messages(), vec![MATCHES_THROUGHOUT_MESSAGE.to_string()]);
    }

    #[test]
    fn test_empty_scores_unavailable() {
        let points = analyze_weak_segments(&[], &FeedbackConfig::default());
        assert_eq!(points, WeakPoints::Unavailable);
        assert!(points.segments().is_empty());
    }

    #[test]
    fn test_jump_closes_segment_including_jump_frame() {
        // 0..=2 good, jump down at 3 closes [0,3]; low run [4,6] closes at the end
        let scores = [95.0, 94.0, 96.0, 40.0, 42.0, 41.0, 43.0];
        let points = analyze_weak_segments(&scores, &FeedbackConfig::default());

        let segments = points.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_index, 4);
        assert_eq!(segments[0].end_index, 6);
        assert!((segments[0].average_score - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_low_start_then_recovery() {
        let scores = [30.0, 35.0, 90.0, 92.0];
        let points = analyze_weak_segments(&scores, &FeedbackConfig::default());

        // jump at index 2 closes [0,2] with average 51.67
        let segments = points.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start_index, segments[0].end_index), (0, 2));
        assert_eq!(
            segments[0].describe(),
            "Segment 0 to 2 needs improvement (score: 51.7)"
        );
    }

    #[test]
    fn test_single_low_frame() {
        let points = analyze_weak_segments(&[10.0], &FeedbackConfig::default());
        assert_eq!(
            points,
            WeakPoints::Segments(vec![WeakSegment {
                start_index: 0,
                end_index: 0,
                average_score: 10.0,
            }])
        );
    }

    #[test]
    fn test_jump_on_last_frame() {
        let scores = [50.0, 52.0, 95.0];
        let points = analyze_weak_segments(&scores, &FeedbackConfig::default());
        let segments = points.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start_index, segments[0].end_index), (0, 2));
    }

    #[test]
    fn test_generate_feedback() {
        let result = ComparisonResult {
            similarity_score: 83.0,
            frame_scores: vec![85.0, 80.0, 84.0],
            path: vec![(0, 0), (1, 1), (2, 2)],
            comparable: true,
        };
        let feedback = generate_feedback(&result, &FeedbackConfig::default());
        assert_eq!(feedback.rating, Rating::VeryGood);
        assert_eq!(feedback.overall_score, 83.0);
        assert_eq!(feedback.weak_points, WeakPoints::MatchesThroughout);
    }

    #[test]
    fn test_weak_points_serialize_tagged() {
        let json = serde_json::to_value(WeakPoints::MatchesThroughout).unwrap();
        assert_eq!(json["kind"], "matches_throughout");
    }
}
