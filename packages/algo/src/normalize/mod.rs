//! Landmark Normalization
//!
//! Makes a hand pose independent of where it sits in the frame and how
//! large it appears:
//!
//! p' = (p - wrist) / |middle_mcp - wrist|
//!
//! A zero wrist-to-middle-MCP distance (duplicated points) falls back to a
//! scale of 1. Rotation is not normalized; attempts must be performed in
//! roughly the reference orientation.

use rayon::prelude::*;

use crate::types::{
    FrameLandmarks, HandFrame, LandmarkPoint, LandmarkSequence, PARALLEL_FRAME_THRESHOLD,
};

/// Normalize a single hand
pub fn normalize_hand(hand: &HandFrame) -> HandFrame {
    let wrist = *hand.wrist();
    let mut scale = hand.middle_finger_mcp().distance(&wrist);
    if scale == 0.0 {
        scale = 1.0;
    }

    let points = hand.points().map(|p| {
        LandmarkPoint::new(
            (p.x - wrist.x) / scale,
            (p.y - wrist.y) / scale,
            (p.z - wrist.z) / scale,
        )
    });
    HandFrame::from_points(points)
}

/// Normalize every hand of a frame; an empty frame stays empty
pub fn normalize(frame: &FrameLandmarks) -> FrameLandmarks {
    FrameLandmarks::new(frame.hands.iter().map(normalize_hand).collect())
}

/// Normalize each frame of a sequence, preserving order and length
pub fn normalize_sequence(sequence: &LandmarkSequence) -> LandmarkSequence {
    let frames = if sequence.len() >= PARALLEL_FRAME_THRESHOLD {
        sequence.frames.par_iter().map(normalize).collect()
    } else {
        sequence.frames.iter().map(normalize).collect()
    };
    LandmarkSequence::new(frames)
}
