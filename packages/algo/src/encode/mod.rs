//! Sequence Encoding
//!
//! Flattens each normalized frame into a 63-dimensional vector. Only the
//! first hand is used; a frame without a hand becomes the zero vector and
//! stays in the sequence so missing detections are still aligned and
//! penalized.

use rayon::prelude::*;

use crate::types::{
    EncodedSequence, FeatureVector, FrameLandmarks, HandFrame, LandmarkSequence,
    COORDINATES_PER_LANDMARK, FEATURE_DIMENSION, PARALLEL_FRAME_THRESHOLD,
};

/// Flatten a hand in landmark order: x0, y0, z0, x1, ...
pub fn encode_hand(hand: &HandFrame) -> FeatureVector {
    let mut vector = [0.0; FEATURE_DIMENSION];
    for (chunk, point) in vector
        .chunks_exact_mut(COORDINATES_PER_LANDMARK)
        .zip(hand.points().iter())
    {
        chunk[0] = point.x;
        chunk[1] = point.y;
        chunk[2] = point.z;
    }
    vector
}

pub fn encode_frame(frame: &FrameLandmarks) -> FeatureVector {
    match frame.primary_hand() {
        Some(hand) => encode_hand(hand),
        None => [0.0; FEATURE_DIMENSION],
    }
}

/// Encode a normalized sequence; output length always equals input length
pub fn encode(sequence: &LandmarkSequence) -> EncodedSequence {
    let frames = if sequence.len() >= PARALLEL_FRAME_THRESHOLD {
        sequence.frames.par_iter().map(encode_frame).collect()
    } else {
        sequence.frames.iter().map(encode_frame).collect()
    };
    EncodedSequence::new(frames)
}
