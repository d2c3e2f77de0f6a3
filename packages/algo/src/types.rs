//! Common Types and Constants
//!
//! Shared data structures used across all algorithm modules.
//!
//! Landmark JSON follows the detector layout: a sequence is an array of
//! frames, a frame is an array of hands, a hand is an array of 21 `[x, y, z]`
//! triples.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::sanitize;

// ==================== Constants ====================

/// Landmarks reported per detected hand
pub const LANDMARKS_PER_HAND: usize = 21;

/// Coordinates per landmark (x, y, z)
pub const COORDINATES_PER_LANDMARK: usize = 3;

/// Length of an encoded frame vector (21 x 3)
pub const FEATURE_DIMENSION: usize = LANDMARKS_PER_HAND * COORDINATES_PER_LANDMARK;

/// Only the first detected hand of a frame is compared.
/// Two-hand gestures are a scoped extension, not handled by the encoder.
pub const MAX_HANDS_CONSIDERED: usize = 1;

/// Frame count above which normalization and encoding fan out over rayon
pub const PARALLEL_FRAME_THRESHOLD: usize = 64;

/// Hand landmark indices (MediaPipe hand landmark convention)
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Encoded frame: the first hand's normalized coordinates, flattened
pub type FeatureVector = [f64; FEATURE_DIMENSION];

/// DTW correspondence as (reference index, attempt index) pairs
pub type AlignmentPath = Vec<(usize, usize)>;

// ==================== Landmark Types ====================

/// Single 3D landmark
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LandmarkPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn distance(&self, other: &LandmarkPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f64; 3]> for LandmarkPoint {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<LandmarkPoint> for [f64; 3] {
    fn from(p: LandmarkPoint) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One detected hand: exactly 21 landmarks in detector order.
///
/// The count and finiteness are checked on construction, so downstream
/// code may index `WRIST` and `MIDDLE_FINGER_MCP` freely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LandmarkPoint>", into = "Vec<LandmarkPoint>")]
pub struct HandFrame {
    points: [LandmarkPoint; LANDMARKS_PER_HAND],
}

impl HandFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Result<Self, GestureError> {
        sanitize::validate_hand_points(&points)?;
        let points: [LandmarkPoint; LANDMARKS_PER_HAND] =
            points
                .try_into()
                .map_err(|rest: Vec<LandmarkPoint>| GestureError::MalformedLandmarks {
                    expected: LANDMARKS_PER_HAND,
                    actual: rest.len(),
                })?;
        Ok(Self { points })
    }

    /// Build from raw `[x, y, z]` triples
    pub fn from_coordinates(coords: &[[f64; 3]]) -> Result<Self, GestureError> {
        Self::new(coords.iter().copied().map(LandmarkPoint::from).collect())
    }

    /// Caller guarantees the points are finite
    pub(crate) fn from_points(points: [LandmarkPoint; LANDMARKS_PER_HAND]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[LandmarkPoint; LANDMARKS_PER_HAND] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(index)
    }

    pub fn wrist(&self) -> &LandmarkPoint {
        &self.points[landmarks::WRIST]
    }

    pub fn middle_finger_mcp(&self) -> &LandmarkPoint {
        &self.points[landmarks::MIDDLE_FINGER_MCP]
    }
}

impl TryFrom<Vec<LandmarkPoint>> for HandFrame {
    type Error = GestureError;

    fn try_from(points: Vec<LandmarkPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<HandFrame> for Vec<LandmarkPoint> {
    fn from(hand: HandFrame) -> Self {
        hand.points.to_vec()
    }
}

/// Hands detected in a single raster frame (empty when nothing was found)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameLandmarks {
    pub hands: Vec<HandFrame>,
}

impl FrameLandmarks {
    pub fn new(hands: Vec<HandFrame>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(hand: HandFrame) -> Self {
        Self { hands: vec![hand] }
    }

    pub fn has_hand(&self) -> bool {
        !self.hands.is_empty()
    }

    /// The hand used for comparison (see [`MAX_HANDS_CONSIDERED`])
    pub fn primary_hand(&self) -> Option<&HandFrame> {
        self.hands.first()
    }
}

/// Ordered frames of a reference gesture or a learner attempt
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSequence {
    pub frames: Vec<FrameLandmarks>,
}

impl LandmarkSequence {
    pub fn new(frames: Vec<FrameLandmarks>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames with at least one detected hand
    pub fn detected_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.has_hand()).count()
    }

    pub fn has_any_hand(&self) -> bool {
        self.frames.iter().any(FrameLandmarks::has_hand)
    }

    /// Parse the detector JSON layout; landmark count and finiteness are
    /// enforced per hand.
    pub fn from_json(json: &str) -> Result<Self, GestureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, GestureError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Vec<FrameLandmarks>> for LandmarkSequence {
    fn from(frames: Vec<FrameLandmarks>) -> Self {
        Self { frames }
    }
}

// ==================== Encoded Types ====================

/// Fixed-length vectors, one per frame of a [`LandmarkSequence`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedSequence {
    pub frames: Vec<FeatureVector>,
}

impl EncodedSequence {
    pub fn new(frames: Vec<FeatureVector>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl From<Vec<FeatureVector>> for EncodedSequence {
    fn from(frames: Vec<FeatureVector>) -> Self {
        Self { frames }
    }
}
