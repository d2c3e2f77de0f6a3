//! Landmark detector seam
//!
//! The hand-tracking model lives outside this crate. Anything that turns a
//! decoded frame into 21-point hands can be plugged in through
//! [`LandmarkDetector`].

use gesture_algo::{FrameLandmarks, HandFrame, LandmarkSequence};

/// Bytes per pixel of an RGB frame
pub const RGB_CHANNELS: usize = 3;

// ============================================================
// Errors
// ============================================================

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("detector failure: {0}")]
    Backend(String),
}

// ============================================================
// RasterFrame
// ============================================================

/// A decoded RGB frame, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterFrame {
    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DetectorError> {
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(DetectorError::InvalidFrame(format!(
                "{width}x{height} frame needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

// ============================================================
// LandmarkDetector
// ============================================================

pub trait LandmarkDetector: Send + Sync {
    /// Hands found in one frame, most confident first
    fn detect(&self, frame: &RasterFrame) -> Result<Vec<HandFrame>, DetectorError>;
}

/// Run the detector over every frame. A failing frame becomes an empty
/// frame so the sequence keeps its timing.
pub fn extract_landmarks(detector: &dyn LandmarkDetector, frames: &[RasterFrame]) -> LandmarkSequence {
    let mut failures = 0usize;

    let extracted = frames
        .iter()
        .enumerate()
        .map(|(index, frame)| match detector.detect(frame) {
            Ok(hands) => FrameLandmarks::new(hands),
            Err(err) => {
                failures += 1;
                tracing::warn!(frame = index, error = %err, "landmark detection failed");
                FrameLandmarks::empty()
            }
        })
        .collect::<Vec<_>>();

    let sequence = LandmarkSequence::new(extracted);
    tracing::debug!(
        frames = sequence.len(),
        detected = sequence.detected_frame_count(),
        failures,
        "extracted landmarks"
    );
    sequence
}

// ============================================================
// Tests
// ============================================================
