#![allow(dead_code)]

use gesture_algo::{FrameLandmarks, HandFrame, LandmarkSequence, LANDMARKS_PER_HAND};
use gesture_backend::storage::{DatabaseManager, GestureReference};
use std::path::PathBuf;
use tempfile::TempDir;

/// A hand whose index fingertip sits at `tip_y`; everything else fixed.
pub fn hand(tip_y: f64) -> HandFrame {
    let mut coords = vec![[0.2, 0.1, 0.0]; LANDMARKS_PER_HAND];
    coords[0] = [0.0, 0.0, 0.0];
    coords[9] = [0.0, 1.0, 0.0];
    coords[8] = [0.3, tip_y, 0.0];
    HandFrame::from_coordinates(&coords).expect("valid hand")
}

pub fn sequence(tips: &[f64]) -> LandmarkSequence {
    LandmarkSequence::new(tips.iter().map(|&t| FrameLandmarks::single(hand(t))).collect())
}

pub fn wave() -> LandmarkSequence {
    sequence(&[0.0, 0.5, 1.0, 1.5, 1.0, 0.5, 0.0])
}

pub struct TestDb {
    pub dir: TempDir,
    pub path: PathBuf,
    pub db: DatabaseManager,
}

/// On-disk database seeded with the `wave` reference
pub fn seeded_db() -> TestDb {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("coach.db");
    let db = DatabaseManager::new(&path).expect("open database");
    db.references()
        .save_reference(&GestureReference::new("wave", "Wave", "hello", wave()))
        .expect("seed reference");
    TestDb { dir, path, db }
}
