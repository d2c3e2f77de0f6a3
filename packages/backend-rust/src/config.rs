use std::path::PathBuf;

use gesture_algo::ComparisonConfig;

use crate::storage::default_db_path;

// ============================================================
// Config
// ============================================================

/// A `GESTURE_*` override that was ignored, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedSetting {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_level: String,
    pub comparison: ComparisonConfig,
    /// Logged by the caller once tracing is initialized
    pub rejected: Vec<RejectedSetting>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Each comparison override is validated on
    /// its own; a bad one keeps that field's default and is reported in
    /// `rejected` while the other overrides still apply.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("DATABASE_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let mut comparison = ComparisonConfig::default();
        let mut rejected = Vec::new();

        let float_overrides: [(&'static str, fn(&mut ComparisonConfig, f64)); 4] = [
            ("GESTURE_SCORE_SCALE", |c: &mut ComparisonConfig, v: f64| {
                c.scoring.score_scale = v
            }),
            ("GESTURE_JUMP_THRESHOLD", |c: &mut ComparisonConfig, v: f64| {
                c.feedback.jump_threshold = v
            }),
            ("GESTURE_WEAK_SEGMENT_THRESHOLD", |c: &mut ComparisonConfig, v: f64| {
                c.feedback.weak_segment_threshold = v
            }),
            ("GESTURE_PASS_THRESHOLD", |c: &mut ComparisonConfig, v: f64| {
                c.mastery.pass_threshold = v
            }),
        ];

        for (key, apply) in float_overrides {
            let Some(raw) = lookup(key) else { continue };
            match raw.trim().parse::<f64>() {
                Ok(value) => {
                    let mut candidate = comparison.clone();
                    apply(&mut candidate, value);
                    match candidate.validate() {
                        Ok(()) => comparison = candidate,
                        Err(err) => rejected.push(RejectedSetting {
                            key,
                            value: raw,
                            reason: err.to_string(),
                        }),
                    }
                }
                Err(err) => rejected.push(RejectedSetting {
                    key,
                    value: raw,
                    reason: err.to_string(),
                }),
            }
        }

        if let Some(raw) = lookup("GESTURE_MAX_FRAMES") {
            match raw.trim() {
                "0" | "none" | "off" => comparison.max_frames = None,
                other => match other.parse::<usize>() {
                    Ok(max) => comparison.max_frames = Some(max),
                    Err(err) => rejected.push(RejectedSetting {
                        key: "GESTURE_MAX_FRAMES",
                        value: raw.clone(),
                        reason: err.to_string(),
                    }),
                },
            }
        }

        Self {
            database_path,
            log_level,
            comparison,
            rejected,
        }
    }

    pub fn log_rejected_settings(&self) {
        for setting in &self.rejected {
            tracing::warn!(
                key = setting.key,
                value = %setting.value,
                reason = %setting.reason,
                "ignoring comparison setting, keeping default"
            );
        }
    }
}

// ============================================================
// Tests
// ============================================================
