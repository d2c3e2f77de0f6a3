use thiserror::Error;

/// Which side of a comparison an input belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceSide {
    Reference,
    Attempt,
}

impl std::fmt::Display for SequenceSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceSide::Reference => f.write_str("reference"),
            SequenceSide::Attempt => f.write_str("attempt"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("malformed landmark input: expected {expected} landmarks, got {actual}")]
    MalformedLandmarks { expected: usize, actual: usize },

    #[error("malformed landmark input: landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("{side} sequence has {len} frames, limit is {max}")]
    SequenceTooLong {
        side: SequenceSide,
        len: usize,
        max: usize,
    },

    #[error("invalid comparison config: {0}")]
    InvalidConfig(String),

    #[error("landmark json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GestureError {
    /// True for violations of the 21-landmark detector contract
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            GestureError::MalformedLandmarks { .. }
                | GestureError::NonFiniteCoordinate { .. }
                | GestureError::Parse(_)
        )
    }
}
