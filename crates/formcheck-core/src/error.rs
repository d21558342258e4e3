//! Error types for the FormCheck system.

use thiserror::Error;

use crate::types::JointId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate geometry at {vertex}: zero-length segment or non-finite coordinate")]
    DegenerateGeometry { vertex: String },

    #[error("Invalid pose snapshot: expected {expected} landmarks, got {actual}")]
    InvalidSnapshot { expected: usize, actual: usize },

    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    #[error("Invalid form standard: {0}")]
    InvalidStandard(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No instructions available for {0}")]
    NoInstructions(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Degenerate angle at a named joint.
    pub fn degenerate_at(vertex: JointId) -> Self {
        Error::DegenerateGeometry {
            vertex: vertex.name().to_string(),
        }
    }

    /// Whether the caller should drop this frame and wait for the next one.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Error::DegenerateGeometry { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidSnapshot {
            expected: 33,
            actual: 17,
        };
        assert_eq!(
            err.to_string(),
            "Invalid pose snapshot: expected 33 landmarks, got 17"
        );

        let err = Error::degenerate_at(JointId::LeftKnee);
        assert!(err.to_string().contains("left_knee"));
        assert!(err.is_frame_local());
    }
}
