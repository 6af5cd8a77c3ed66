//! Error types for gesture registration and frame processing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    #[error("invalid landmark set: {0}")]
    InvalidLandmarkSet(String),

    #[error("gesture description `{0}` has no constrained finger")]
    EmptyGestureDescription(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown finger: {0}")]
    UnknownFinger(String),

    #[error("duplicate gesture name: {0}")]
    DuplicateGestureName(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, GestureError>;

impl From<serde_json::Error> for GestureError {
    fn from(e: serde_json::Error) -> Self {
        GestureError::Serialization(e.to_string())
    }
}
