//! Error types for identity assignment and speed estimation

use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors surfaced to the per-frame caller. None of them are fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("Invalid measurement for object {id}: {reason}")]
    InvalidMeasurement { id: u32, reason: &'static str },

    #[error(
        "Malformed bounding box: top-left ({x1}, {y1}) must not exceed bottom-right ({x2}, {y2})"
    )]
    MalformedBoundingBox { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("Unknown object id {0}")]
    UnknownObject(u32),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl TrackError {
    pub fn invalid_measurement(id: u32, reason: &'static str) -> Self {
        Self::InvalidMeasurement { id, reason }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
