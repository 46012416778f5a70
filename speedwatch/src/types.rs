//! Type definitions for detector output and session results

use serde::{Deserialize, Serialize};
use speedtrack::Point;

/// One bounding box reported by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
    /// [x, y] of the top-left corner in pixels
    pub top_left: [f32; 2],
    /// [x, y] of the bottom-right corner in pixels
    pub bottom_right: [f32; 2],
}

impl Detection {
    pub fn new<S: Into<String>>(
        class_name: S,
        confidence: f32,
        top_left: [f32; 2],
        bottom_right: [f32; 2],
    ) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            top_left,
            bottom_right,
        }
    }

    pub fn corners(&self) -> (Point, Point) {
        (Point::from(self.top_left), Point::from(self.bottom_right))
    }
}

/// All detections of a single frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    /// Monotonic clock reading in seconds when the frame was captured
    pub timestamp: f64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Speed computed for an object in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedReading {
    pub object_id: u32,
    pub class_name: String,
    pub speed_kph: u32,
    pub timestamp: f64,
}

/// A reading above the configured speed limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub object_id: u32,
    pub speed_kph: u32,
    pub timestamp: f64,
    /// Index of the frame that produced the reading, starting at 1
    pub frame_index: u64,
}

/// Outcome of processing one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub readings: Vec<SpeedReading>,
    pub violations: Vec<Violation>,
    /// Detections dropped because their box was malformed
    pub skipped: usize,
}
