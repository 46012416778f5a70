//! Session configuration
//!
//! Every field has a default, so a JSON file only needs to list overrides.

use crate::error::{Result, WatchError};
use serde::{Deserialize, Serialize};
use speedtrack::{SpeedStrategy, TrackerConfig};
use std::path::Path;

/// Horizontal reference lines for time-over-distance measurement.
///
/// Travel direction follows the line order: `exit_y > entry_y` means objects
/// move down the frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneLines {
    /// y coordinate (pixels) of the line that starts the timer
    pub entry_y: f32,
    /// y coordinate (pixels) of the line that stops the timer
    pub exit_y: f32,
}

impl Default for ZoneLines {
    fn default() -> Self {
        Self {
            entry_y: 200.0,
            exit_y: 400.0,
        }
    }
}

impl ZoneLines {
    pub fn moving_down(&self) -> bool {
        self.exit_y > self.entry_y
    }

    /// Whether a midpoint at `y` has reached or passed `line` in the travel direction
    pub fn has_passed(&self, y: f32, line: f32) -> bool {
        if self.moving_down() {
            y >= line
        } else {
            y <= line
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Detector class names that are tracked; everything else is ignored
    pub labels_to_track: Vec<String>,
    /// Detections below this confidence are ignored
    pub confidence_threshold: f32,
    /// Only the first N detections of a frame are considered
    pub max_detections_per_frame: usize,
    /// Readings strictly above this value are reported as violations
    pub speed_limit_kph: u32,
    pub tracker: TrackerConfig,
    pub strategy: SpeedStrategy,
    pub zone: ZoneLines,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            labels_to_track: ["car", "motorcycle", "bus", "truck"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_threshold: 0.3,
            max_detections_per_frame: 5,
            speed_limit_kph: 40,
            tracker: TrackerConfig::default(),
            strategy: SpeedStrategy::default(),
            zone: ZoneLines::default(),
        }
    }
}

impl WatchConfig {
    /// Read and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: WatchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(WatchError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.max_detections_per_frame == 0 {
            return Err(WatchError::config(
                "max_detections_per_frame must be at least 1",
            ));
        }
        if let SpeedStrategy::TimeOverDistance { .. } = self.strategy {
            if self.zone.entry_y == self.zone.exit_y
                || !self.zone.entry_y.is_finite()
                || !self.zone.exit_y.is_finite()
            {
                return Err(WatchError::config(
                    "zone entry_y and exit_y must be distinct finite values",
                ));
            }
        }
        self.tracker.validate()?;
        self.strategy.validate()?;
        Ok(())
    }

    pub fn tracks_label(&self, class_name: &str) -> bool {
        self.labels_to_track.iter().any(|l| l == class_name)
    }
}
