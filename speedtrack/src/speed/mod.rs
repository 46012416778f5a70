//! Speed estimation strategies
//!
//! Two mutually exclusive strategies share a common interface:
//! - TimeOverDistance: elapsed time between two reference lines a known distance apart
//! - DisplacementOverTime: vertical displacement over a fixed window of frames
//!
//! The strategy is chosen once from a [`SpeedStrategy`] when the session is set up.
//! Per-object observations live in the [`Tracker`]; estimators only read and
//! append through its interface.

use crate::error::{Result, TrackError};
use crate::tracker::Tracker;
use serde::{Deserialize, Serialize};

mod crossing;
mod displacement;

pub use crossing::TimeOverDistance;
pub use displacement::DisplacementOverTime;

/// m/s to km/h
pub const MPS_TO_KPH: f64 = 3.6;

/// Round a non-negative speed to the nearest integer, ties to even.
///
/// Negative and non-finite inputs map to 0.
pub fn round_speed(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round_ties_even() as u32
}

/// Common interface for speed estimators
pub trait SpeedModel {
    /// Speed of object `id` in km/h from the observations recorded so far
    fn compute_speed_kph(&self, tracker: &Tracker, id: u32) -> Result<u32>;

    /// Human-readable strategy name
    fn name(&self) -> &'static str;
}

/// Strategy selection, deserializable from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedStrategy {
    /// Objects cross an entry and an exit line `distance_m` meters apart
    TimeOverDistance { distance_m: f64 },
    /// Positions are sampled once per frame; the window holds one second of frames
    DisplacementOverTime { frame_rate: usize },
}

impl Default for SpeedStrategy {
    fn default() -> Self {
        Self::TimeOverDistance { distance_m: 20.0 }
    }
}

impl SpeedStrategy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::TimeOverDistance { distance_m } => {
                if !distance_m.is_finite() || distance_m <= 0.0 {
                    return Err(TrackError::config(format!(
                        "distance_m must be a positive number, got {}",
                        distance_m
                    )));
                }
            }
            Self::DisplacementOverTime { frame_rate } => {
                if frame_rate == 0 {
                    return Err(TrackError::config("frame_rate must be at least 1"));
                }
            }
        }
        Ok(())
    }
}

/// The estimator chosen for a session
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedEstimator {
    TimeOverDistance(TimeOverDistance),
    DisplacementOverTime(DisplacementOverTime),
}

impl SpeedEstimator {
    pub fn from_strategy(strategy: &SpeedStrategy) -> Result<Self> {
        strategy.validate()?;
        let estimator = match *strategy {
            SpeedStrategy::TimeOverDistance { distance_m } => {
                Self::TimeOverDistance(TimeOverDistance::new(distance_m))
            }
            SpeedStrategy::DisplacementOverTime { frame_rate } => {
                Self::DisplacementOverTime(DisplacementOverTime::new(frame_rate))
            }
        };
        log::info!("Using {} speed estimation", estimator.name());
        Ok(estimator)
    }

    /// History capacity the tracker must be configured with, if the strategy uses one
    pub fn sample_window(&self) -> Option<usize> {
        match self {
            Self::TimeOverDistance(_) => None,
            Self::DisplacementOverTime(d) => Some(d.capacity()),
        }
    }
}

impl SpeedModel for SpeedEstimator {
    fn compute_speed_kph(&self, tracker: &Tracker, id: u32) -> Result<u32> {
        match self {
            Self::TimeOverDistance(t) => t.compute_speed_kph(tracker, id),
            Self::DisplacementOverTime(d) => d.compute_speed_kph(tracker, id),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::TimeOverDistance(t) => t.name(),
            Self::DisplacementOverTime(d) => d.name(),
        }
    }
}
