//! Pure Rust vehicle tracking and speed estimation
//!
//! This crate assigns stable ids to per-frame bounding boxes by midpoint
//! distance and turns the observations of each tracked object into a speed.
//!
//! # Usage
//!
//! ```rust
//! use speedtrack::{Point, SpeedModel, TimeOverDistance, Tracker};
//!
//! let mut tracker = Tracker::default();
//! let model = TimeOverDistance::new(20.0);
//!
//! let id = tracker.assign_identity(Point::new(10.0, 10.0), Point::new(50.0, 50.0))?;
//! tracker.mark_entering_zone(id)?;
//! model.record_crossing(&mut tracker, id, 0.0, true)?;
//!
//! let id = tracker.assign_identity(Point::new(10.0, 40.0), Point::new(50.0, 80.0))?;
//! tracker.mark_exited_zone(id)?;
//! model.record_crossing(&mut tracker, id, 2.0, false)?;
//!
//! assert_eq!(model.compute_speed_kph(&tracker, id)?, 36);
//! # Ok::<(), speedtrack::TrackError>(())
//! ```

pub mod bbox;
pub mod error;
pub mod speed;
pub mod tracker;

pub use bbox::{Bbox, Point};
pub use error::{Result, TrackError};
pub use speed::{
    round_speed, DisplacementOverTime, SpeedEstimator, SpeedModel, SpeedStrategy,
    TimeOverDistance,
};
pub use tracker::{Crossing, PositionSample, TrackedObject, Tracker, TrackerConfig, ZoneState};
