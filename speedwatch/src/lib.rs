//! Vehicle speed watch
//!
//! Replays per-frame detector output through the `speedtrack` core: filters
//! detections, assigns ids, decides reference-line crossings, computes speeds
//! and reports readings above the speed limit to a [`ViolationSink`].

pub mod config;
pub mod error;
pub mod fps;
pub mod session;
pub mod sink;
pub mod types;

pub use config::{WatchConfig, ZoneLines};
pub use error::{Result, WatchError};
pub use fps::FpsMeter;
pub use session::SpeedSession;
pub use sink::{LogSink, MemorySink, ViolationSink};
pub use types::{Detection, FrameDetections, FrameReport, SpeedReading, Violation};

/// Get library version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
