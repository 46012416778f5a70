//! Elapsed time between two reference lines a fixed distance apart

use super::{round_speed, SpeedModel, MPS_TO_KPH};
use crate::error::{Result, TrackError};
use crate::tracker::{Crossing, Tracker};

#[derive(Debug, Clone, PartialEq)]
pub struct TimeOverDistance {
    /// Real-world distance between the entry and exit lines in meters
    pub distance_m: f64,
}

impl TimeOverDistance {
    pub fn new(distance_m: f64) -> Self {
        Self { distance_m }
    }

    /// Store `time` (seconds, monotonic) as the entry or exit reading of object `id`
    pub fn record_crossing(
        &self,
        tracker: &mut Tracker,
        id: u32,
        time: f64,
        is_entry: bool,
    ) -> Result<()> {
        tracker.set_timestamp(id, Crossing::from_is_entry(is_entry), time)
    }

    /// Speed in m/s, derived from the rounded km/h value
    pub fn compute_speed_mps(&self, tracker: &Tracker, id: u32) -> Result<u32> {
        let kph = self.compute_speed_kph(tracker, id)?;
        Ok(round_speed(kph as f64 / MPS_TO_KPH))
    }

    fn elapsed(tracker: &Tracker, id: u32) -> Result<f64> {
        let object = tracker.get(id).ok_or(TrackError::UnknownObject(id))?;
        let [Some(entry), Some(exit)] = object.timestamps else {
            return Err(TrackError::invalid_measurement(
                id,
                "entry and exit crossings have not both been recorded",
            ));
        };

        let elapsed = (exit - entry).abs();
        if elapsed == 0.0 || !elapsed.is_finite() {
            return Err(TrackError::invalid_measurement(
                id,
                "elapsed time between crossings is zero",
            ));
        }
        Ok(elapsed)
    }
}

impl SpeedModel for TimeOverDistance {
    fn compute_speed_kph(&self, tracker: &Tracker, id: u32) -> Result<u32> {
        let elapsed = Self::elapsed(tracker, id)?;
        Ok(round_speed(self.distance_m / elapsed * MPS_TO_KPH))
    }

    fn name(&self) -> &'static str {
        "time-over-distance"
    }
}
