//! Vertical displacement over a window of evenly spaced frames
//!
//! The window holds `capacity` samples taken at a fixed frame rate, so a full
//! window spans one time unit. Pixel displacement is used directly as the
//! distance, without any camera calibration. A history shorter than the window
//! still yields a speed, scaled by `len / capacity`; a single sample gives 0.

use super::{round_speed, SpeedModel, MPS_TO_KPH};
use crate::error::{Result, TrackError};
use crate::tracker::Tracker;

#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementOverTime {
    capacity: usize,
}

impl DisplacementOverTime {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Number of samples in a full window
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append the current vertical position of object `id`
    pub fn record_sample(&self, tracker: &mut Tracker, id: u32, y_position: f32) -> Result<()> {
        self.check_window(tracker)?;
        tracker.push_sample(id, y_position)
    }

    /// The tracker evicts samples at its own window; both must agree
    fn check_window(&self, tracker: &Tracker) -> Result<()> {
        let window = tracker.config().sample_window;
        if window != self.capacity {
            return Err(TrackError::config(format!(
                "tracker sample_window {} does not match estimator capacity {}",
                window, self.capacity
            )));
        }
        Ok(())
    }
}

impl SpeedModel for DisplacementOverTime {
    fn compute_speed_kph(&self, tracker: &Tracker, id: u32) -> Result<u32> {
        self.check_window(tracker)?;
        let history = &tracker
            .get(id)
            .ok_or(TrackError::UnknownObject(id))?
            .position_history;

        let (Some(first), Some(last)) = (history.front(), history.back()) else {
            return Err(TrackError::invalid_measurement(
                id,
                "no position samples recorded",
            ));
        };

        let distance_covered = (last.y as f64 - first.y as f64).abs();
        let elapsed_fraction = history.len() as f64 / self.capacity as f64;
        Ok(round_speed(distance_covered / elapsed_fraction * MPS_TO_KPH))
    }

    fn name(&self) -> &'static str {
        "displacement-over-time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::Point;
    use crate::tracker::TrackerConfig;

    fn tracker_with_object(window: usize) -> (Tracker, u32) {
        let mut tracker = Tracker::new(TrackerConfig {
            sample_window: window,
            ..Default::default()
        })
        .unwrap();
        let id = tracker
            .assign_identity(Point::new(0.0, 80.0), Point::new(40.0, 120.0))
            .unwrap();
        (tracker, id)
    }

    #[test]
    fn test_full_window() {
        let (mut tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        for y in [100.0, 100.0, 70.0] {
            model.record_sample(&mut tracker, id, y).unwrap();
        }
        assert_eq!(model.compute_speed_kph(&tracker, id).unwrap(), 108);
    }

    #[test]
    fn test_partial_window_scales_by_fraction() {
        let (mut tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        model.record_sample(&mut tracker, id, 100.0).unwrap();
        model.record_sample(&mut tracker, id, 90.0).unwrap();
        // 10 px over 2/3 of the window: 10 / (2/3) * 3.6 = 54
        assert_eq!(model.compute_speed_kph(&tracker, id).unwrap(), 54);
    }

    #[test]
    fn test_single_sample_gives_zero() {
        let (mut tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        model.record_sample(&mut tracker, id, 100.0).unwrap();
        assert_eq!(model.compute_speed_kph(&tracker, id).unwrap(), 0);
    }

    #[test]
    fn test_empty_history_is_invalid() {
        let (tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        assert!(matches!(
            model.compute_speed_kph(&tracker, id),
            Err(TrackError::InvalidMeasurement { .. })
        ));
    }

    #[test]
    fn test_window_slides() {
        let (mut tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        for y in [300.0, 200.0, 100.0, 95.0, 90.0] {
            model.record_sample(&mut tracker, id, y).unwrap();
        }
        // window is [100, 95, 90]
        assert_eq!(tracker.get(id).unwrap().position_history.len(), 3);
        assert_eq!(model.compute_speed_kph(&tracker, id).unwrap(), 36);
    }

    #[test]
    fn test_direction_does_not_matter() {
        let (mut tracker, id) = tracker_with_object(3);
        let model = DisplacementOverTime::new(3);
        for y in [70.0, 100.0, 100.0] {
            model.record_sample(&mut tracker, id, y).unwrap();
        }
        assert_eq!(model.compute_speed_kph(&tracker, id).unwrap(), 108);
    }

    #[test]
    fn test_mismatched_window_is_rejected() {
        let mut tracker = Tracker::default();
        let id = tracker
            .assign_identity(Point::new(0.0, 80.0), Point::new(40.0, 120.0))
            .unwrap();
        let model = DisplacementOverTime::new(25);

        assert!(matches!(
            model.record_sample(&mut tracker, id, 100.0),
            Err(TrackError::InvalidConfig(_))
        ));
        assert!(tracker.get(id).unwrap().position_history.is_empty());

        // samples pushed through the tracker directly still cannot be measured
        for y in [100.0, 100.0, 70.0] {
            tracker.push_sample(id, y).unwrap();
        }
        assert!(matches!(
            model.compute_speed_kph(&tracker, id),
            Err(TrackError::InvalidConfig(_))
        ));
        assert_eq!(
            DisplacementOverTime::new(3).compute_speed_kph(&tracker, id),
            Ok(108)
        );
    }
}
