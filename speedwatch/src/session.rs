//! Per-frame orchestration of the tracker and the speed estimator
//!
//! For every frame the session keeps the first `max_detections_per_frame`
//! detections, drops untracked classes and low-confidence boxes, assigns an id
//! to each remaining box and feeds the object's position to the configured
//! strategy. A malformed box only skips that detection; the frame continues.

use crate::config::WatchConfig;
use crate::error::Result;
use crate::fps::FpsMeter;
use crate::sink::{LogSink, ViolationSink};
use crate::types::{Detection, FrameDetections, FrameReport, SpeedReading, Violation};
use speedtrack::{SpeedEstimator, SpeedModel, TrackError, Tracker, ZoneState};

pub struct SpeedSession<S: ViolationSink = LogSink> {
    config: WatchConfig,
    tracker: Tracker,
    estimator: SpeedEstimator,
    sink: S,
    fps: FpsMeter,
    frame_index: u64,
}

impl SpeedSession<LogSink> {
    /// Session that reports violations through the log
    pub fn with_log_sink(config: WatchConfig) -> Result<Self> {
        Self::new(config, LogSink)
    }
}

impl<S: ViolationSink> SpeedSession<S> {
    pub fn new(config: WatchConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let estimator = SpeedEstimator::from_strategy(&config.strategy)?;

        let mut tracker_config = config.tracker.clone();
        if let Some(window) = estimator.sample_window() {
            tracker_config.sample_window = window;
        }
        let tracker = Tracker::new(tracker_config)?;

        log::info!(
            "Creating SpeedSession: labels={:?}, confidence_threshold={:.2}, speed_limit={} km/h",
            config.labels_to_track,
            config.confidence_threshold,
            config.speed_limit_kph
        );

        Ok(Self {
            config,
            tracker,
            estimator,
            sink,
            fps: FpsMeter::new(),
            frame_index: 0,
        })
    }

    /// Run one frame of detections through the tracker and estimator
    pub fn process_frame(&mut self, frame: &FrameDetections) -> FrameReport {
        self.frame_index += 1;
        self.tracker.begin_frame();
        self.fps.tick(frame.timestamp);

        let mut report = FrameReport::default();
        let max_detections = self.config.max_detections_per_frame;

        for detection in frame.detections.iter().take(max_detections) {
            if !self.is_tracked(detection) {
                continue;
            }

            let (top_left, bottom_right) = detection.corners();
            let id = match self.tracker.assign_identity(top_left, bottom_right) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("Skipping detection in frame {}: {}", self.frame_index, e);
                    report.skipped += 1;
                    continue;
                }
            };

            let speed_kph = match self.observe(id, frame.timestamp) {
                Ok(Some(speed)) => speed,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("No speed for object {}: {}", id, e);
                    continue;
                }
            };

            log::debug!(
                "Object {} ({}) at {} km/h in frame {}",
                id,
                detection.class_name,
                speed_kph,
                self.frame_index
            );
            report.readings.push(SpeedReading {
                object_id: id,
                class_name: detection.class_name.clone(),
                speed_kph,
                timestamp: frame.timestamp,
            });

            if speed_kph > self.config.speed_limit_kph {
                let violation = Violation {
                    object_id: id,
                    speed_kph,
                    timestamp: frame.timestamp,
                    frame_index: self.frame_index,
                };
                self.sink.record(&violation);
                report.violations.push(violation);
            }
        }

        report
    }

    fn is_tracked(&self, detection: &Detection) -> bool {
        detection.confidence >= self.config.confidence_threshold
            && self.config.tracks_label(&detection.class_name)
    }

    /// Record the object's current position and return a speed once one is available
    fn observe(&mut self, id: u32, timestamp: f64) -> speedtrack::Result<Option<u32>> {
        let object = self.tracker.get(id).ok_or(TrackError::UnknownObject(id))?;
        let (y, zone_state) = (object.anchor.y, object.zone_state);

        match &self.estimator {
            SpeedEstimator::TimeOverDistance(model) => {
                let zone = &self.config.zone;
                match zone_state {
                    ZoneState::NotEntered
                        if zone.has_passed(y, zone.entry_y) && !zone.has_passed(y, zone.exit_y) =>
                    {
                        self.tracker.mark_entering_zone(id)?;
                        model.record_crossing(&mut self.tracker, id, timestamp, true)?;
                        Ok(None)
                    }
                    ZoneState::InTransit if zone.has_passed(y, zone.exit_y) => {
                        self.tracker.mark_exited_zone(id)?;
                        model.record_crossing(&mut self.tracker, id, timestamp, false)?;
                        model.compute_speed_kph(&self.tracker, id).map(Some)
                    }
                    _ => Ok(None),
                }
            }
            SpeedEstimator::DisplacementOverTime(model) => {
                model.record_sample(&mut self.tracker, id, y)?;
                model.compute_speed_kph(&self.tracker, id).map(Some)
            }
        }
    }

    /// Objects between the entry and exit lines
    pub fn in_transit_count(&self) -> usize {
        self.tracker.in_transit_count()
    }

    /// Objects that crossed the exit line
    pub fn completed_count(&self) -> usize {
        self.tracker.completed_count()
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn estimator(&self) -> &SpeedEstimator {
        &self.estimator
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneLines;
    use crate::sink::MemorySink;
    use speedtrack::SpeedStrategy;

    /// 80x60 box centered on (cx, cy)
    fn detection(class_name: &str, confidence: f32, cx: f32, cy: f32) -> Detection {
        Detection::new(
            class_name,
            confidence,
            [cx - 40.0, cy - 30.0],
            [cx + 40.0, cy + 30.0],
        )
    }

    fn frame(timestamp: f64, detections: Vec<Detection>) -> FrameDetections {
        FrameDetections {
            timestamp,
            detections,
        }
    }

    fn crossing_session() -> SpeedSession<MemorySink> {
        let config = WatchConfig {
            strategy: SpeedStrategy::TimeOverDistance { distance_m: 20.0 },
            zone: ZoneLines {
                entry_y: 100.0,
                exit_y: 300.0,
            },
            ..Default::default()
        };
        SpeedSession::new(config, MemorySink::default()).unwrap()
    }

    fn drive_through(session: &mut SpeedSession<MemorySink>, times: [f64; 4]) -> Vec<FrameReport> {
        [120.0, 180.0, 240.0, 300.0]
            .iter()
            .zip(times)
            .map(|(&cy, t)| session.process_frame(&frame(t, vec![detection("car", 0.9, 140.0, cy)])))
            .collect()
    }

    #[test]
    fn test_time_over_distance_below_limit() {
        let mut session = crossing_session();
        let reports = drive_through(&mut session, [0.0, 0.5, 1.0, 2.0]);

        assert!(reports[..3].iter().all(|r| r.readings.is_empty()));
        assert_eq!(reports[3].readings.len(), 1);
        assert_eq!(reports[3].readings[0].object_id, 1);
        assert_eq!(reports[3].readings[0].speed_kph, 36);
        assert!(reports[3].violations.is_empty());
        assert!(session.sink().violations.is_empty());
        assert_eq!(session.completed_count(), 1);
        assert_eq!(session.in_transit_count(), 0);
    }

    #[test]
    fn test_time_over_distance_violation() {
        let mut session = crossing_session();
        let reports = drive_through(&mut session, [0.0, 0.5, 0.75, 1.0]);

        assert_eq!(reports[3].readings[0].speed_kph, 72);
        assert_eq!(reports[3].violations.len(), 1);
        let violation = &session.sink().violations[0];
        assert_eq!(violation.object_id, 1);
        assert_eq!(violation.speed_kph, 72);
        assert_eq!(violation.frame_index, 4);
    }

    #[test]
    fn test_in_transit_count() {
        let mut session = crossing_session();
        session.process_frame(&frame(0.0, vec![detection("car", 0.9, 140.0, 120.0)]));
        assert_eq!(session.in_transit_count(), 1);
        assert_eq!(session.completed_count(), 0);
    }

    #[test]
    fn test_object_first_seen_past_exit_never_enters() {
        let mut session = crossing_session();
        session.process_frame(&frame(0.0, vec![detection("car", 0.9, 140.0, 350.0)]));
        session.process_frame(&frame(0.5, vec![detection("car", 0.9, 140.0, 380.0)]));
        assert_eq!(session.in_transit_count(), 0);
        assert_eq!(session.completed_count(), 0);
    }

    #[test]
    fn test_filtering() {
        let mut session = crossing_session();
        let report = session.process_frame(&frame(
            0.0,
            vec![
                detection("person", 0.95, 100.0, 120.0),
                detection("car", 0.1, 400.0, 120.0),
                detection("bus", 0.8, 700.0, 120.0),
            ],
        ));
        assert!(report.readings.is_empty());
        assert_eq!(session.tracker().len(), 1);
        assert_eq!(session.in_transit_count(), 1);
    }

    #[test]
    fn test_only_first_detections_considered() {
        let mut session = crossing_session();
        let detections = (0..8)
            .map(|i| detection("car", 0.9, i as f32 * 200.0, 120.0))
            .collect();
        session.process_frame(&frame(0.0, detections));
        assert_eq!(session.tracker().len(), 5);
    }

    #[test]
    fn test_malformed_box_is_skipped() {
        let mut session = crossing_session();
        let report = session.process_frame(&frame(
            0.0,
            vec![
                Detection::new("car", 0.9, [200.0, 200.0], [100.0, 100.0]),
                detection("car", 0.9, 500.0, 120.0),
            ],
        ));
        assert_eq!(report.skipped, 1);
        assert_eq!(session.tracker().len(), 1);
    }

    #[test]
    fn test_displacement_over_time() {
        let config = WatchConfig {
            strategy: SpeedStrategy::DisplacementOverTime { frame_rate: 3 },
            ..Default::default()
        };
        let mut session = SpeedSession::new(config, MemorySink::default()).unwrap();
        assert_eq!(session.tracker().config().sample_window, 3);

        let speeds: Vec<u32> = [100.0, 100.0, 70.0]
            .iter()
            .enumerate()
            .map(|(i, &cy)| {
                let report = session.process_frame(&frame(
                    i as f64 / 3.0,
                    vec![detection("truck", 0.7, 300.0, cy)],
                ));
                report.readings[0].speed_kph
            })
            .collect();

        assert_eq!(speeds, vec![0, 0, 108]);
        assert_eq!(session.sink().violations.len(), 1);
        assert_eq!(session.frame_index(), 3);
    }

    #[test]
    fn test_fps_tracks_frame_timestamps() {
        let mut session = crossing_session();
        session.process_frame(&frame(0.0, vec![]));
        session.process_frame(&frame(0.1, vec![]));
        assert!(session.fps() > 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = WatchConfig {
            confidence_threshold: 2.0,
            ..Default::default()
        };
        assert!(SpeedSession::with_log_sink(config).is_err());
    }
}
