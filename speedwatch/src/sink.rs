//! Destinations for speed-limit violations

use crate::types::Violation;

/// Receives every reading above the speed limit
pub trait ViolationSink: Send {
    fn record(&mut self, violation: &Violation);
}

/// Keeps violations in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub violations: Vec<Violation>,
}

impl ViolationSink for MemorySink {
    fn record(&mut self, violation: &Violation) {
        self.violations.push(violation.clone());
    }
}

/// Writes violations to the log at warn level
#[derive(Debug, Default)]
pub struct LogSink;

impl ViolationSink for LogSink {
    fn record(&mut self, violation: &Violation) {
        log::warn!(
            "Speed violation: object {} at {} km/h (t={:.3}s, frame {})",
            violation.object_id,
            violation.speed_kph,
            violation.timestamp,
            violation.frame_index
        );
    }
}
