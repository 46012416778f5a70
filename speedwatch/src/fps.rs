//! Smoothed processing rate

/// Exponential moving average of frames per second: `fps = 0.9 * fps + 0.1 / loop_time`
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    fps: f64,
    last_timestamp: Option<f64>,
}

impl FpsMeter {
    const DECAY: f64 = 0.9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the duration of one loop iteration in seconds
    pub fn record_loop(&mut self, loop_time: f64) -> f64 {
        if loop_time > 0.0 && loop_time.is_finite() {
            self.fps = Self::DECAY * self.fps + (1.0 - Self::DECAY) / loop_time;
        }
        self.fps
    }

    /// Feed a frame timestamp; the loop time is the gap to the previous one
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        if let Some(previous) = self.last_timestamp.replace(timestamp) {
            self.record_loop(timestamp - previous);
        }
        self.fps
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}
