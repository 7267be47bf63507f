use web_time::Instant;

/// Frame clock: per-frame step and a smoothed FPS readout.
pub struct FrameTiming {
    last_frame: Instant,
    /// Exponential moving average of the frame rate
    smoothed_fps: f32,
    /// Weight of the newest sample (0.0-1.0)
    smoothing: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Start the clock now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Mark the start of a frame and return the seconds since the previous
    /// one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);
        dt
    }

    fn record(&mut self, frame_time: f32) {
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_frames_converge_on_their_rate() {
        let mut timing = FrameTiming::new();
        for _ in 0..400 {
            timing.record(1.0 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 0.1);
    }

    #[test]
    fn zero_length_frames_are_skipped() {
        let mut timing = FrameTiming::new();
        timing.record(0.0);
        assert_eq!(timing.fps(), 60.0);
    }

    #[test]
    fn tick_is_never_negative() {
        let mut timing = FrameTiming::new();
        assert!(timing.tick() >= 0.0);
    }
}
