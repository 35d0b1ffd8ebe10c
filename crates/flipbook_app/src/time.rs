use std::time::Instant;

/// Per-loop timing state
///
/// Owned by the app runner and handed to every frame, so no timing state lives
/// in globals
pub struct FrameTimer {
    last_time: Option<Instant>,
    accumulator: f32,
    frame_count: u32,
    /// Time in seconds since the last frame
    pub delta: f32,
    /// Frames per second, updated once per second
    pub fps: u32,
    /// Total number of frames rendered since start
    pub frame: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self {
            last_time: None,
            accumulator: 0.0,
            frame_count: 0,
            delta: 0.0,
            fps: 0,
            frame: 0,
        }
    }
}

impl FrameTimer {
    /// Updates delta time & calculates FPS
    pub(crate) fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// The first update only establishes the baseline, leaving `delta` at zero
    pub(crate) fn update_at(&mut self, now: Instant) {
        self.delta = self
            .last_time
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_time = Some(now);

        self.accumulator += self.delta;
        self.frame_count += 1;
        self.frame += 1;

        if self.accumulator >= 1.0 {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.accumulator = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_update_has_zero_delta() {
        let mut timer = FrameTimer::default();
        timer.update_at(Instant::now());
        assert_eq!(timer.delta, 0.0);
        assert_eq!(timer.frame, 1);
    }

    #[test]
    fn delta_tracks_time_between_updates() {
        let mut timer = FrameTimer::default();
        let start = Instant::now();
        timer.update_at(start);
        timer.update_at(start + Duration::from_millis(250));
        assert!((timer.delta - 0.25).abs() < 1e-6);
    }

    #[test]
    fn fps_is_reported_once_a_second_has_passed() {
        let mut timer = FrameTimer::default();
        let start = Instant::now();
        for i in 0..8 {
            timer.update_at(start + Duration::from_millis(125 * i));
        }
        assert_eq!(timer.fps, 0);

        // 8 steps of 125ms fill the first second
        timer.update_at(start + Duration::from_millis(1000));
        assert_eq!(timer.fps, 9);
        assert_eq!(timer.frame, 9);
    }
}
