//! Frame timing: clamped deltas, FPS sampling, and pacing

use std::thread;
use std::time::{Duration, Instant};

/// Minimum window between FPS samples
pub const FPS_SAMPLE_WINDOW: Duration = Duration::from_millis(1000);

/// Convert an elapsed duration to seconds, capped at `max_delta`
pub fn clamp_delta(elapsed: Duration, max_delta: f32) -> f32 {
    elapsed.as_secs_f32().min(max_delta)
}

/// Counts frames and recomputes FPS once per sample window
#[derive(Clone, Debug)]
pub struct FrameStats {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FrameStats {
    pub fn starting_at(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Count one frame finished at `now`; returns the new FPS when a window closes
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < FPS_SAMPLE_WINDOW {
            return None;
        }
        self.fps = self.frames as f32 * 1000.0 / elapsed.as_millis() as f32;
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    /// Last sampled FPS (0 until the first window closes)
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Drives per-frame timing for the engine loop
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_frame: Instant,
    frame_start: Instant,
    target_frame: Duration,
    max_delta: f32,
    stats: FrameStats,
}

impl FrameClock {
    pub fn new(target_fps: u32, max_delta: f32) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            frame_start: now,
            target_frame: Duration::from_secs(1) / target_fps.max(1),
            max_delta,
            stats: FrameStats::starting_at(now),
        }
    }

    /// Restart timing, e.g. right before the loop begins
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.frame_start = now;
        self.stats = FrameStats::starting_at(now);
    }

    /// Begin a frame and return its clamped delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = clamp_delta(now.saturating_duration_since(self.last_frame), self.max_delta);
        self.last_frame = now;
        self.frame_start = now;
        dt
    }

    /// Close the frame: sample stats, then sleep off the rest of the frame budget
    pub fn finish_frame(&mut self) -> Option<f32> {
        let sample = self.stats.record(Instant::now());
        let spent = self.frame_start.elapsed();
        if spent < self.target_frame {
            thread::sleep(self.target_frame - spent);
        }
        sample
    }

    pub fn fps(&self) -> f32 {
        self.stats.fps()
    }

    pub fn target_frame(&self) -> Duration {
        self.target_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delta_caps_spikes() {
        assert!((clamp_delta(Duration::from_millis(16), 0.1) - 0.016).abs() < 1e-6);
        assert_eq!(clamp_delta(Duration::from_secs(3), 0.1), 0.1);
    }

    #[test]
    fn test_fps_sampled_once_per_window() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);

        for i in 1..60 {
            assert_eq!(stats.record(start + Duration::from_millis(i * 10)), None);
        }
        let fps = stats.record(start + Duration::from_millis(1000)).unwrap();
        assert_eq!(fps, 60.0);
        assert_eq!(stats.fps(), 60.0);

        // Next window starts fresh
        assert_eq!(stats.record(start + Duration::from_millis(1500)), None);
        let fps = stats.record(start + Duration::from_millis(2000)).unwrap();
        assert_eq!(fps, 2.0);
    }

    #[test]
    fn test_target_frame_budget() {
        let clock = FrameClock::new(100, 0.1);
        assert_eq!(clock.target_frame(), Duration::from_millis(10));
    }

    #[test]
    fn test_pacing_holds_frame_rate() {
        let mut clock = FrameClock::new(50, 0.1);
        clock.reset();
        let start = Instant::now();
        for _ in 0..3 {
            clock.tick();
            clock.finish_frame();
        }
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
