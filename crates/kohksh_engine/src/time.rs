//! Game time with scaling and slow motion

/// Default time scale used by [`TimeManager::set_slow_motion`] callers
pub const DEFAULT_SLOW_MOTION: f32 = 0.1;

/// Accumulates scaled game time from frame deltas
#[derive(Clone, Debug, PartialEq)]
pub struct TimeManager {
    game_time: f32,
    delta: f32,
    time_scale: f32,
    slow_motion: bool,
    slow_motion_factor: f32,
}

impl TimeManager {
    pub fn new() -> Self {
        Self {
            game_time: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            slow_motion: false,
            slow_motion_factor: DEFAULT_SLOW_MOTION,
        }
    }

    /// Start from a configured scale (clamped to >= 0)
    pub fn with_time_scale(scale: f32) -> Self {
        let mut time = Self::new();
        time.set_time_scale(scale);
        time
    }

    pub fn update(&mut self, dt: f32) {
        self.delta = dt;
        self.game_time += dt * self.time_scale;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn set_slow_motion(&mut self, enable: bool, factor: f32) {
        self.slow_motion = enable;
        self.slow_motion_factor = factor;
        self.time_scale = if enable { factor.max(0.0) } else { 1.0 };
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Unscaled delta of the last update
    pub fn raw_delta(&self) -> f32 {
        self.delta
    }

    pub fn scaled_delta(&self) -> f32 {
        self.delta * self.time_scale
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_slow_motion(&self) -> bool {
        self.slow_motion
    }

    pub fn slow_motion_factor(&self) -> f32 {
        self.slow_motion_factor
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_accumulates_scaled_time() {
        let mut time = TimeManager::new();
        time.update(0.5);
        time.set_time_scale(2.0);
        time.update(0.25);

        assert!((time.game_time() - 1.0).abs() < 1e-6);
        assert_eq!(time.raw_delta(), 0.25);
        assert_eq!(time.scaled_delta(), 0.5);
    }

    #[test]
    fn test_negative_scale_clamps_to_zero() {
        let mut time = TimeManager::with_time_scale(-3.0);
        assert_eq!(time.time_scale(), 0.0);
        time.update(1.0);
        assert_eq!(time.game_time(), 0.0);
    }

    #[test]
    fn test_slow_motion_toggle() {
        let mut time = TimeManager::new();
        time.set_slow_motion(true, DEFAULT_SLOW_MOTION);
        assert!(time.is_slow_motion());
        assert_eq!(time.time_scale(), 0.1);

        time.set_slow_motion(false, DEFAULT_SLOW_MOTION);
        assert_eq!(time.time_scale(), 1.0);
    }
}
