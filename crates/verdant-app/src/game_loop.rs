//! Fixed-timestep loop implementing the "Fix Your Timestep" pattern.
//!
//! Simulation runs at a fixed 60 Hz regardless of how frame time arrives.
//! The headless runner feeds frame times explicitly, so runs are reproducible.

use tracing::warn;

/// Fixed simulation timestep: 60 Hz (16.67 ms per tick).
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Maximum frame time clamp to prevent spiral of death.
/// Longer frames are clamped and the simulation accepts slowdown.
pub const MAX_FRAME_TIME: f64 = 0.25; // 250ms = 4 FPS minimum

/// Fixed-timestep accumulator.
#[derive(Debug, Default)]
pub struct GameLoop {
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    /// Creates a loop with an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame of `frame_time` seconds.
    ///
    /// `update_fn(fixed_dt, total_sim_time)` is called zero or more times at
    /// the fixed rate. Returns how many steps ran.
    pub fn advance(&mut self, frame_time: f64, mut update_fn: impl FnMut(f64, f64)) -> u32 {
        let frame_time = if !frame_time.is_finite() || frame_time < 0.0 {
            0.0
        } else if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
            steps += 1;
        }

        self.frame_count += 1;
        steps
    }

    /// Interpolation alpha in `[0.0, 1.0)` between the last two steps.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    /// Returns the total number of frames fed to [`advance`](Self::advance).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the total number of simulation update steps executed.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Returns the total simulation time in seconds.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dt_value() {
        assert!(
            (FIXED_DT - 1.0 / 60.0).abs() < f64::EPSILON * 10.0,
            "FIXED_DT should equal 1/60"
        );
    }

    #[test]
    fn test_accumulator_single_step() {
        let mut loop_ = GameLoop::new();
        let mut updates = 0u32;
        let steps = loop_.advance(FIXED_DT, |_, _| updates += 1);
        assert_eq!(updates, 1);
        assert_eq!(steps, 1);
        assert!(loop_.alpha().abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_multiple_steps() {
        let mut loop_ = GameLoop::new();
        let mut sim_times = Vec::new();
        loop_.advance(3.0 * FIXED_DT + 1e-9, |_, sim_time| sim_times.push(sim_time));
        assert_eq!(sim_times.len(), 3);
        assert!(sim_times[0].abs() < 1e-12);
        assert!((sim_times[2] - 2.0 * FIXED_DT).abs() < 1e-12);
        assert!((loop_.total_sim_time() - 3.0 * FIXED_DT).abs() < 1e-12);
    }

    #[test]
    fn test_partial_frame_carries_over() {
        let mut loop_ = GameLoop::new();
        assert_eq!(loop_.advance(0.5 * FIXED_DT, |_, _| {}), 0);
        assert!((loop_.alpha() - 0.5).abs() < 1e-10);
        assert_eq!(loop_.advance(0.6 * FIXED_DT, |_, _| {}), 1);
        assert!((0.0..1.0).contains(&loop_.alpha()));
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut loop_ = GameLoop::new();
        let steps = loop_.advance(1.0, |_, _| {});
        let max_updates = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(steps <= max_updates, "Expected at most {max_updates}, got {steps}");
        assert!(steps > 0);
    }

    #[test]
    fn test_bad_frame_times_are_ignored() {
        let mut loop_ = GameLoop::new();
        assert_eq!(loop_.advance(f64::NAN, |_, _| {}), 0);
        assert_eq!(loop_.advance(-1.0, |_, _| {}), 0);
        assert_eq!(loop_.frame_count(), 2);
        assert_eq!(loop_.update_count(), 0);
    }

    #[test]
    fn test_deterministic_sequence() {
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018];

        let mut loop_a = GameLoop::new();
        let mut loop_b = GameLoop::new();

        for &ft in &frame_times {
            loop_a.advance(ft, |_, _| {});
            loop_b.advance(ft, |_, _| {});
            assert!((loop_a.alpha() - loop_b.alpha()).abs() < 1e-15);
        }

        assert_eq!(loop_a.update_count(), loop_b.update_count());
        assert_eq!(loop_a.frame_count(), loop_b.frame_count());
        let expected = loop_a.update_count() as f64 * FIXED_DT;
        assert!((loop_a.total_sim_time() - expected).abs() < 1e-10);
    }
}
