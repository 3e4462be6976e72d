//! Time-driven difficulty ramp
//!
//! A single progress scalar derived from elapsed session time drives the
//! thrower's spawn rate and projectile speed range. Saturate mode hardens
//! monotonically and stays at peak; ping-pong mode triangle-waves between
//! easy and hard with period `2 * time_to_max`, so the session breathes.
//! Owned by the authority, recomputed every tick, never persisted.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;
use crate::{clamp01, lerp, ping_pong};

/// How progress behaves past the ramp duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampMode {
    /// Clamp at 1.0 and stay at peak difficulty
    Saturate,
    /// Triangle-wave between 0 and 1
    PingPong,
}

/// Interpolated outputs applied to the spawn scheduler each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyOutputs {
    pub spawn_rate: f32,
    pub speed_range: [f32; 2],
}

/// Elapsed-time difficulty state
#[derive(Debug, Clone)]
pub struct DifficultyRamp {
    elapsed: f32,
    time_to_max: f32,
    mode: RampMode,
    start_spawn_rate: f32,
    max_spawn_rate: f32,
    start_speed_range: [f32; 2],
    max_speed_range: [f32; 2],
}

impl DifficultyRamp {
    pub fn from_tuning(t: &DifficultyTuning) -> Self {
        Self {
            elapsed: 0.0,
            time_to_max: t.time_to_max,
            mode: if t.ping_pong {
                RampMode::PingPong
            } else {
                RampMode::Saturate
            },
            start_spawn_rate: t.start_spawn_rate,
            max_spawn_rate: t.max_spawn_rate,
            start_speed_range: t.start_speed_range,
            max_speed_range: t.max_speed_range,
        }
    }

    /// Normalized progress at an arbitrary elapsed time
    pub fn progress_at(&self, elapsed: f32) -> f32 {
        // Degenerate ramp duration degrades to permanent peak difficulty
        if self.time_to_max <= 0.0 {
            return 1.0;
        }
        let t = elapsed / self.time_to_max;
        match self.mode {
            RampMode::Saturate => clamp01(t),
            RampMode::PingPong => ping_pong(t, 1.0),
        }
    }

    /// Normalized progress now
    pub fn progress(&self) -> f32 {
        self.progress_at(self.elapsed)
    }

    /// Advance the session clock and return the interpolated outputs
    pub fn advance(&mut self, dt: f32) -> DifficultyOutputs {
        self.elapsed += dt;
        self.outputs()
    }

    /// Outputs at the current progress
    pub fn outputs(&self) -> DifficultyOutputs {
        let p = self.progress();
        DifficultyOutputs {
            spawn_rate: lerp(self.start_spawn_rate, self.max_spawn_rate, p),
            speed_range: [
                lerp(self.start_speed_range[0], self.max_speed_range[0], p),
                lerp(self.start_speed_range[1], self.max_speed_range[1], p),
            ],
        }
    }

    /// Back to session start (session restart)
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(mode: RampMode) -> DifficultyRamp {
        DifficultyRamp {
            elapsed: 0.0,
            time_to_max: 60.0,
            mode,
            start_spawn_rate: 0.5,
            max_spawn_rate: 2.0,
            start_speed_range: [1.5, 3.0],
            max_speed_range: [4.0, 6.0],
        }
    }

    #[test]
    fn test_saturate_progress() {
        let r = ramp(RampMode::Saturate);
        assert_eq!(r.progress_at(0.0), 0.0);
        assert_eq!(r.progress_at(60.0), 1.0);
        assert_eq!(r.progress_at(120.0), 1.0);
    }

    #[test]
    fn test_ping_pong_progress() {
        let r = ramp(RampMode::PingPong);
        assert!((r.progress_at(0.0) - 0.0).abs() < 1e-6);
        assert!((r.progress_at(60.0) - 1.0).abs() < 1e-6);
        assert!((r.progress_at(120.0) - 0.0).abs() < 1e-6);
        assert!((r.progress_at(90.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_outputs_interpolate_endpoints() {
        let mut r = ramp(RampMode::Saturate);
        let start = r.outputs();
        assert_eq!(start.spawn_rate, 0.5);
        assert_eq!(start.speed_range, [1.5, 3.0]);

        let peak = r.advance(60.0);
        assert_eq!(peak.spawn_rate, 2.0);
        assert_eq!(peak.speed_range, [4.0, 6.0]);
    }

    #[test]
    fn test_midpoint_interpolation() {
        let mut r = ramp(RampMode::Saturate);
        let mid = r.advance(30.0);
        assert!((mid.spawn_rate - 1.25).abs() < 1e-5);
        assert!((mid.speed_range[0] - 2.75).abs() < 1e-5);
        assert!((mid.speed_range[1] - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut r = ramp(RampMode::PingPong);
        let _ = r.advance(45.0);
        r.reset();
        assert_eq!(r.progress(), 0.0);
        assert_eq!(r.outputs().spawn_rate, 0.5);
    }

    #[test]
    fn test_zero_duration_degrades_to_peak() {
        let mut r = ramp(RampMode::Saturate);
        r.time_to_max = 0.0;
        assert_eq!(r.progress(), 1.0);
    }
}
