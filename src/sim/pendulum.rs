//! Pendulum that carries the next cat
//!
//! Position is a pure function of accumulated game time. Difficulty changes
//! rescale that time so the swing never jumps.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pendulum {
    pub center_x: f32,
    pub y: f32,
    pub amplitude: f32,
    pub base_period_ms: f64,
    pub speed_multiplier: f64,
    pub difficulty_level: u32,
    /// Game time only; does not advance while the game is not ticked
    pub accumulated_ms: f64,
}

impl Pendulum {
    /// Pendulum for a play area of `width`, hanging at `y`
    pub fn new(width: f32, y: f32) -> Self {
        Self {
            center_x: width / 2.0,
            y,
            amplitude: width * PENDULUM_AMPLITUDE_FRACTION,
            base_period_ms: PENDULUM_BASE_PERIOD_MS,
            speed_multiplier: 1.0,
            difficulty_level: 0,
            accumulated_ms: 0.0,
        }
    }

    /// Current swing period (ms)
    #[inline]
    pub fn period_ms(&self) -> f64 {
        self.base_period_ms / self.speed_multiplier
    }

    /// Position at an arbitrary accumulated time
    pub fn position_at(&self, t_ms: f64) -> Vec2 {
        let phase = TAU * t_ms / self.period_ms();
        Vec2::new(
            self.center_x + self.amplitude * phase.sin() as f32,
            self.y,
        )
    }

    /// Current position
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position_at(self.accumulated_ms)
    }

    /// Add frame time, clamped to one long frame
    pub fn advance(&mut self, dt_ms: f32) {
        self.accumulated_ms += crate::clamp_frame_dt(dt_ms) as f64;
    }

    /// Speed the swing up to `new_level` without changing the current phase
    pub fn increase_difficulty(&mut self, new_level: u32) {
        let old_multiplier = self.speed_multiplier;
        let new_multiplier = (1.0 + DIFFICULTY_SPEEDUP).powi(new_level as i32);

        // phase = TAU * t * m / P, so keeping t * m fixed keeps the phase fixed
        self.accumulated_ms *= old_multiplier / new_multiplier;
        self.speed_multiplier = new_multiplier;
        self.difficulty_level = new_level;

        log::debug!(
            "Pendulum level {} (x{:.3}, period {:.0}ms)",
            new_level,
            new_multiplier,
            self.period_ms()
        );
    }

    /// Back to level 0 at t = 0
    pub fn reset(&mut self) {
        self.speed_multiplier = 1.0;
        self.difficulty_level = 0;
        self.accumulated_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pendulum() -> Pendulum {
        Pendulum::new(720.0, 100.0)
    }

    #[test]
    fn test_starts_at_center() {
        let p = pendulum();
        assert_eq!(p.position(), Vec2::new(360.0, 100.0));
        assert!((p.amplitude - 252.0).abs() < 1e-3);
    }

    #[test]
    fn test_quarter_period_is_right_extreme() {
        let p = pendulum();
        let x = p.position_at(PENDULUM_BASE_PERIOD_MS / 4.0).x;
        assert!((x - (360.0 + 252.0)).abs() < 1e-2);
    }

    #[test]
    fn test_advance_is_clamped() {
        let mut p = pendulum();
        p.advance(5000.0);
        assert_eq!(p.accumulated_ms, MAX_FRAME_DT_MS as f64);
        p.advance(-10.0);
        assert_eq!(p.accumulated_ms, MAX_FRAME_DT_MS as f64);
        p.advance(f32::NAN);
        assert_eq!(p.accumulated_ms, MAX_FRAME_DT_MS as f64);
        assert!(p.position().is_finite());
    }

    #[test]
    fn test_increase_difficulty_speeds_up() {
        let mut p = pendulum();
        p.increase_difficulty(2);
        assert!((p.speed_multiplier - 1.175f64.powi(2)).abs() < 1e-12);
        assert!(p.period_ms() < PENDULUM_BASE_PERIOD_MS);
        p.reset();
        assert_eq!(p.speed_multiplier, 1.0);
        assert_eq!(p.accumulated_ms, 0.0);
    }

    proptest! {
        #[test]
        fn prop_x_is_bounded(t in 0.0f64..1.0e6, level in 0u32..9) {
            let mut p = pendulum();
            p.increase_difficulty(level);
            let x = p.position_at(t).x;
            prop_assert!(x >= p.center_x - p.amplitude - 1e-3);
            prop_assert!(x <= p.center_x + p.amplitude + 1e-3);
        }

        #[test]
        fn prop_x_is_periodic(t in 0.0f64..1.0e5, level in 0u32..9) {
            let mut p = pendulum();
            p.increase_difficulty(level);
            let a = p.position_at(t).x;
            let b = p.position_at(t + p.period_ms()).x;
            prop_assert!((a - b).abs() < 1e-2);
        }

        #[test]
        fn prop_difficulty_change_is_phase_continuous(
            steps in 1usize..2000,
            from in 0u32..8,
            up in 1u32..3,
        ) {
            let mut p = pendulum();
            p.increase_difficulty(from);
            for _ in 0..steps {
                p.advance(16.0);
            }
            let before = p.position();
            p.increase_difficulty(from + up);
            let after = p.position();

            // Fastest possible horizontal motion in one 33 ms frame
            let max_frame_motion = p.amplitude as f64 * TAU * MAX_FRAME_DT_MS as f64 / p.period_ms();
            prop_assert!(((before.x - after.x).abs() as f64) < max_frame_motion);
            prop_assert!((before.x - after.x).abs() < 1e-2);
        }
    }
}
