//! Cat Stack - a pendulum cat-stacking game
//!
//! Core modules:
//! - `sim`: Tower/stability simulation and the mode-aware game state machine
//! - `config`: Playfield geometry and tunables
//! - `persistence`: Key/value storage backends (LocalStorage on web)
//! - `highscores`: Best-score records on top of storage
//! - `platform`: Frame timing helpers
//! - `web`: JavaScript bindings (wasm32 only)

pub mod config;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use highscores::HighScores;

/// Game constants shared by every mode
pub mod consts {
    /// Longest frame delta the simulation will accept (ms)
    pub const MAX_FRAME_DT_MS: f32 = 33.0;
    /// Reference frame length used for velocity units (60 Hz, in ms)
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Pendulum swing as a fraction of play-area width
    pub const PENDULUM_AMPLITUDE_FRACTION: f32 = 0.35;
    /// Pendulum period at difficulty 0 (ms)
    pub const PENDULUM_BASE_PERIOD_MS: f64 = 3500.0;
    /// Speed-up per difficulty level: multiplier = (1 + F)^level
    pub const DIFFICULTY_SPEEDUP: f64 = 0.175;
    /// Stacked-cat counts at which difficulty goes up one level
    pub const DIFFICULTY_THRESHOLDS: [u32; 8] = [3, 6, 10, 15, 20, 26, 33, 40];

    /// Speed (px/frame) at or below which a body counts as still
    pub const STABILITY_SPEED: f32 = 0.5;
    /// Speed (px/frame) at or above which a cat is wobbling
    pub const WOBBLE_SPEED: f32 = 2.0;
    /// Stillness needed before a falling cat counts as stable (ms)
    pub const REACH_TOP_STABLE_MS: f32 = 2000.0;
    /// Classic cats are static from the moment they spawn
    pub const CLASSIC_STABLE_MS: f32 = 0.0;

    /// Minimum landing contact time before a cat can stick (ms)
    pub const SETTLE_TIME_MS: f64 = 300.0;
    /// Minimum horizontal overlap fraction before a cat can stick
    pub const STICKY_OVERLAP: f32 = 0.55;

    /// Classic alignment tolerance as a fraction of cat width
    pub const ALIGN_TOLERANCE: f32 = 0.8;
    /// Perfect landing tolerance as a fraction of cat width
    pub const PERFECT_TOLERANCE: f32 = 0.125;
    /// Points for every stacked cat
    pub const BASE_POINTS: u32 = 1;
    /// Extra points for a perfect landing
    pub const PERFECT_BONUS: u32 = 2;
    /// How long the "Perfect" marker stays up (ms)
    pub const PERFECT_DISPLAY_MS: f32 = 1000.0;

    /// Delay before input comes back after gameover/win (ms)
    pub const INPUT_REENABLE_MS: f32 = 1000.0;

    /// Squish never compresses below 1 - this
    pub const SQUISH_MAX: f32 = 0.3;
    /// Squish compression per unit of impact speed
    pub const SQUISH_PER_SPEED: f32 = 0.05;
    /// Spring stiffness for the squish recovery (1/s²)
    pub const SQUISH_STIFFNESS: f32 = 400.0;
    /// Squish snaps to rest inside this distance
    pub const SQUISH_EPSILON: f32 = 0.001;
    /// Impact used for the Classic push-down squish
    pub const CLASSIC_LANDING_IMPACT: f32 = 4.0;
}

/// Difficulty level reached for a given stacked count
#[inline]
pub fn difficulty_for(stacked: u32) -> u32 {
    consts::DIFFICULTY_THRESHOLDS
        .iter()
        .filter(|&&t| stacked >= t)
        .count() as u32
}

/// Frame delta the simulation accepts: 0..=MAX_FRAME_DT_MS, and 0 for NaN/inf
#[inline]
pub fn clamp_frame_dt(dt_ms: f32) -> f32 {
    if dt_ms.is_finite() {
        dt_ms.clamp(0.0, consts::MAX_FRAME_DT_MS)
    } else {
        0.0
    }
}
