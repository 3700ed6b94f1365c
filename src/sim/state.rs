//! Game state types
//!
//! `GameState` is the per-round aggregate. It is rebuilt from scratch on every
//! restart and mode selection; only the persisted records carry over.

use serde::{Deserialize, Serialize};

use super::pendulum::Pendulum;
use super::physics::BodyId;
use super::scoring::ScoreState;
use super::tower::Tower;
use crate::config::GameConfig;
use crate::highscores::HighScores;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// Title screen, any input continues
    Start,
    /// Waiting for an explicit mode pick
    ModeSelect,
    Playing,
    GameOver,
    /// Reach the Top won, waiting for a button
    Win,
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Push-down stacking, ends on a miss
    #[default]
    Classic,
    /// Falling sticky cats, ends at the win line
    ReachTheTop,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::ReachTheTop => "reachTheTop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(GameMode::Classic),
            "reachthetop" | "reach_the_top" | "reach-the-top" => Some(GameMode::ReachTheTop),
            _ => None,
        }
    }
}

/// Why a round ended in a gameover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOverReason {
    /// Classic: dropped cat missed the one below
    Misaligned,
    /// Classic: a cat left the playfield
    CatFell,
    /// Classic: the tower reached the ground
    TowerFilled,
}

/// Cats summary for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatStats {
    pub dropped: u32,
    pub lost: u32,
    pub stacked: u32,
}

/// Proof that a re-enable was scheduled by a particular round
///
/// The gate counts its own pending re-enable down in `update`. Hosts that
/// schedule the re-enable themselves (a JS `setTimeout`, say) keep the token
/// and hand it to `fire` later; a token from before a `reset` does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReenableToken(u64);

#[derive(Debug, Clone, Copy)]
struct PendingReenable {
    remaining_ms: f32,
    token: ReenableToken,
}

/// Player input lock with a cancelable deferred re-enable
///
/// Every `reset` starts a new generation and drops the pending re-enable.
/// Generations only matter to tokens held outside the gate.
#[derive(Debug, Clone)]
pub struct InputGate {
    enabled: bool,
    generation: u64,
    pending: Option<PendingReenable>,
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InputGate {
    pub fn new() -> Self {
        Self {
            enabled: true,
            generation: 0,
            pending: None,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Lock input now and schedule it to come back after `delay_ms`
    pub fn disable_for(&mut self, delay_ms: f32) -> ReenableToken {
        let token = ReenableToken(self.generation);
        self.enabled = false;
        self.pending = Some(PendingReenable {
            remaining_ms: delay_ms,
            token,
        });
        token
    }

    /// Count down the pending re-enable
    pub fn update(&mut self, dt_ms: f32) {
        if let Some(pending) = self.pending.as_mut() {
            pending.remaining_ms -= dt_ms;
            if pending.remaining_ms <= 0.0 {
                let token = pending.token;
                self.fire(token);
            }
        }
    }

    /// Run a scheduled re-enable. Returns false for a stale token.
    pub fn fire(&mut self, token: ReenableToken) -> bool {
        if token.0 != self.generation {
            log::debug!("Ignoring stale input re-enable");
            return false;
        }
        self.pending = None;
        self.enabled = true;
        true
    }

    /// New generation: input on, nothing pending
    pub fn reset(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.enabled = true;
    }
}

/// Everything about the current round
#[derive(Debug, Clone)]
pub struct GameState {
    pub screen: Screen,
    pub mode: GameMode,
    pub cats_dropped: u32,
    pub cats_lost: u32,
    /// Cats removed without ever joining the tower (Classic misses)
    pub cats_discarded: u32,
    /// The round's score passed the high score it started with
    pub beat_high_score: bool,
    pub game_over_reason: Option<GameOverReason>,
    pub tower: Tower,
    pub pendulum: Pendulum,
    pub score: ScoreState,
    /// Game time of the last accepted drop
    pub last_drop_ms: Option<f64>,
}

impl GameState {
    pub fn new(screen: Screen, mode: GameMode, ground: BodyId, config: &GameConfig, records: HighScores) -> Self {
        Self {
            screen,
            mode,
            cats_dropped: 0,
            cats_lost: 0,
            cats_discarded: 0,
            beat_high_score: false,
            game_over_reason: None,
            tower: Tower::new(ground),
            pendulum: Pendulum::new(config.width, config.pendulum_y),
            score: ScoreState::new(records),
            last_drop_ms: None,
        }
    }

    pub fn cat_stats(&self) -> CatStats {
        CatStats {
            dropped: self.cats_dropped,
            lost: self.cats_lost,
            stacked: self
                .cats_dropped
                .saturating_sub(self.cats_lost)
                .saturating_sub(self.cats_discarded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(GameMode::parse("Classic"), Some(GameMode::Classic));
        assert_eq!(GameMode::parse("reachTheTop"), Some(GameMode::ReachTheTop));
        assert_eq!(GameMode::parse("zen"), None);
        assert_eq!(GameMode::parse(GameMode::ReachTheTop.as_str()), Some(GameMode::ReachTheTop));
    }

    #[test]
    fn test_input_gate_reenables_after_delay() {
        let mut gate = InputGate::new();
        gate.disable_for(1000.0);
        assert!(!gate.is_enabled());
        gate.update(999.0);
        assert!(!gate.is_enabled());
        gate.update(1.0);
        assert!(gate.is_enabled());
        assert!(!gate.has_pending());
    }

    #[test]
    fn test_input_gate_stale_token_is_ignored() {
        let mut gate = InputGate::new();
        let old = gate.disable_for(1000.0);
        gate.reset();
        let fresh = gate.disable_for(1000.0);

        assert!(!gate.fire(old));
        assert!(!gate.is_enabled());
        assert!(gate.fire(fresh));
        assert!(gate.is_enabled());
    }

    #[test]
    fn test_input_gate_reset_cancels_pending() {
        let mut gate = InputGate::new();
        gate.disable_for(1000.0);
        gate.reset();
        assert!(gate.is_enabled());
        assert!(!gate.has_pending());
    }

    #[test]
    fn test_cat_stats() {
        let mut state = GameState::new(
            Screen::Playing,
            GameMode::ReachTheTop,
            BodyId(1),
            &GameConfig::default(),
            HighScores::default(),
        );
        state.cats_dropped = 6;
        state.cats_lost = 1;
        assert_eq!(
            state.cat_stats(),
            CatStats {
                dropped: 6,
                lost: 1,
                stacked: 5
            }
        );
    }

    #[test]
    fn test_discarded_cats_are_not_stacked() {
        let mut state = GameState::new(
            Screen::Playing,
            GameMode::Classic,
            BodyId(1),
            &GameConfig::default(),
            HighScores::default(),
        );
        state.cats_dropped = 2;
        state.cats_discarded = 1;
        assert_eq!(state.cat_stats().stacked, 1);
        assert_eq!(state.cat_stats().lost, 0);
    }
}
