//! Per-frame simulation tick
//!
//! Order inside a playing tick is fixed:
//! physics step -> tower update -> win/loss check -> score update -> pendulum advance

use super::physics::PhysicsWorld;
use super::session::GameSession;
use super::state::Screen;
use crate::clamp_frame_dt;
use crate::persistence::Storage;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// The generic action (tap/click/space): continue, drop, or restart
    pub drop: bool,
}

impl<W: PhysicsWorld, S: Storage> GameSession<W, S> {
    /// Advance the session by one frame
    pub fn tick(&mut self, input: &TickInput, dt_ms: f32) {
        let dt = clamp_frame_dt(dt_ms);

        // Deferred re-enable runs even while an end screen is up
        self.input.update(dt);

        if input.drop {
            self.handle_action();
        }

        if self.state.screen != Screen::Playing {
            self.state.score.update(dt);
            return;
        }

        self.clock_ms += dt as f64;
        let now = self.clock_ms;

        // 1. Physics
        self.world.step(dt);
        for contact in self.world.drain_contacts() {
            self.rules
                .on_contact(&mut self.state.tower, &self.world, &contact, now);
        }

        // 2. Tower
        let events = self
            .rules
            .update(&mut self.state.tower, &mut self.world, dt, now, &self.config);
        self.apply_events(&events);

        // 3. Win (a cat that stuck this tick counts this tick)
        if self.state.screen == Screen::Playing
            && self.rules.uses_win_line()
            && self
                .state
                .tower
                .check_win_condition(&self.world, self.config.win_line_y)
        {
            self.end_round(Screen::Win, None);
        }

        // 4. Score
        self.state.score.update(dt);

        // 5. Pendulum
        if self.state.screen == Screen::Playing {
            self.state.pendulum.advance(dt);
        }
    }

    /// The generic action, interpreted by screen
    ///
    /// Mode select and win screens only move on explicit buttons.
    pub fn handle_action(&mut self) {
        match self.state.screen {
            Screen::Start => self.open_mode_select(),
            Screen::Playing => {
                self.drop_cat();
            }
            Screen::GameOver => {
                if self.input.is_enabled() {
                    self.restart_game();
                }
            }
            Screen::ModeSelect | Screen::Win => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::{MAX_FRAME_DT_MS, REFERENCE_FRAME_MS};
    use crate::persistence::MemoryStorage;
    use crate::sim::rapier_world::RapierWorld;
    use crate::sim::state::GameMode;

    fn session() -> GameSession<RapierWorld, MemoryStorage> {
        GameSession::new(GameConfig::default(), RapierWorld::new(), MemoryStorage::new(), 12345)
    }

    #[test]
    fn test_start_to_mode_select() {
        let mut s = session();
        assert_eq!(s.screen(), Screen::Start);

        s.tick(&TickInput { drop: true }, REFERENCE_FRAME_MS);
        assert_eq!(s.screen(), Screen::ModeSelect);

        // Generic input does nothing on mode select
        s.tick(&TickInput { drop: true }, REFERENCE_FRAME_MS);
        assert_eq!(s.screen(), Screen::ModeSelect);
        assert_eq!(s.state().cats_dropped, 0);
    }

    #[test]
    fn test_pendulum_only_moves_while_playing() {
        let mut s = session();
        s.tick(&TickInput::default(), REFERENCE_FRAME_MS);
        assert_eq!(s.state().pendulum.accumulated_ms, 0.0);

        s.select_game_mode(GameMode::Classic);
        s.tick(&TickInput::default(), 500.0);
        assert_eq!(s.state().pendulum.accumulated_ms, MAX_FRAME_DT_MS as f64);
        assert_eq!(s.clock_ms(), MAX_FRAME_DT_MS as f64);
    }

    #[test]
    fn test_non_finite_dt_is_a_zero_frame() {
        let mut s = session();
        s.select_game_mode(GameMode::ReachTheTop);
        assert!(s.drop_cat());

        s.tick(&TickInput::default(), f32::NAN);
        s.tick(&TickInput::default(), f32::INFINITY);
        assert_eq!(s.clock_ms(), 0.0);
        assert_eq!(s.state().pendulum.accumulated_ms, 0.0);

        for _ in 0..10 {
            s.tick(&TickInput::default(), REFERENCE_FRAME_MS);
        }
        assert!(s.clock_ms().is_finite() && s.clock_ms() > 0.0);
        assert!(s.state().pendulum.position().is_finite());
        let snapshot = s.snapshot();
        assert!(snapshot.cats.iter().all(|c| c.pos.is_finite()));
    }

    #[test]
    fn test_drop_cooldown() {
        let config = GameConfig {
            drop_cooldown_ms: 350.0,
            ..GameConfig::default()
        };
        let mut s = GameSession::new(config, RapierWorld::new(), MemoryStorage::new(), 12345);
        s.select_game_mode(GameMode::ReachTheTop);
        assert!(s.drop_cat());
        assert!(!s.drop_cat());
        for _ in 0..30 {
            s.tick(&TickInput::default(), REFERENCE_FRAME_MS);
        }
        assert!(s.drop_cat());
        assert_eq!(s.state().cats_dropped, 2);
    }

    #[test]
    fn test_determinism() {
        let mut a = session();
        let mut b = session();
        for s in [&mut a, &mut b] {
            s.select_game_mode(GameMode::ReachTheTop);
            for frame in 0..600 {
                let input = TickInput {
                    drop: frame % 45 == 0,
                };
                s.tick(&input, REFERENCE_FRAME_MS);
            }
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
