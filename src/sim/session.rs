//! Game session lifecycle
//!
//! A `GameSession` owns everything one running game needs: the physics
//! world, storage for records, the current round and the input lock.
//!
//! Lifecycle:
//! - `new`: creates the ground (the baseline bodies) and loads records
//! - `select_game_mode` / `restart_game` / `go_to_mode_select`: rebuild the round
//! - `destroy`: removes every body this session created and hands back world and storage
//!
//! Whenever a round is torn down, the world is left holding exactly the
//! baseline bodies.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::cat::{Cat, Variant};
use super::physics::{BodyDesc, BodyId, PhysicsWorld};
use super::snapshot::CatView;
use super::state::{CatStats, GameMode, GameOverReason, GameState, InputGate, Screen};
use super::tower::{TowerEvent, TowerRules, rules_for};
use crate::config::GameConfig;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::persistence::Storage;

pub struct GameSession<W: PhysicsWorld, S: Storage> {
    pub(super) config: GameConfig,
    pub(super) world: W,
    pub(super) storage: S,
    pub(super) ground: BodyId,
    pub(super) baseline_bodies: usize,
    pub(super) state: GameState,
    pub(super) rules: Box<dyn TowerRules>,
    pub(super) input: InputGate,
    pub(super) rng: Pcg32,
    /// Game time of the current round (sum of clamped deltas)
    pub(super) clock_ms: f64,
    /// The last tower shown before a round ended, for the end screens
    pub(super) final_cats: Vec<CatView>,
}

impl<W: PhysicsWorld, S: Storage> GameSession<W, S> {
    /// Set up a session on the start screen
    pub fn new(config: GameConfig, mut world: W, storage: S, seed: u64) -> Self {
        let ground = world.create_body(&BodyDesc::fixed(
            Vec2::new(config.center_x(), config.height - config.ground_height / 2.0),
            Vec2::new(config.width, config.ground_height),
        ));
        let baseline_bodies = world.body_count();
        let records = HighScores::load(&storage);
        let mode = GameMode::default();

        log::info!(
            "Session created ({}x{}, seed {}, {} baseline bodies)",
            config.width,
            config.height,
            seed,
            baseline_bodies
        );

        Self {
            state: GameState::new(Screen::Start, mode, ground, &config, records),
            rules: rules_for(mode),
            config,
            world,
            storage,
            ground,
            baseline_bodies,
            input: InputGate::new(),
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0.0,
            final_cats: Vec::new(),
        }
    }

    /// Tear the session down, returning the (emptied) world and the storage
    pub fn destroy(mut self) -> (W, S) {
        let removed = self.state.tower.clear(&mut self.world);
        self.world.remove_body(self.ground);
        self.world.drain_contacts();
        log::info!("Session destroyed ({} cats removed)", removed);
        (self.world, self.storage)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Direct world access for hosts that script the scene
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[inline]
    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    #[inline]
    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    #[inline]
    pub fn input_enabled(&self) -> bool {
        self.input.is_enabled()
    }

    /// Bodies the world holds with no round in progress
    #[inline]
    pub fn baseline_body_count(&self) -> usize {
        self.baseline_bodies
    }

    #[inline]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn get_cat_stats(&self) -> CatStats {
        self.state.cat_stats()
    }

    /// Start screen -> mode select
    pub fn open_mode_select(&mut self) {
        if self.state.screen == Screen::Start {
            log::info!("Showing mode select");
            self.state.screen = Screen::ModeSelect;
        }
    }

    /// Start a fresh round in `mode`
    pub fn select_game_mode(&mut self, mode: GameMode) {
        log::info!("Selected mode {}", mode.as_str());
        self.reset_round(mode, Screen::Playing);
    }

    /// Start the same mode over
    pub fn restart_game(&mut self) {
        log::info!("Restarting {}", self.state.mode.as_str());
        self.reset_round(self.state.mode, Screen::Playing);
    }

    /// Leave the round for the mode select screen
    pub fn go_to_mode_select(&mut self) {
        self.reset_round(self.state.mode, Screen::ModeSelect);
    }

    /// Drop a cat with a random variant
    pub fn drop_cat(&mut self) -> bool {
        let variant = Variant::random(&mut self.rng);
        self.drop_cat_with(variant)
    }

    /// Drop a cat at the pendulum. Returns false if the drop was not accepted.
    pub fn drop_cat_with(&mut self, variant: Variant) -> bool {
        if self.state.screen != Screen::Playing || !self.input.is_enabled() {
            return false;
        }
        if let Some(last) = self.state.last_drop_ms {
            if self.clock_ms - last < self.config.drop_cooldown_ms as f64 {
                return false;
            }
        }

        let pos = self.state.pendulum.position();
        let cat = Cat::spawn(&mut self.world, pos, variant, self.state.mode, &self.config);
        self.state.cats_dropped += 1;
        self.state.last_drop_ms = Some(self.clock_ms);
        log::debug!("Drop #{} at x={:.0}", self.state.cats_dropped, pos.x);

        let events = self
            .rules
            .on_drop(&mut self.state.tower, &mut self.world, cat, &self.config);
        self.apply_events(&events);
        true
    }

    /// Fold tower events into counters, score, difficulty and screen
    pub(super) fn apply_events(&mut self, events: &[TowerEvent]) {
        for event in events {
            match *event {
                TowerEvent::Stacked { pos, reference_x, .. } => {
                    let (landing, new_high) = self.state.score.award_landing(
                        pos,
                        reference_x,
                        self.config.center_x(),
                        self.config.cat_width,
                    );
                    if new_high && !self.state.beat_high_score {
                        log::info!("New high score!");
                    }
                    self.state.beat_high_score |= new_high;
                    if landing.perfect {
                        log::debug!("Perfect landing (offset {:.1})", landing.offset);
                    }
                }
                TowerEvent::Stuck { .. } => {}
                TowerEvent::Lost { cat } => {
                    self.state.cats_lost += 1;
                    log::debug!("Lost cat {:?} ({} lost)", cat, self.state.cats_lost);
                }
                TowerEvent::DifficultyUp { level } => {
                    log::info!("Difficulty up: level {}", level);
                    self.state.pendulum.increase_difficulty(level);
                }
                TowerEvent::Fell { .. } => {
                    self.state.cats_lost += 1;
                    self.end_round(Screen::GameOver, Some(GameOverReason::CatFell))
                }
                TowerEvent::Misaligned { .. } => {
                    self.state.cats_discarded += 1;
                    self.end_round(Screen::GameOver, Some(GameOverReason::Misaligned))
                }
                TowerEvent::TowerFilled => {
                    self.end_round(Screen::GameOver, Some(GameOverReason::TowerFilled))
                }
            }
            if self.state.screen != Screen::Playing {
                break;
            }
        }
    }

    /// Leave the playing screen: save records, clear bodies, lock input briefly
    pub(super) fn end_round(&mut self, screen: Screen, reason: Option<GameOverReason>) {
        if self.state.screen != Screen::Playing {
            return;
        }
        let stats = self.state.cat_stats();

        match screen {
            Screen::Win => {
                let cats_used = self.state.cats_dropped;
                if self.state.score.record_reach_top_win(cats_used) {
                    log::info!("New best: {} cats", cats_used);
                    HighScores::save_best(&mut self.storage, cats_used);
                }
                log::info!("Won with {} cats ({} lost)", cats_used, stats.lost);
            }
            _ => {
                if self.state.beat_high_score {
                    HighScores::save_high_score(&mut self.storage, self.state.score.high_score);
                }
                log::info!(
                    "Game over ({:?}): score {}, {} cats",
                    reason,
                    self.state.score.score,
                    stats.dropped
                );
            }
        }

        self.final_cats = self.cat_views();
        self.clear_round_bodies();
        self.state.screen = screen;
        self.state.game_over_reason = reason;
        self.input.disable_for(INPUT_REENABLE_MS);
    }

    /// Rebuild the round from scratch, keeping only the records
    fn reset_round(&mut self, mode: GameMode, screen: Screen) {
        self.clear_round_bodies();
        let records = self.state.score.records();
        self.state = GameState::new(screen, mode, self.ground, &self.config, records);
        self.rules = rules_for(mode);
        self.input.reset();
        self.clock_ms = 0.0;
        self.final_cats.clear();
    }

    /// Remove every cat body, then check nothing leaked
    fn clear_round_bodies(&mut self) {
        let removed = self.state.tower.clear(&mut self.world);
        // Contacts that mention removed bodies are stale now
        self.world.drain_contacts();
        if removed > 0 {
            log::debug!("Removed {} cat bodies", removed);
        }
        let count = self.world.body_count();
        if count != self.baseline_bodies {
            log::warn!(
                "World holds {} bodies after cleanup, expected {}",
                count,
                self.baseline_bodies
            );
        }
    }
}
