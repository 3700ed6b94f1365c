//! Read-only view of a session for renderers
//!
//! Built fresh every frame; holds copies, never references into the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cat::{Expression, Variant};
use super::physics::PhysicsWorld;
use super::session::GameSession;
use super::state::{GameMode, GameOverReason, Screen};
use crate::persistence::Storage;

/// One cat as it should be drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatView {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Radians
    pub angle: f32,
    pub variant: Variant,
    pub expression: Expression,
    /// Vertical scale (1 = rest)
    pub squish: f32,
    pub sticky: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub screen: Screen,
    pub mode: GameMode,
    pub cats: Vec<CatView>,
    pub pendulum: Vec2,
    pub score: u32,
    pub high_score: u32,
    pub reach_top_best: Option<u32>,
    pub beat_high_score: bool,
    pub cats_dropped: u32,
    pub cats_lost: u32,
    pub is_wobbling: bool,
    /// "Perfect" marker position while it is showing
    pub perfect: Option<Vec2>,
    /// Reach the Top goal line
    pub win_line_y: Option<f32>,
    pub game_over_reason: Option<GameOverReason>,
    pub input_enabled: bool,
}

impl<W: PhysicsWorld, S: Storage> GameSession<W, S> {
    /// Live cats, in drop order
    pub(super) fn cat_views(&self) -> Vec<CatView> {
        self.state
            .tower
            .cats()
            .filter_map(|cat| {
                Some(CatView {
                    id: cat.body.0,
                    pos: self.world.body_position(cat.body)?,
                    size: self.world.body_size(cat.body)?,
                    angle: self.world.body_angle(cat.body).unwrap_or(0.0),
                    variant: cat.variant,
                    expression: cat.expression,
                    squish: cat.squish_factor,
                    sticky: cat.is_sticky,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let cats = if state.screen == Screen::Playing {
            self.cat_views()
        } else {
            self.final_cats.clone()
        };

        Snapshot {
            screen: state.screen,
            mode: state.mode,
            cats,
            pendulum: state.pendulum.position(),
            score: state.score.score,
            high_score: state.score.high_score,
            reach_top_best: state.score.reach_top_best,
            beat_high_score: state.beat_high_score,
            cats_dropped: state.cats_dropped,
            cats_lost: state.cats_lost,
            is_wobbling: state.tower.is_wobbling,
            perfect: state
                .score
                .showing_perfect
                .then(|| Vec2::new(state.score.perfect_x, state.score.perfect_y)),
            win_line_y: (state.mode == GameMode::ReachTheTop).then_some(self.config.win_line_y),
            game_over_reason: state.game_over_reason,
            input_enabled: self.input.is_enabled(),
        }
    }

    /// Snapshot as JSON for JavaScript hosts
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|e| {
            log::warn!("Snapshot encode failed: {}", e);
            String::from("{}")
        })
    }
}
