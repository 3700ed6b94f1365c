//! Scoring
//!
//! Classic: points per stacked cat plus a bonus for perfect landings, with a
//! high score that only ever goes up.
//! Reach the Top: fewer cats is better; the best only improves on a strictly
//! lower count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::highscores::HighScores;

/// Points for one landing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingScore {
    pub points: u32,
    pub perfect: bool,
    /// Horizontal distance from the reference (px)
    pub offset: f32,
}

/// Score a landing at `cat_x`
///
/// The reference is the cat below, or the play-area center for the first cat.
pub fn score_landing(cat_x: f32, reference_x: Option<f32>, center_x: f32, cat_width: f32) -> LandingScore {
    let offset = (cat_x - reference_x.unwrap_or(center_x)).abs();
    let perfect = offset <= PERFECT_TOLERANCE * cat_width;
    LandingScore {
        points: BASE_POINTS + if perfect { PERFECT_BONUS } else { 0 },
        perfect,
        offset,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u32,
    pub high_score: u32,
    pub reach_top_best: Option<u32>,
    pub showing_perfect: bool,
    /// Remaining display time of the "Perfect" marker (ms)
    pub perfect_display_ms: f32,
    pub perfect_x: f32,
    pub perfect_y: f32,
}

impl ScoreState {
    /// Fresh round score carrying the persisted records
    pub fn new(records: HighScores) -> Self {
        Self {
            high_score: records.high_score,
            reach_top_best: records.reach_top_best,
            ..Self::default()
        }
    }

    /// Records as they should be persisted
    pub fn records(&self) -> HighScores {
        HighScores {
            high_score: self.high_score,
            reach_top_best: self.reach_top_best,
        }
    }

    /// Add a Classic landing. Returns the landing and whether the high score moved.
    pub fn award_landing(
        &mut self,
        cat_pos: Vec2,
        reference_x: Option<f32>,
        center_x: f32,
        cat_width: f32,
    ) -> (LandingScore, bool) {
        let landing = score_landing(cat_pos.x, reference_x, center_x, cat_width);
        self.score += landing.points;

        if landing.perfect {
            self.showing_perfect = true;
            self.perfect_display_ms = PERFECT_DISPLAY_MS;
            self.perfect_x = cat_pos.x;
            self.perfect_y = cat_pos.y;
        }

        let new_high = self.score > self.high_score;
        if new_high {
            self.high_score = self.score;
        }
        (landing, new_high)
    }

    /// Reach-the-Top win with `cats_used`. Returns true if it is a new best.
    pub fn record_reach_top_win(&mut self, cats_used: u32) -> bool {
        let improved = match self.reach_top_best {
            Some(best) => cats_used < best,
            None => true,
        };
        if improved {
            self.reach_top_best = Some(cats_used);
        }
        improved
    }

    /// Fade the perfect marker
    pub fn update(&mut self, dt_ms: f32) {
        if self.showing_perfect {
            self.perfect_display_ms -= dt_ms;
            if self.perfect_display_ms <= 0.0 {
                self.showing_perfect = false;
                self.perfect_display_ms = 0.0;
            }
        }
    }
}
