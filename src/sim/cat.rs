//! Cat entity: gameplay fields for one physics body
//!
//! The body itself belongs to the physics world. A `Cat` only remembers its
//! `BodyId`, so position and velocity are always read fresh from the engine.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::physics::{BodyDesc, BodyId, PhysicsWorld};
use super::state::GameMode;
use crate::config::GameConfig;
use crate::consts::*;

/// Cosmetic cat kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Orange,
    Tuxedo,
    Calico,
    Gray,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Orange,
        Variant::Tuxedo,
        Variant::Calico,
        Variant::Gray,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Orange => "orange",
            Variant::Tuxedo => "tuxedo",
            Variant::Calico => "calico",
            Variant::Gray => "gray",
        }
    }
}

/// Face shown on the cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expression {
    #[default]
    Neutral,
    Surprised,
    Happy,
    Worried,
}

/// What a cat is resting on (non-owning)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Ground,
    Cat(BodyId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cat {
    pub body: BodyId,
    pub variant: Variant,
    pub expression: Expression,
    /// Accumulated ms spent at or below `STABILITY_SPEED`
    pub stable_time_ms: f32,
    pub squish_factor: f32,
    pub squish_velocity: f32,
    /// Frozen in place (Reach the Top)
    pub is_sticky: bool,
    /// Game time when landing contact began
    pub settling_start_ms: Option<f64>,
    pub landed_on: Option<Surface>,
}

impl Cat {
    /// Wrap an existing body
    pub fn new(body: BodyId, variant: Variant) -> Self {
        Self {
            body,
            variant,
            expression: Expression::Surprised,
            stable_time_ms: 0.0,
            squish_factor: 1.0,
            squish_velocity: 0.0,
            is_sticky: false,
            settling_start_ms: None,
            landed_on: None,
        }
    }

    /// Create a body at rest at `pos` and wrap it
    ///
    /// Classic cats are static from the start; Reach-the-Top cats fall.
    pub fn spawn(
        world: &mut dyn PhysicsWorld,
        pos: Vec2,
        variant: Variant,
        mode: GameMode,
        config: &GameConfig,
    ) -> Self {
        let size = Vec2::new(config.cat_width, config.cat_height);
        let desc = match mode {
            GameMode::Classic => BodyDesc::fixed(pos, size),
            GameMode::ReachTheTop => BodyDesc::dynamic(pos, size),
        }
        .with_chamfer(config.cat_chamfer);

        let body = world.create_body(&desc);
        log::debug!("Spawned {} cat {:?} at ({:.0}, {:.0})", variant.as_str(), body, pos.x, pos.y);
        Self::new(body, variant)
    }

    /// Track how long the body has been still
    pub fn update_stability(&mut self, speed: f32, dt_ms: f32) {
        if speed <= STABILITY_SPEED {
            self.stable_time_ms += dt_ms;
        } else {
            self.stable_time_ms = 0.0;
        }
    }

    #[inline]
    pub fn is_stable(&self, required_ms: f32) -> bool {
        self.stable_time_ms >= required_ms
    }

    /// Set the face, except that a sticky cat is never worried
    pub fn set_expression(&mut self, expression: Expression) {
        if self.is_sticky && expression == Expression::Worried {
            return;
        }
        self.expression = expression;
    }

    /// Start a landing squish from an impact speed
    pub fn on_impact(&mut self, impact_speed: f32) {
        self.squish_factor = 1.0 - (impact_speed.abs() * SQUISH_PER_SPEED).min(SQUISH_MAX);
        self.squish_velocity = 0.0;
    }

    /// Critically damped spring back to 1.0
    pub fn update_squish(&mut self, dt_ms: f32) {
        if self.squish_factor == 1.0 && self.squish_velocity == 0.0 {
            return;
        }
        let dt = dt_ms / 1000.0;
        let damping = 2.0 * SQUISH_STIFFNESS.sqrt();
        let accel = SQUISH_STIFFNESS * (1.0 - self.squish_factor) - damping * self.squish_velocity;
        self.squish_velocity += accel * dt;
        self.squish_factor += self.squish_velocity * dt;

        if (1.0 - self.squish_factor).abs() < SQUISH_EPSILON
            && self.squish_velocity.abs() < SQUISH_EPSILON * 10.0
        {
            self.squish_factor = 1.0;
            self.squish_velocity = 0.0;
        }
    }

    /// Begin (or restart) the settling timer on `surface`
    pub fn start_settling(&mut self, surface: Surface, now_ms: f64) {
        if self.landed_on != Some(surface) || self.settling_start_ms.is_none() {
            self.landed_on = Some(surface);
            self.settling_start_ms = Some(now_ms);
        }
    }

    /// Contact was lost
    pub fn clear_settling(&mut self) {
        self.landed_on = None;
        self.settling_start_ms = None;
    }

    /// Ms since landing contact began (0 if not settling)
    pub fn settling_elapsed_ms(&self, now_ms: f64) -> f64 {
        self.settling_start_ms
            .map(|start| (now_ms - start).max(0.0))
            .unwrap_or(0.0)
    }

    /// Freeze the body in place
    pub fn make_sticky(&mut self, world: &mut dyn PhysicsWorld) {
        world.set_body_static(self.body, true);
        self.is_sticky = true;
        self.expression = Expression::Happy;
    }
}
