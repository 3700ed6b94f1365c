//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game time only (sum of clamped frame deltas), never the wall clock
//! - Seeded RNG only
//! - Stable iteration order (drop order for cats, body ID for the world)
//! - No rendering or platform dependencies
//!
//! Physics is reached through the `PhysicsWorld` trait; `RapierWorld` is the
//! rapier2d-backed implementation used by the game.

pub mod cat;
pub mod geometry;
pub mod pendulum;
pub mod physics;
pub mod rapier_world;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod tower;

pub use cat::{Cat, Expression, Surface, Variant};
pub use geometry::{Rect, calculate_overlap};
pub use pendulum::Pendulum;
pub use physics::{BodyDesc, BodyId, Contact, PhysicsWorld};
pub use rapier_world::RapierWorld;
pub use scoring::{LandingScore, ScoreState, score_landing};
pub use session::GameSession;
pub use snapshot::{CatView, Snapshot};
pub use state::{CatStats, GameMode, GameOverReason, GameState, InputGate, ReenableToken, Screen};
pub use tick::TickInput;
pub use tower::{ClassicRules, ReachTopRules, Tower, TowerEvent, TowerRules, rules_for};
