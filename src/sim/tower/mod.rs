//! Tower manager
//!
//! `Tower` owns the dropped cats (in drop order) and the tower-wide flags.
//! How the tower reacts to drops, contacts and ticks depends on the game
//! mode and lives in a `TowerRules` strategy picked once per round:
//! - `ClassicRules`: static cats, push-down stacking, misalignment ends the round
//! - `ReachTopRules`: falling cats that stick after landing well

pub mod classic;
pub mod reach_top;

use std::collections::HashMap;

use glam::Vec2;

use super::cat::{Cat, Expression, Surface};
use super::geometry::Rect;
use super::physics::{BodyId, Contact, PhysicsWorld};
use super::state::GameMode;
use crate::config::GameConfig;
use crate::consts::*;
use crate::difficulty_for;

pub use classic::ClassicRules;
pub use reach_top::{ReachTopRules, should_stick};

/// Something the tower did that the rest of the game cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TowerEvent {
    /// Classic: a cat was stacked on `reference_x` (None for the first cat)
    Stacked {
        cat: BodyId,
        pos: Vec2,
        reference_x: Option<f32>,
    },
    /// Reach the Top: a cat froze in place
    Stuck { cat: BodyId, pos: Vec2 },
    /// Reach the Top: a cat left the playfield and was removed
    Lost { cat: BodyId },
    /// Classic: a cat left the playfield (terminal)
    Fell { cat: BodyId },
    /// Classic: the dropped cat missed the one below (terminal)
    Misaligned { x: f32, previous_x: f32 },
    /// Classic: the tower reached the ground line (terminal)
    TowerFilled,
    /// The stacked count crossed a difficulty threshold
    DifficultyUp { level: u32 },
}

impl TowerEvent {
    /// Ends the round in a gameover
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TowerEvent::Fell { .. } | TowerEvent::Misaligned { .. } | TowerEvent::TowerFilled
        )
    }
}

/// Mode-specific tower behavior
pub trait TowerRules {
    /// Stillness required before a cat counts as stable (ms)
    fn required_stable_ms(&self) -> f32;

    /// Whether the round can be won by crossing the win line
    fn uses_win_line(&self) -> bool;

    /// A freshly spawned cat was dropped
    fn on_drop(
        &self,
        tower: &mut Tower,
        world: &mut dyn PhysicsWorld,
        cat: Cat,
        config: &GameConfig,
    ) -> Vec<TowerEvent>;

    /// A contact transition reported by the physics world
    fn on_contact(&self, _tower: &mut Tower, _world: &dyn PhysicsWorld, _contact: &Contact, _now_ms: f64) {}

    /// Per-tick update, after the physics step
    fn update(
        &self,
        tower: &mut Tower,
        world: &mut dyn PhysicsWorld,
        dt_ms: f32,
        now_ms: f64,
        config: &GameConfig,
    ) -> Vec<TowerEvent>;
}

/// Strategy for a mode
pub fn rules_for(mode: GameMode) -> Box<dyn TowerRules> {
    match mode {
        GameMode::Classic => Box::new(ClassicRules),
        GameMode::ReachTheTop => Box::new(ReachTopRules),
    }
}

/// Dropped cats plus tower-wide state
#[derive(Debug, Clone)]
pub struct Tower {
    /// Drop order
    order: Vec<BodyId>,
    /// Gameplay fields keyed by body
    cats: HashMap<BodyId, Cat>,
    /// The ground body, so contacts with it can be recognized
    ground: BodyId,
    pub stacked_count: u32,
    pub difficulty_level: u32,
    pub is_wobbling: bool,
    pub has_fallen_cat: bool,
}

impl Tower {
    pub fn new(ground: BodyId) -> Self {
        Self {
            order: Vec::new(),
            cats: HashMap::new(),
            ground,
            stacked_count: 0,
            difficulty_level: 0,
            is_wobbling: false,
            has_fallen_cat: false,
        }
    }

    #[inline]
    pub fn ground(&self) -> BodyId {
        self.ground
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Body ids in drop order
    pub fn ids(&self) -> &[BodyId] {
        &self.order
    }

    /// Cats in drop order
    pub fn cats(&self) -> impl Iterator<Item = &Cat> {
        self.order.iter().filter_map(|id| self.cats.get(id))
    }

    pub fn get(&self, id: BodyId) -> Option<&Cat> {
        self.cats.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Cat> {
        self.cats.get_mut(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.cats.contains_key(&id)
    }

    /// Most recently dropped cat
    pub fn last(&self) -> Option<&Cat> {
        self.order.last().and_then(|id| self.cats.get(id))
    }

    pub fn push(&mut self, cat: Cat) {
        self.order.push(cat.body);
        self.cats.insert(cat.body, cat);
    }

    /// Remove a cat and its body
    pub fn remove(&mut self, world: &mut dyn PhysicsWorld, id: BodyId) -> Option<Cat> {
        let cat = self.cats.remove(&id)?;
        self.order.retain(|&b| b != id);
        world.remove_body(id);
        Some(cat)
    }

    /// Remove every cat and its body. Returns how many were removed.
    pub fn clear(&mut self, world: &mut dyn PhysicsWorld) -> usize {
        let removed = self.order.len();
        for id in self.order.drain(..) {
            world.remove_body(id);
        }
        self.cats.clear();
        self.stacked_count = 0;
        self.difficulty_level = 0;
        self.is_wobbling = false;
        self.has_fallen_cat = false;
        removed
    }

    /// Current rectangle of any body (None once it is gone)
    pub fn rect_of(world: &dyn PhysicsWorld, id: BodyId) -> Option<Rect> {
        Some(Rect::new(world.body_position(id)?, world.body_size(id)?))
    }

    /// Speed of a body, 0 if it is gone
    pub fn speed_of(world: &dyn PhysicsWorld, id: BodyId) -> f32 {
        world.body_velocity(id).map(|v| v.length()).unwrap_or(0.0)
    }

    /// How a body would be referenced as a landing surface
    pub fn surface_for(&self, body: BodyId) -> Option<Surface> {
        if body == self.ground {
            Some(Surface::Ground)
        } else if self.cats.contains_key(&body) {
            Some(Surface::Cat(body))
        } else {
            None
        }
    }

    /// Stability timers and squish springs for every cat
    pub fn refresh(&mut self, world: &dyn PhysicsWorld, dt_ms: f32) {
        for id in &self.order {
            if let Some(cat) = self.cats.get_mut(id) {
                cat.update_stability(Self::speed_of(world, *id), dt_ms);
                cat.update_squish(dt_ms);
            }
        }
    }

    /// Faces from motion, and the tower-wide wobble flag
    ///
    /// Only cats that have touched something can make the tower wobble.
    pub fn update_expressions(&mut self, world: &dyn PhysicsWorld, required_stable_ms: f32) {
        let mut wobbling = false;
        for id in &self.order {
            let Some(cat) = self.cats.get_mut(id) else {
                continue;
            };
            if cat.is_sticky {
                continue;
            }
            let speed = Self::speed_of(world, *id);
            if speed >= WOBBLE_SPEED && cat.landed_on.is_some() {
                wobbling = true;
            }
            let expression = if cat.is_stable(required_stable_ms) {
                Expression::Happy
            } else if speed >= WOBBLE_SPEED {
                Expression::Worried
            } else {
                Expression::Neutral
            };
            cat.set_expression(expression);
        }
        self.is_wobbling = wobbling;
    }

    /// Bump the difficulty if `stacked_count` crossed a threshold
    pub fn update_difficulty(&mut self) -> Option<TowerEvent> {
        let level = difficulty_for(self.stacked_count);
        if level > self.difficulty_level {
            self.difficulty_level = level;
            Some(TowerEvent::DifficultyUp { level })
        } else {
            None
        }
    }

    /// True if a frozen cat's top edge is at or above the win line
    pub fn check_win_condition(&self, world: &dyn PhysicsWorld, win_line_y: f32) -> bool {
        self.cats().any(|cat| {
            (cat.is_sticky || world.body_is_static(cat.body))
                && Self::rect_of(world, cat.body).is_some_and(|r| r.top() <= win_line_y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cat::Variant;
    use crate::sim::physics::BodyDesc;
    use crate::sim::rapier_world::RapierWorld;

    fn world_with_ground() -> (RapierWorld, BodyId) {
        let mut world = RapierWorld::new();
        let ground = world.create_body(&BodyDesc::fixed(
            Vec2::new(360.0, 1060.0),
            Vec2::new(720.0, 40.0),
        ));
        (world, ground)
    }

    fn add_cat(tower: &mut Tower, world: &mut RapierWorld, pos: Vec2, is_static: bool) -> BodyId {
        let size = Vec2::new(80.0, 70.0);
        let desc = if is_static {
            BodyDesc::fixed(pos, size)
        } else {
            BodyDesc::dynamic(pos, size)
        };
        let id = world.create_body(&desc);
        tower.push(Cat::new(id, Variant::Orange));
        id
    }

    #[test]
    fn test_win_condition_empty_tower() {
        let (world, ground) = world_with_ground();
        let tower = Tower::new(ground);
        assert!(!tower.check_win_condition(&world, 260.0));
    }

    #[test]
    fn test_win_condition_ignores_falling_cats() {
        let (mut world, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        // Way above the line but still dynamic
        add_cat(&mut tower, &mut world, Vec2::new(360.0, 50.0), false);
        add_cat(&mut tower, &mut world, Vec2::new(200.0, 100.0), false);
        assert!(!tower.check_win_condition(&world, 260.0));
    }

    #[test]
    fn test_win_condition_sticky_at_line() {
        let (mut world, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        // Top edge exactly on the line
        let id = add_cat(&mut tower, &mut world, Vec2::new(360.0, 295.0), false);
        tower.get_mut(id).unwrap().make_sticky(&mut world);
        assert!(tower.check_win_condition(&world, 260.0));
        assert!(!tower.check_win_condition(&world, 259.0));
    }

    #[test]
    fn test_clear_removes_all_bodies() {
        let (mut world, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        for i in 0..5 {
            add_cat(&mut tower, &mut world, Vec2::new(100.0 + i as f32 * 90.0, 500.0), false);
        }
        tower.stacked_count = 3;
        assert_eq!(world.body_count(), 6);

        assert_eq!(tower.clear(&mut world), 5);
        assert_eq!(world.body_count(), 1);
        assert!(tower.is_empty());
        assert_eq!(tower.stacked_count, 0);
    }

    #[test]
    fn test_remove_keeps_order() {
        let (mut world, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        let a = add_cat(&mut tower, &mut world, Vec2::new(100.0, 500.0), true);
        let b = add_cat(&mut tower, &mut world, Vec2::new(200.0, 500.0), true);
        let c = add_cat(&mut tower, &mut world, Vec2::new(300.0, 500.0), true);

        assert!(tower.remove(&mut world, b).is_some());
        assert_eq!(tower.ids(), &[a, c]);
        assert!(tower.remove(&mut world, b).is_none());
        assert_eq!(tower.last().map(|c| c.body), Some(c));
    }

    #[test]
    fn test_surface_lookup() {
        let (mut world, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        let a = add_cat(&mut tower, &mut world, Vec2::new(100.0, 500.0), true);
        assert_eq!(tower.surface_for(ground), Some(Surface::Ground));
        assert_eq!(tower.surface_for(a), Some(Surface::Cat(a)));
        assert_eq!(tower.surface_for(BodyId(999)), None);
    }

    #[test]
    fn test_difficulty_steps() {
        let (_, ground) = world_with_ground();
        let mut tower = Tower::new(ground);
        tower.stacked_count = 2;
        assert_eq!(tower.update_difficulty(), None);
        tower.stacked_count = 3;
        assert_eq!(tower.update_difficulty(), Some(TowerEvent::DifficultyUp { level: 1 }));
        assert_eq!(tower.update_difficulty(), None);
    }
}
