//! Classic mode: push-down stacking
//!
//! Cats never fall. Each aligned drop lands on top of the previous cat and
//! the whole stack shifts down one cat height toward the ground.

use glam::Vec2;

use super::{Tower, TowerEvent, TowerRules};
use crate::config::GameConfig;
use crate::consts::*;
use crate::sim::cat::{Cat, Expression};
use crate::sim::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicRules;

impl ClassicRules {
    /// True if `x` is close enough to the previous cat (first cat always is)
    pub fn is_aligned(x: f32, previous_x: Option<f32>, cat_width: f32) -> bool {
        previous_x.is_none_or(|px| (x - px).abs() <= ALIGN_TOLERANCE * cat_width)
    }
}

impl TowerRules for ClassicRules {
    fn required_stable_ms(&self) -> f32 {
        CLASSIC_STABLE_MS
    }

    fn uses_win_line(&self) -> bool {
        false
    }

    fn on_drop(
        &self,
        tower: &mut Tower,
        world: &mut dyn PhysicsWorld,
        mut cat: Cat,
        config: &GameConfig,
    ) -> Vec<TowerEvent> {
        let Some(pos) = world.body_position(cat.body) else {
            log::warn!("Dropped cat {:?} has no body", cat.body);
            return Vec::new();
        };
        let previous_x = tower
            .last()
            .and_then(|prev| world.body_position(prev.body))
            .map(|p| p.x);

        if !Self::is_aligned(pos.x, previous_x, config.cat_width) {
            let previous_x = previous_x.unwrap_or(pos.x);
            log::info!(
                "Missed: cat at {:.0} vs {:.0} (tolerance {:.0})",
                pos.x,
                previous_x,
                ALIGN_TOLERANCE * config.cat_width
            );
            world.remove_body(cat.body);
            return vec![TowerEvent::Misaligned {
                x: pos.x,
                previous_x,
            }];
        }

        // The new cat pushes everything below it down one cat height
        let shift = Vec2::new(0.0, config.cat_height);
        for &id in tower.ids() {
            if let Some(p) = world.body_position(id) {
                world.set_body_position(id, p + shift);
            }
        }

        cat.set_expression(Expression::Happy);
        cat.on_impact(CLASSIC_LANDING_IMPACT);
        let body = cat.body;
        tower.push(cat);
        tower.stacked_count += 1;

        let mut events = vec![TowerEvent::Stacked {
            cat: body,
            pos,
            reference_x: previous_x,
        }];
        events.extend(tower.update_difficulty());

        let lowest_bottom = tower
            .ids()
            .iter()
            .filter_map(|&id| Tower::rect_of(world, id))
            .map(|r| r.bottom())
            .fold(f32::MIN, f32::max);
        if lowest_bottom >= config.ground_y() {
            log::info!("Tower reached the ground with {} cats", tower.len());
            events.push(TowerEvent::TowerFilled);
        }
        events
    }

    fn update(
        &self,
        tower: &mut Tower,
        world: &mut dyn PhysicsWorld,
        dt_ms: f32,
        _now_ms: f64,
        config: &GameConfig,
    ) -> Vec<TowerEvent> {
        tower.refresh(world, dt_ms);

        let mut events = Vec::new();
        for &id in tower.ids() {
            let gone = match world.body_position(id) {
                Some(p) => config.is_out_of_bounds(p.x, p.y),
                None => true,
            };
            if gone {
                events.push(TowerEvent::Fell { cat: id });
            }
        }
        if !events.is_empty() {
            tower.has_fallen_cat = true;
        }

        tower.update_expressions(world, self.required_stable_ms());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cat::Variant;
    use crate::sim::physics::{BodyDesc, BodyId};
    use crate::sim::rapier_world::RapierWorld;
    use crate::sim::state::GameMode;

    struct Fixture {
        world: RapierWorld,
        tower: Tower,
        config: GameConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GameConfig::default();
            let mut world = RapierWorld::new();
            let ground = world.create_body(&BodyDesc::fixed(
                Vec2::new(config.center_x(), config.height - config.ground_height / 2.0),
                Vec2::new(config.width, config.ground_height),
            ));
            Self {
                world,
                tower: Tower::new(ground),
                config,
            }
        }

        fn drop_at(&mut self, x: f32) -> Vec<TowerEvent> {
            let cat = Cat::spawn(
                &mut self.world,
                Vec2::new(x, self.config.pendulum_y),
                Variant::Tuxedo,
                GameMode::Classic,
                &self.config,
            );
            ClassicRules.on_drop(&mut self.tower, &mut self.world, cat, &self.config)
        }
    }

    #[test]
    fn test_alignment_tolerance_is_inclusive() {
        assert!(ClassicRules::is_aligned(500.0, None, 80.0));
        assert!(ClassicRules::is_aligned(424.0, Some(360.0), 80.0));
        assert!(!ClassicRules::is_aligned(424.5, Some(360.0), 80.0));
    }

    #[test]
    fn test_first_drop_always_stacks() {
        let mut f = Fixture::new();
        let events = f.drop_at(610.0);
        assert!(matches!(
            events[0],
            TowerEvent::Stacked {
                reference_x: None,
                ..
            }
        ));
        assert_eq!(f.tower.stacked_count, 1);
        assert_eq!(f.tower.last().unwrap().expression, Expression::Happy);
        assert!(f.world.body_is_static(f.tower.ids()[0]));
    }

    #[test]
    fn test_aligned_drop_pushes_stack_down() {
        let mut f = Fixture::new();
        f.drop_at(360.0);
        let first = f.tower.ids()[0];
        let events = f.drop_at(400.0);

        assert!(matches!(
            events[0],
            TowerEvent::Stacked {
                reference_x: Some(x),
                ..
            } if x == 360.0
        ));
        let first_y = f.world.body_position(first).unwrap().y;
        assert_eq!(first_y, f.config.pendulum_y + f.config.cat_height);
        assert_eq!(f.tower.stacked_count, 2);
        assert!(f.tower.stacked_count as usize <= f.tower.len());
    }

    #[test]
    fn test_misaligned_drop_removes_cat() {
        let mut f = Fixture::new();
        f.drop_at(360.0);
        let bodies = f.world.body_count();
        let events = f.drop_at(460.0);

        assert_eq!(
            events,
            vec![TowerEvent::Misaligned {
                x: 460.0,
                previous_x: 360.0
            }]
        );
        assert!(events[0].is_terminal());
        assert_eq!(f.world.body_count(), bodies);
        assert_eq!(f.tower.len(), 1);
        assert_eq!(f.tower.stacked_count, 1);
    }

    #[test]
    fn test_tower_fills_to_ground() {
        let mut f = Fixture::new();
        let mut filled_at = None;
        for i in 1..=30 {
            let events = f.drop_at(360.0);
            if events.contains(&TowerEvent::TowerFilled) {
                filled_at = Some(i);
                break;
            }
        }
        // (1040 - 135) / 70 -> the 14th cat's push puts the bottom cat on the ground
        let filled_at = filled_at.expect("tower should fill");
        let expected = ((f.config.ground_y() - (f.config.pendulum_y + f.config.cat_height / 2.0))
            / f.config.cat_height)
            .ceil() as usize
            + 1;
        assert_eq!(filled_at, expected);
    }

    #[test]
    fn test_difficulty_rises_with_stack() {
        let mut f = Fixture::new();
        let mut levels = Vec::new();
        for _ in 0..6 {
            for e in f.drop_at(360.0) {
                if let TowerEvent::DifficultyUp { level } = e {
                    levels.push(level);
                }
            }
        }
        assert_eq!(levels, vec![1, 2]);
        assert_eq!(f.tower.difficulty_level, 2);
    }

    #[test]
    fn test_cat_leaving_playfield_is_fatal() {
        let mut f = Fixture::new();
        f.drop_at(360.0);
        let id: BodyId = f.tower.ids()[0];
        f.world.set_body_position(id, Vec2::new(360.0, 5000.0));

        let events = ClassicRules.update(&mut f.tower, &mut f.world, 16.0, 16.0, &f.config);
        assert_eq!(events, vec![TowerEvent::Fell { cat: id }]);
        assert!(f.tower.has_fallen_cat);
    }

    #[test]
    fn test_static_cats_are_happy_and_calm() {
        let mut f = Fixture::new();
        f.drop_at(360.0);
        f.drop_at(380.0);
        let events = ClassicRules.update(&mut f.tower, &mut f.world, 16.0, 16.0, &f.config);
        assert!(events.is_empty());
        assert!(!f.tower.is_wobbling);
        assert!(f.tower.cats().all(|c| c.expression == Expression::Happy));
    }
}
