//! Reach the Top: sticky landings
//!
//! Cats fall under gravity. A cat that lands on the ground or another cat
//! starts a settling timer; once it is still, has been in contact long enough
//! and overlaps its support enough, it freezes in place. Cats that slide off
//! the playfield are lost but the round goes on.

use super::{Tower, TowerEvent, TowerRules};
use crate::config::GameConfig;
use crate::consts::*;
use crate::sim::cat::{Cat, Surface};
use crate::sim::geometry::calculate_overlap;
use crate::sim::physics::{Contact, PhysicsWorld};

/// All three sticky criteria, inclusive at each threshold
#[inline]
pub fn should_stick(speed: f32, settling_ms: f64, overlap: f32) -> bool {
    speed <= STABILITY_SPEED && settling_ms >= SETTLE_TIME_MS && overlap >= STICKY_OVERLAP
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReachTopRules;

impl TowerRules for ReachTopRules {
    fn required_stable_ms(&self) -> f32 {
        REACH_TOP_STABLE_MS
    }

    fn uses_win_line(&self) -> bool {
        true
    }

    fn on_drop(
        &self,
        tower: &mut Tower,
        _world: &mut dyn PhysicsWorld,
        cat: Cat,
        _config: &GameConfig,
    ) -> Vec<TowerEvent> {
        tower.push(cat);
        Vec::new()
    }

    fn on_contact(&self, tower: &mut Tower, world: &dyn PhysicsWorld, contact: &Contact, now_ms: f64) {
        let (a, b) = match *contact {
            Contact::Started { a, b, .. } | Contact::Ended { a, b } => (a, b),
        };

        for (id, other) in [(a, b), (b, a)] {
            let Some(surface) = tower.surface_for(other) else {
                continue;
            };
            let Some(cat) = tower.get(id) else {
                continue;
            };
            if cat.is_sticky {
                continue;
            }

            match *contact {
                Contact::Started { impact_speed, .. } => {
                    // Only something underneath counts as a landing
                    let below = match surface {
                        Surface::Ground => true,
                        Surface::Cat(other) => {
                            match (world.body_position(other), world.body_position(id)) {
                                (Some(o), Some(me)) => o.y > me.y,
                                _ => false,
                            }
                        }
                    };
                    if let Some(cat) = tower.get_mut(id) {
                        cat.on_impact(impact_speed);
                        if below {
                            cat.start_settling(surface, now_ms);
                        }
                    }
                }
                Contact::Ended { .. } => {
                    if let Some(cat) = tower.get_mut(id) {
                        if cat.landed_on == Some(surface) {
                            cat.clear_settling();
                        }
                    }
                }
            }
        }
    }

    fn update(
        &self,
        tower: &mut Tower,
        world: &mut dyn PhysicsWorld,
        dt_ms: f32,
        now_ms: f64,
        config: &GameConfig,
    ) -> Vec<TowerEvent> {
        tower.refresh(world, dt_ms);

        let mut events = Vec::new();
        let ids = tower.ids().to_vec();
        for id in ids {
            let Some(cat) = tower.get(id) else {
                continue;
            };
            if cat.is_sticky {
                continue;
            }
            let landed_on = cat.landed_on;
            let elapsed = cat.settling_elapsed_ms(now_ms);

            let Some(rect) = Tower::rect_of(world, id) else {
                continue;
            };
            if config.is_out_of_bounds(rect.center.x, rect.center.y) {
                log::debug!("Cat {:?} left the playfield", id);
                tower.remove(world, id);
                events.push(TowerEvent::Lost { cat: id });
                continue;
            }

            let Some(surface) = landed_on else {
                continue;
            };
            // Recomputed every check: the support may still be sliding
            let overlap = match surface {
                Surface::Ground => calculate_overlap(&rect, None),
                Surface::Cat(other) => match Tower::rect_of(world, other) {
                    Some(support) => calculate_overlap(&rect, Some(&support)),
                    None => {
                        // Support is gone; wait for the next landing
                        if let Some(cat) = tower.get_mut(id) {
                            cat.clear_settling();
                        }
                        continue;
                    }
                },
            };

            let speed = Tower::speed_of(world, id);
            if should_stick(speed, elapsed, overlap) {
                if let Some(cat) = tower.get_mut(id) {
                    cat.make_sticky(world);
                }
                tower.stacked_count += 1;
                log::debug!("Cat {:?} stuck (overlap {:.2})", id, overlap);
                events.push(TowerEvent::Stuck {
                    cat: id,
                    pos: rect.center,
                });
                events.extend(tower.update_difficulty());
            }
        }

        tower.update_expressions(world, self.required_stable_ms());
        events
    }
}
