//! Physics engine contract
//!
//! The simulation never integrates bodies itself. It talks to whatever
//! rigid-body engine the host provides through `PhysicsWorld`, and refers to
//! bodies only by `BodyId`. Engine objects stay opaque.
//!
//! Units: positions in px (y grows downward), velocities in px per 60 Hz frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable body handle issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Everything needed to create a rectangular body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Center position
    pub pos: Vec2,
    /// Full width/height
    pub size: Vec2,
    /// Rounded-corner radius (engines that ignore it treat the body as a plain box)
    pub chamfer: f32,
    pub is_static: bool,
    /// 0 = ice, 1 = glue
    pub friction: f32,
    pub restitution: f32,
}

impl BodyDesc {
    /// A dynamic body at rest
    pub fn dynamic(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            chamfer: 0.0,
            is_static: false,
            friction: 0.8,
            restitution: 0.0,
        }
    }

    /// An immovable body
    pub fn fixed(pos: Vec2, size: Vec2) -> Self {
        Self {
            is_static: true,
            ..Self::dynamic(pos, size)
        }
    }

    pub fn with_chamfer(mut self, chamfer: f32) -> Self {
        self.chamfer = chamfer;
        self
    }
}

/// Contact transition between two bodies, reported once per transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Bodies started touching. `impact_speed` is their closing speed.
    Started {
        a: BodyId,
        b: BodyId,
        impact_speed: f32,
    },
    /// Bodies stopped touching
    Ended { a: BodyId, b: BodyId },
}

impl Contact {
    /// The other body of the pair, if `id` takes part in it
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        let (a, b) = match *self {
            Contact::Started { a, b, .. } | Contact::Ended { a, b } => (a, b),
        };
        if a == id {
            Some(b)
        } else if b == id {
            Some(a)
        } else {
            None
        }
    }
}

/// What the simulation needs from a physics engine
///
/// Queries on a removed or unknown body return `None`/`false`; they never panic.
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId;
    /// Returns false if the body did not exist
    fn remove_body(&mut self, id: BodyId) -> bool;
    fn step(&mut self, dt_ms: f32);

    fn body_position(&self, id: BodyId) -> Option<Vec2>;
    fn body_velocity(&self, id: BodyId) -> Option<Vec2>;
    fn body_size(&self, id: BodyId) -> Option<Vec2>;
    /// Rotation in radians, clockwise on screen
    fn body_angle(&self, id: BodyId) -> Option<f32>;
    fn body_is_static(&self, id: BodyId) -> bool;

    fn set_body_static(&mut self, id: BodyId, is_static: bool);
    /// Teleport a body (velocity is kept)
    fn set_body_position(&mut self, id: BodyId, pos: Vec2);

    /// Number of bodies currently in the world
    fn body_count(&self) -> usize;
    /// Contact transitions since the last call, in the order they happened
    fn drain_contacts(&mut self) -> Vec<Contact>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_other() {
        let c = Contact::Started {
            a: BodyId(1),
            b: BodyId(2),
            impact_speed: 3.0,
        };
        assert_eq!(c.other(BodyId(1)), Some(BodyId(2)));
        assert_eq!(c.other(BodyId(2)), Some(BodyId(1)));
        assert_eq!(c.other(BodyId(3)), None);
    }
}
