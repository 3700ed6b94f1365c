//! `PhysicsWorld` backed by rapier2d
//!
//! Cats are rounded-rectangle colliders (`round_cuboid` with the config's
//! chamfer) on bodies that may rotate, so a cat hanging past an edge really
//! tips over. The world works in pixels (y down) and tells rapier so through
//! `length_unit`; velocities are converted to px per 60 Hz frame at the
//! boundary.
//!
//! Collision start/stop events come from a `ChannelEventCollector` and are
//! translated to `Contact` values after each step.

use std::collections::{BTreeMap, HashMap};

use std::sync::mpsc::Receiver;
use glam::Vec2;
use rapier2d::prelude::*;

use super::physics::{BodyDesc, BodyId, Contact, PhysicsWorld};
use crate::consts::REFERENCE_FRAME_MS;

/// Gravity in px/s² (0.3 px per frame² at 60 Hz)
pub const GRAVITY_PX_PER_S2: f32 = 1080.0;
/// Pixels per rapier length unit, for solver tolerances
const PIXELS_PER_UNIT: f32 = 100.0;
/// Frames per second the px/frame velocity unit refers to
const FRAMES_PER_SECOND: f32 = 1000.0 / REFERENCE_FRAME_MS;

/// Rapier handles behind one `BodyId`
#[derive(Debug, Clone, Copy)]
struct Handles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    size: Vec2,
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    events: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    // Force events are never enabled; the receiver only keeps the channel open
    _force_recv: Receiver<ContactForceEvent>,

    handles: BTreeMap<BodyId, Handles>,
    by_collider: HashMap<ColliderHandle, BodyId>,
    next_id: u32,
    contacts: Vec<Contact>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    pub fn new() -> Self {
        let (collision_send, collision_recv) = std::sync::mpsc::channel();
        let (force_send, force_recv) = std::sync::mpsc::channel();

        let mut params = IntegrationParameters::default();
        params.length_unit = PIXELS_PER_UNIT;

        Self {
            gravity: vector![0.0, GRAVITY_PX_PER_S2],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_send, force_send),
            collision_recv,
            _force_recv: force_recv,
            handles: BTreeMap::new(),
            by_collider: HashMap::new(),
            next_id: 1,
            contacts: Vec::new(),
        }
    }

    fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.handles.get(&id).and_then(|h| self.rigid_bodies.get(h.body))
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = self.handles.get(&id)?.body;
        self.rigid_bodies.get_mut(handle)
    }

    /// Turn this step's collision events into contacts
    fn collect_contacts(&mut self, before: &HashMap<BodyId, Vec2>) {
        while let Ok(event) = self.collision_recv.try_recv() {
            let (Some(&a), Some(&b)) = (
                self.by_collider.get(&event.collider1()),
                self.by_collider.get(&event.collider2()),
            ) else {
                // One side was removed since the pair formed
                continue;
            };

            if event.started() {
                let va = before.get(&a).copied().unwrap_or(Vec2::ZERO);
                let vb = before.get(&b).copied().unwrap_or(Vec2::ZERO);
                self.contacts.push(Contact::Started {
                    a,
                    b,
                    impact_speed: (va - vb).length(),
                });
            } else {
                self.contacts.push(Contact::Ended { a, b });
            }
        }
    }
}

impl PhysicsWorld for RapierWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic().ccd_enabled(true)
        };
        let body = self
            .rigid_bodies
            .insert(builder.translation(vector![desc.pos.x, desc.pos.y]).build());

        let half = desc.size / 2.0;
        // The rounding radius is added on top of the inner box
        let radius = desc.chamfer.clamp(0.0, half.x.min(half.y) * 0.5);
        let shape = if radius > 0.0 {
            ColliderBuilder::round_cuboid(half.x - radius, half.y - radius, radius)
        } else {
            ColliderBuilder::cuboid(half.x, half.y)
        };
        let collider = self.colliders.insert_with_parent(
            shape
                .friction(desc.friction)
                .restitution(desc.restitution)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            body,
            &mut self.rigid_bodies,
        );

        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.handles.insert(
            id,
            Handles {
                body,
                collider,
                size: desc.size,
            },
        );
        self.by_collider.insert(collider, id);
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(handles) = self.handles.remove(&id) else {
            return false;
        };
        self.by_collider.remove(&handles.collider);
        self.rigid_bodies
            .remove(
                handles.body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn step(&mut self, dt_ms: f32) {
        if !(dt_ms > 0.0) {
            return;
        }
        self.params.dt = dt_ms / 1000.0;

        // Closing speeds are measured before the solver resolves the impact
        let before: HashMap<BodyId, Vec2> = self
            .handles
            .keys()
            .filter_map(|&id| Some((id, self.body_velocity(id)?)))
            .collect();

        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &self.events,
        );

        self.collect_contacts(&before);
    }

    fn body_position(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| {
            let t = b.translation();
            Vec2::new(t.x, t.y)
        })
    }

    fn body_velocity(&self, id: BodyId) -> Option<Vec2> {
        self.body(id).map(|b| {
            let v = b.linvel();
            Vec2::new(v.x, v.y) / FRAMES_PER_SECOND
        })
    }

    fn body_size(&self, id: BodyId) -> Option<Vec2> {
        self.handles.get(&id).map(|h| h.size)
    }

    fn body_angle(&self, id: BodyId) -> Option<f32> {
        self.body(id).map(|b| b.rotation().angle())
    }

    fn body_is_static(&self, id: BodyId) -> bool {
        self.body(id).is_some_and(|b| b.is_fixed())
    }

    fn set_body_static(&mut self, id: BodyId, is_static: bool) {
        if let Some(body) = self.body_mut(id) {
            if is_static {
                body.set_linvel(vector![0.0, 0.0], false);
                body.set_angvel(0.0, false);
                body.set_body_type(RigidBodyType::Fixed, true);
            } else {
                body.set_body_type(RigidBodyType::Dynamic, true);
            }
        }
    }

    fn set_body_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.body_mut(id) {
            body.set_translation(vector![pos.x, pos.y], true);
        }
    }

    fn body_count(&self) -> usize {
        self.rigid_bodies.len()
    }

    fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.contacts)
    }
}
