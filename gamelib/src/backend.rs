//! Rigid-body backend over rapier, addressed by actor identity.
//!
//! The backend holds one box body per actor that opted into it. Actors keep
//! their own position and velocity; the rigid-body capability copies them in
//! before the step and back out afterwards.

use std::collections::HashMap;

// Rapier stays private to this module.
use rapier2d::prelude::*;

use crate::actor::{ActorId, ActorKind};
use crate::config::SimulationConfig;
use crate::error::{GameError, Result};
use crate::math::Vec2;

/// Body types the backend simulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

impl TryFrom<ActorKind> for BodyKind {
    type Error = GameError;

    fn try_from(kind: ActorKind) -> Result<Self> {
        match kind {
            ActorKind::Static => Ok(BodyKind::Static),
            ActorKind::Dynamic => Ok(BodyKind::Dynamic),
            other => Err(GameError::UnsupportedBodyType(other)),
        }
    }
}

/// Opaque body handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Body creation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub half_size: Vec2,
    pub density: f32,
    pub friction: f32,
}

/// A contact between two backend bodies starting or stopping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub a: ActorId,
    pub b: ActorId,
    pub started: bool,
}

pub struct PhysicsBackend {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    event_recv_collision: crossbeam_channel::Receiver<CollisionEvent>,
    _event_recv_contact_force: crossbeam_channel::Receiver<ContactForceEvent>,
    event_handler: ChannelEventCollector,

    actor_to_body: HashMap<ActorId, RigidBodyHandle>,
    body_to_actor: HashMap<RigidBodyHandle, ActorId>,

    gravity: Vec2,
    pending_contacts: Vec<Contact>,
}

impl Default for PhysicsBackend {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, 9.81))
    }
}

impl std::fmt::Debug for PhysicsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsBackend")
            .field("bodies", &self.actor_to_body.len())
            .field("gravity", &self.gravity)
            .finish()
    }
}

impl PhysicsBackend {
    pub fn new(gravity: Vec2) -> Self {
        let (send_col, recv_col) = crossbeam_channel::unbounded();
        let (send_force, recv_force) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector::new(send_col, send_force);

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            event_recv_collision: recv_col,
            _event_recv_contact_force: recv_force,
            event_handler,

            actor_to_body: HashMap::new(),
            body_to_actor: HashMap::new(),

            gravity,
            pending_contacts: Vec::new(),
        }
    }

    /// Gravity and solver iteration counts taken from `config`.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let [gx, gy] = config.gravity;
        let mut backend = Self::new(Vec2::new(gx, gy));
        backend.set_solver_iterations(config.velocity_iterations, config.position_iterations);
        backend
    }

    pub fn set_solver_iterations(&mut self, velocity: usize, position: usize) {
        self.integration_parameters.max_velocity_iterations = velocity.max(1);
        self.integration_parameters.max_stabilization_iterations = position.max(1);
    }

    /// Drops every body, keeping gravity and solver settings.
    pub fn clear(&mut self) {
        let gravity = self.gravity;
        let params = self.integration_parameters.clone();
        *self = Self::new(gravity);
        self.integration_parameters = params;
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Creates a box body for `actor`, replacing any body it already had.
    pub fn create_body(&mut self, actor: ActorId, desc: BodyDesc) -> Result<BodyHandle> {
        self.remove_body(actor);

        let rb_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
        };
        // Boxes stay axis-aligned so the SDF view of the actor stays valid.
        let body = RigidBodyBuilder::new(rb_type)
            .translation(vector![desc.position.x, desc.position.y])
            .lock_rotations()
            .build();
        let handle = self.rigid_bodies.insert(body);

        let collider = ColliderBuilder::cuboid(desc.half_size.x.max(0.0), desc.half_size.y.max(0.0))
            .density(desc.density)
            .friction(desc.friction)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.rigid_bodies);

        self.actor_to_body.insert(actor, handle);
        self.body_to_actor.insert(handle, actor);
        log::debug!("created {:?} body for actor {}", desc.kind, actor);
        Ok(BodyHandle(handle))
    }

    /// Removes the body of `actor` and its collider. Returns whether one existed.
    pub fn remove_body(&mut self, actor: ActorId) -> bool {
        let Some(handle) = self.actor_to_body.remove(&actor) else {
            return false;
        };
        self.rigid_bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.body_to_actor.remove(&handle);
        true
    }

    pub fn has_body(&self, actor: ActorId) -> bool {
        self.actor_to_body.contains_key(&actor)
    }

    pub fn body_count(&self) -> usize {
        self.actor_to_body.len()
    }

    pub fn handle(&self, actor: ActorId) -> Option<BodyHandle> {
        self.actor_to_body.get(&actor).copied().map(BodyHandle)
    }

    pub fn body_position(&self, actor: ActorId) -> Result<Vec2> {
        let t = self.body(actor)?.translation();
        Ok(Vec2::new(t.x, t.y))
    }

    pub fn body_velocity(&self, actor: ActorId) -> Result<Vec2> {
        let v = self.body(actor)?.linvel();
        Ok(Vec2::new(v.x, v.y))
    }

    pub fn set_position(&mut self, actor: ActorId, p: Vec2) -> Result<()> {
        self.body_mut(actor)?
            .set_translation(vector![p.x, p.y], true);
        Ok(())
    }

    pub fn set_velocity(&mut self, actor: ActorId, v: Vec2) -> Result<()> {
        self.body_mut(actor)?.set_linvel(vector![v.x, v.y], true);
        Ok(())
    }

    pub fn apply_impulse(&mut self, actor: ActorId, impulse: Vec2) -> Result<()> {
        self.body_mut(actor)?
            .apply_impulse(vector![impulse.x, impulse.y], true);
        Ok(())
    }

    /// Advances the rigid-body world by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let gravity = vector![self.gravity.x, self.gravity.y];

        self.pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &self.event_handler,
        );

        self.collect_contacts();
    }

    /// Contacts that started or stopped since the last drain.
    pub fn drain_contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.pending_contacts)
    }

    fn body(&self, actor: ActorId) -> Result<&RigidBody> {
        self.actor_to_body
            .get(&actor)
            .and_then(|h| self.rigid_bodies.get(*h))
            .ok_or(GameError::NoBody(actor))
    }

    fn body_mut(&mut self, actor: ActorId) -> Result<&mut RigidBody> {
        let handle = *self.actor_to_body.get(&actor).ok_or(GameError::NoBody(actor))?;
        self.rigid_bodies
            .get_mut(handle)
            .ok_or(GameError::NoBody(actor))
    }

    fn collect_contacts(&mut self) {
        while let Ok(ev) = self.event_recv_collision.try_recv() {
            let (c1, c2, started) = match ev {
                CollisionEvent::Started(c1, c2, _) => (c1, c2, true),
                CollisionEvent::Stopped(c1, c2, _) => (c1, c2, false),
            };
            if let Some((a, b)) = self.map_pair(c1, c2) {
                self.pending_contacts.push(Contact { a, b, started });
            }
        }
    }

    fn map_pair(&self, c1: ColliderHandle, c2: ColliderHandle) -> Option<(ActorId, ActorId)> {
        let b1 = self.colliders.get(c1)?.parent()?;
        let b2 = self.colliders.get(c2)?.parent()?;
        Some((*self.body_to_actor.get(&b1)?, *self.body_to_actor.get(&b2)?))
    }
}
