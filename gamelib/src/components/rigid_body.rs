use crate::actor::ActorState;
use crate::backend::{BodyDesc, BodyKind};
use crate::error::Result;

use super::{HookContext, PhysicsComponent};

/// Hands the actor to the rigid-body backend.
///
/// The backend owns integration: velocity is written to the body before the
/// step and position and velocity are read back after collision resolution.
/// Only dynamic and static actors can have bodies; spawning a trigger with
/// this component fails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyPhysics {
    pub density: f32,
    pub friction: f32,
}

impl Default for RigidBodyPhysics {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.3,
        }
    }
}

impl PhysicsComponent for RigidBodyPhysics {
    fn begin_play(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) -> Result<()> {
        let kind = BodyKind::try_from(actor.kind())?;
        let desc = BodyDesc {
            kind,
            position: actor.position2d(),
            half_size: actor.size2d() * 0.5,
            density: self.density,
            friction: self.friction,
        };
        ctx.backend()?.create_body(actor.id(), desc)?;
        Ok(())
    }

    fn end_play(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) {
        if let Some(backend) = ctx.backend.as_deref_mut() {
            backend.remove_body(actor.id());
        }
    }

    fn owns_integration(&self) -> bool {
        true
    }

    fn preupdate(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) {
        let Some(backend) = ctx.backend.as_deref_mut() else {
            return;
        };
        if let Err(e) = backend.set_velocity(actor.id(), actor.velocity2d()) {
            log::warn!("{}: {}", actor.name, e);
        }
    }

    fn postupdate(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) {
        let Some(backend) = ctx.backend.as_deref_mut() else {
            return;
        };
        match (backend.body_position(actor.id()), backend.body_velocity(actor.id())) {
            (Ok(p), Ok(v)) => {
                actor.set_position2d(p);
                actor.set_velocity2d(v);
            }
            (Err(e), _) | (_, Err(e)) => log::warn!("{}: {}", actor.name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::backend::PhysicsBackend;
    use crate::components::test_support::Harness;
    use crate::error::GameError;
    use crate::math::Vec2;
    use crate::world::TileMap;

    fn classified(kind: ActorKind) -> Actor {
        let mut a = Actor::new("body").at(1.0, 1.0).with_size(1.0, 1.0);
        a.state.classify(kind).unwrap();
        a
    }

    #[test]
    fn test_trigger_is_refused() {
        let mut h = Harness::new(TileMap::new(4, 4).unwrap());
        h.backend = Some(PhysicsBackend::default());
        let mut a = classified(ActorKind::Trigger);
        let err = RigidBodyPhysics::default()
            .begin_play(&mut a.state, &mut h.ctx(0.0))
            .unwrap_err();
        assert!(matches!(err, GameError::UnsupportedBodyType(ActorKind::Trigger)));
        assert_eq!(h.backend.as_ref().unwrap().body_count(), 0);
    }

    #[test]
    fn test_needs_a_backend() {
        let mut h = Harness::new(TileMap::new(4, 4).unwrap());
        let mut a = classified(ActorKind::Dynamic);
        let err = RigidBodyPhysics::default()
            .begin_play(&mut a.state, &mut h.ctx(0.0))
            .unwrap_err();
        assert!(matches!(err, GameError::MissingBackend));
    }

    #[test]
    fn test_round_trip_through_backend() {
        let mut h = Harness::new(TileMap::new(4, 4).unwrap());
        h.backend = Some(PhysicsBackend::new(Vec2::ZERO));
        let mut a = classified(ActorKind::Dynamic);
        a.state.velocity.x = 2.0;
        let mut physics = RigidBodyPhysics::default();

        physics.begin_play(&mut a.state, &mut h.ctx(0.0)).unwrap();
        physics.preupdate(&mut a.state, &mut h.ctx(0.5));
        h.backend.as_mut().unwrap().step(0.5);
        physics.postupdate(&mut a.state, &mut h.ctx(0.5));
        assert!(a.state.position.x > 1.0);
        assert_eq!(a.state.position.y, 1.0);

        physics.end_play(&mut a.state, &mut h.ctx(0.0));
        assert!(!h.backend.as_ref().unwrap().has_body(a.id()));
    }
}
