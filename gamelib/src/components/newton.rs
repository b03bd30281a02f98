use crate::actor::ActorState;
use crate::math::Vec2;

use super::{HookContext, PhysicsComponent, SimplePhysics};

/// [`SimplePhysics`] plus gravity, ground friction and restitution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonPhysics {
    pub contact: SimplePhysics,
    /// Acceleration in world units per second squared. Y grows downward.
    pub gravity: Vec2,
    /// Fraction of the normal speed kept after a static contact, 0 to 1.
    pub restitution: f32,
}

impl Default for NewtonPhysics {
    fn default() -> Self {
        Self {
            contact: SimplePhysics::default(),
            gravity: Vec2::new(0.0, 9.81),
            restitution: 0.5,
        }
    }
}

impl NewtonPhysics {
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }
}

impl PhysicsComponent for NewtonPhysics {
    fn update(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) {
        let mut v = actor.velocity2d() + self.gravity * ctx.dt;
        v.x *= (1.0 - self.contact.friction * ctx.dt).max(0.0);
        actor.set_velocity2d(v);
    }

    fn collide_world(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) -> bool {
        self.contact.collide_world(actor, ctx)
    }

    fn collide_dynamic(
        &mut self,
        actor: &mut ActorState,
        other: &ActorState,
        ctx: &mut HookContext<'_>,
    ) -> bool {
        self.contact.collide_dynamic(actor, other, ctx)
    }

    fn collide_static(
        &mut self,
        actor: &mut ActorState,
        other: &ActorState,
        ctx: &mut HookContext<'_>,
    ) -> bool {
        let before = actor.velocity2d();
        let Some(normal) = SimplePhysics::push_out(actor, other, 1.0, &ctx.sdf) else {
            return false;
        };
        self.contact.respond(actor, normal);
        let into = before.dot(normal);
        if into < 0.0 {
            let tangent = before - normal * into;
            actor.set_velocity2d(tangent - normal * (into * self.restitution));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::components::test_support::Harness;
    use crate::world::TileMap;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gravity_accelerates() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let mut a = Actor::new("a");
        let mut physics = NewtonPhysics::default().with_gravity(Vec2::new(0.0, 10.0));
        physics.update(&mut a.state, &mut h.ctx(0.5));
        assert_abs_diff_eq!(a.state.velocity.y, 5.0);
    }

    #[test]
    fn test_friction_slows_horizontal_motion() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let mut a = Actor::new("a").with_velocity(10.0, 0.0);
        let mut physics = NewtonPhysics::default().with_gravity(Vec2::ZERO);
        physics.update(&mut a.state, &mut h.ctx(1.0));
        assert_abs_diff_eq!(a.state.velocity.x, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_restitution_on_static_contact() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let floor = Actor::new("floor").at(0.0, -1.0).with_size(10.0, 1.0);
        let mut a = Actor::new("a")
            .at(0.0, -0.1)
            .with_size(1.0, 1.0)
            .with_velocity(1.0, -4.0);
        let mut physics = NewtonPhysics::default().with_restitution(0.5);
        assert!(physics.collide_static(&mut a.state, &floor.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(a.state.velocity.y, 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(a.state.velocity.x, 1.0, epsilon = 1e-3);
    }
}
