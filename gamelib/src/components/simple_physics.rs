use crate::actor::ActorState;
use crate::math::Vec2;
use crate::sdf::SdfParams;

use super::{HookContext, PhysicsComponent};

/// Tile overlaps thinner than this are treated as resting contact.
const TILE_SLOP: f32 = 1e-4;

/// Discrete contact response over the SDF kernel.
///
/// Interpenetrating actors are pushed apart along the line between their
/// support points; velocity into the contact normal is cancelled, or reflected
/// when `elastic` is set. Any contact restores the actor's jump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimplePhysics {
    pub density: f32,
    pub friction: f32,
    pub elastic: bool,
}

impl Default for SimplePhysics {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.3,
            elastic: false,
        }
    }
}

impl SimplePhysics {
    pub fn elastic() -> Self {
        Self {
            elastic: true,
            ..Self::default()
        }
    }

    /// Moves `actor` out of `other` by `share` of the penetration depth and
    /// returns `other`'s surface normal at the contact. `None` when the two
    /// do not interpenetrate.
    pub fn push_out(
        actor: &mut ActorState,
        other: &ActorState,
        share: f32,
        params: &SdfParams,
    ) -> Option<Vec2> {
        let depth = actor.touching(other, params);
        if depth >= 0.0 {
            return None;
        }
        let sa = actor.support(other.position2d(), params);
        let sb = other.support(actor.position2d(), params);
        let dir = (sa - sb).normalized();
        actor.set_position2d(actor.position2d() + dir * (depth * share));
        Some(other.normal(sb, params))
    }

    /// Removes (or mirrors) the part of the velocity heading into `normal`.
    pub(crate) fn respond(&self, actor: &mut ActorState, normal: Vec2) {
        let v = actor.velocity2d();
        let into = v.dot(normal);
        if into < 0.0 {
            let scale = if self.elastic { 2.0 } else { 1.0 };
            actor.set_velocity2d(v - normal * (into * scale));
        }
        actor.intent.jumped = false;
    }

    fn resolve(&self, actor: &mut ActorState, other: &ActorState, share: f32, ctx: &HookContext<'_>) -> bool {
        match Self::push_out(actor, other, share, &ctx.sdf) {
            Some(normal) => {
                self.respond(actor, normal);
                true
            }
            None => false,
        }
    }

    fn stop_axis(&self, v: &mut f32, push: f32) {
        if *v * push < 0.0 {
            *v = if self.elastic { -*v } else { 0.0 };
        }
    }
}

/// Inclusive tile ranges under `[min, max]`, clipped to the map. `None` when
/// the box misses the map entirely.
fn covered_tiles(
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    (w, h): (u32, u32),
) -> Option<(i32, i32, i32, i32)> {
    if w == 0 || h == 0 {
        return None;
    }
    // Clip in float space; the casts below then stay within the map.
    let x0 = min_x.floor().max(0.0);
    let x1 = (max_x.ceil() - 1.0).min(w as f32 - 1.0);
    let y0 = min_y.floor().max(0.0);
    let y1 = (max_y.ceil() - 1.0).min(h as f32 - 1.0);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0 as i32, x1 as i32, y0 as i32, y1 as i32))
}

impl PhysicsComponent for SimplePhysics {
    /// Pushes the actor out of every solid tile it overlaps, along the axis of
    /// least penetration.
    fn collide_world(&mut self, actor: &mut ActorState, ctx: &mut HookContext<'_>) -> bool {
        let (min, max) = (actor.min(), actor.max());
        if !(min.is_finite() && max.is_finite()) {
            return false;
        }
        let Some((x0, x1, y0, y1)) = covered_tiles(min.x, max.x, min.y, max.y, ctx.tiles.size()) else {
            return false;
        };

        let mut hit = false;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !ctx.tiles.is_solid(x, y) {
                    continue;
                }
                let (min, max) = (actor.min(), actor.max());
                let (tx, ty) = (x as f32, y as f32);
                let ox = max.x.min(tx + 1.0) - min.x.max(tx);
                let oy = max.y.min(ty + 1.0) - min.y.max(ty);
                if ox <= TILE_SLOP || oy <= TILE_SLOP {
                    continue;
                }
                if ox < oy {
                    let push = if actor.position.x < tx + 0.5 { -ox } else { ox };
                    actor.position.x += push;
                    self.stop_axis(&mut actor.velocity.x, push);
                } else {
                    let push = if actor.position.y < ty + 0.5 { -oy } else { oy };
                    actor.position.y += push;
                    self.stop_axis(&mut actor.velocity.y, push);
                }
                actor.intent.jumped = false;
                hit = true;
            }
        }
        hit
    }

    fn collide_dynamic(
        &mut self,
        actor: &mut ActorState,
        other: &ActorState,
        ctx: &mut HookContext<'_>,
    ) -> bool {
        // Each side of the pair resolves its own half.
        self.resolve(actor, other, 0.5, ctx)
    }

    fn collide_static(
        &mut self,
        actor: &mut ActorState,
        other: &ActorState,
        ctx: &mut HookContext<'_>,
    ) -> bool {
        self.resolve(actor, other, 1.0, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::components::test_support::Harness;
    use crate::world::TileMap;
    use approx::assert_abs_diff_eq;

    fn floor() -> Actor {
        Actor::new("floor").at(0.0, -1.0).with_size(10.0, 1.0)
    }

    #[test]
    fn test_static_contact_pushes_back_out() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let floor = floor();
        let mut box_ = Actor::new("box")
            .at(0.0, -0.1)
            .with_size(1.0, 1.0)
            .with_velocity(1.0, -2.0);
        box_.state.intent.jumped = true;

        let mut physics = SimplePhysics::default();
        assert!(physics.collide_static(&mut box_.state, &floor.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(box_.state.position.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(box_.state.velocity.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(box_.state.velocity.x, 1.0, epsilon = 1e-3);
        assert!(!box_.state.intent.jumped);
    }

    #[test]
    fn test_separated_boxes_are_left_alone() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let floor = floor();
        let mut box_ = Actor::new("box").at(0.0, 1.0).with_size(1.0, 1.0);
        let mut physics = SimplePhysics::default();
        assert!(!physics.collide_static(&mut box_.state, &floor.state, &mut h.ctx(0.1)));
        assert_eq!(box_.state.position.y, 1.0);
    }

    #[test]
    fn test_elastic_reflects() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let floor = floor();
        let mut box_ = Actor::new("box")
            .at(0.0, -0.1)
            .with_size(1.0, 1.0)
            .with_velocity(0.0, -2.0);
        let mut physics = SimplePhysics::elastic();
        assert!(physics.collide_static(&mut box_.state, &floor.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(box_.state.velocity.y, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_dynamic_contact_takes_half() {
        let mut h = Harness::new(TileMap::new(1, 1).unwrap());
        let other = floor();
        let mut box_ = Actor::new("box").at(0.0, -0.1).with_size(1.0, 1.0);
        let mut physics = SimplePhysics::default();
        assert!(physics.collide_dynamic(&mut box_.state, &other.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(box_.state.position.y, -0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_world_contact_lifts_out_of_floor() {
        let mut h = Harness::new(TileMap::from_rows(&["....", "....", "####"]).unwrap());
        let mut box_ = Actor::new("box")
            .at(2.5, 1.7)
            .with_size(1.0, 1.0)
            .with_velocity(0.0, 3.0);
        let mut physics = SimplePhysics::default();
        assert!(physics.collide_world(&mut box_.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(box_.state.position.y, 1.5, epsilon = 1e-5);
        assert_eq!(box_.state.velocity.y, 0.0);

        assert!(!physics.collide_world(&mut box_.state, &mut h.ctx(0.1)));
    }

    #[test]
    fn test_far_outside_the_map_is_ignored() {
        let mut h = Harness::new(TileMap::walled(20, 20).unwrap());
        let mut physics = SimplePhysics::default();
        for x in [-3.0e9, 3.0e9, f32::MAX / 2.0] {
            let mut box_ = Actor::new("far").at(x, 5.0).with_size(1.0, 1.0);
            assert!(!physics.collide_world(&mut box_.state, &mut h.ctx(0.1)));
            assert_eq!(box_.state.position.x, x);
        }
    }

    #[test]
    fn test_huge_box_only_visits_map_tiles() {
        assert_eq!(
            covered_tiles(-1.0e5, 1.0e5, -1.0e5, 1.0e5, (20, 20)),
            Some((0, 19, 0, 19))
        );
        assert_eq!(covered_tiles(-5.0, -1.0, 0.0, 1.0, (20, 20)), None);
        assert_eq!(covered_tiles(0.0, 1.0, 0.0, 1.0, (0, 0)), None);

        let mut h = Harness::new(TileMap::walled(20, 20).unwrap());
        let mut box_ = Actor::new("huge").at(10.0, 10.0).with_size(2.0e5, 2.0e5);
        let mut physics = SimplePhysics::default();
        assert!(physics.collide_world(&mut box_.state, &mut h.ctx(0.1)));
    }

    #[test]
    fn test_world_contact_against_wall() {
        let mut h = Harness::new(TileMap::from_rows(&["...#", "...#", "...#"]).unwrap());
        let mut box_ = Actor::new("box")
            .at(2.8, 1.5)
            .with_size(1.0, 1.0)
            .with_velocity(4.0, 0.0);
        let mut physics = SimplePhysics::elastic();
        assert!(physics.collide_world(&mut box_.state, &mut h.ctx(0.1)));
        assert_abs_diff_eq!(box_.state.position.x, 2.5, epsilon = 1e-5);
        assert_eq!(box_.state.velocity.x, -4.0);
    }
}
