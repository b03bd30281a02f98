use glam::Vec3;

use crate::actor::ActorState;

use super::{BehaviorComponent, BehaviorView, HookContext};

/// Sprite offset of the "eaten" frame relative to the food's own sprite.
pub const EATEN_FRAME_OFFSET: i32 = 50;

/// Clip played on pickup.
pub const PICKUP_CLIP: u32 = 1;

const BOB_SECONDS: f32 = 2.0;
const BOB_FREQUENCY: f32 = 50.0;
const BOB_AMPLITUDE: f32 = 0.25;

/// Random movement parameters seeded for food placed as static scenery.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Patrol {
    pub horizontal: bool,
    pub movement: f32,
    pub origin: Vec3,
}

/// Food pickup.
///
/// As a trigger, a visitor entering it is sent to a random spot in the world
/// and the food shows its eaten frame while bobbing in place for two seconds.
/// With [`consume`](Self::consume) set the food deactivates instead of coming
/// back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoodBehavior {
    pub consume: bool,
    bob_remaining: f32,
    bob_origin: Vec3,
    patrol: Option<Patrol>,
}

impl FoodBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Food that disappears once eaten.
    pub fn consumable() -> Self {
        Self {
            consume: true,
            ..Self::default()
        }
    }

    pub fn is_bobbing(&self) -> bool {
        self.bob_remaining > 0.0
    }

    pub fn patrol(&self) -> Option<Patrol> {
        self.patrol
    }
}

impl BehaviorComponent for FoodBehavior {
    fn begin_play(&mut self, actor: &mut BehaviorView<'_>, ctx: &mut HookContext<'_>) {
        if actor.state().is_static() {
            self.patrol = Some(Patrol {
                horizontal: ctx.rng.bool(),
                movement: ctx.rng.f32() * 5.0 + 2.0,
                origin: actor.state().position,
            });
        }
    }

    fn update(&mut self, actor: &mut BehaviorView<'_>, _ctx: &mut HookContext<'_>) {
        if !actor.state().is_trigger() || !self.is_bobbing() {
            return;
        }
        let mut bobbed = self.bob_origin;
        bobbed.y += (BOB_FREQUENCY * self.bob_remaining).sin() * BOB_AMPLITUDE;
        actor.request_position(bobbed);

        self.bob_remaining -= actor.dt();
        if self.bob_remaining <= 0.0 {
            actor.request_position(self.bob_origin);
            let sprite = actor.state().sprite.id as i32;
            actor.anim_mut().base = sprite;
        }
    }

    fn begin_trigger_overlap(
        &mut self,
        trigger: &mut BehaviorView<'_>,
        visitor: &mut BehaviorView<'_>,
        ctx: &mut HookContext<'_>,
    ) {
        log::debug!(
            "trigger {} overlapped by {}",
            trigger.state().id(),
            visitor.state().id()
        );
        if !self.is_bobbing() {
            let sprite = trigger.state().sprite.id as i32;
            trigger.anim_mut().base = sprite + EATEN_FRAME_OFFSET;
            self.bob_origin = trigger.state().position;
        }
        self.bob_remaining = BOB_SECONDS;

        let world = ctx.world_size();
        let z = visitor.state().position.z;
        visitor.request_position(Vec3::new(
            1.0 + ctx.rng.f32() * (world.x - 2.0).max(0.0),
            1.0 + ctx.rng.f32() * (world.y - 2.0).max(0.0),
            z,
        ));
        ctx.audio.play_clip(PICKUP_CLIP);

        if self.consume {
            trigger.set_active(false);
        }
    }

    fn end_trigger_overlap(
        &mut self,
        trigger: &mut BehaviorView<'_>,
        visitor: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
        log::debug!(
            "trigger {} no longer overlapped by {}",
            trigger.state().id(),
            visitor.id()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorKind};
    use crate::components::test_support::Harness;
    use crate::world::TileMap;

    fn trigger_at(x: f32, y: f32) -> Actor {
        let mut a = Actor::new("food").at(x, y).with_sprite(0, 7);
        a.state.classify(ActorKind::Trigger).unwrap();
        a
    }

    #[test]
    fn test_pickup_relocates_visitor_in_bounds() {
        let mut h = Harness::new(TileMap::new(20, 10).unwrap());
        let mut food = trigger_at(3.0, 3.0);
        let mut player = Actor::new("player").at(3.0, 3.0);
        let mut behavior = FoodBehavior::new();

        behavior.begin_trigger_overlap(
            &mut BehaviorView::new(&mut food.state),
            &mut BehaviorView::new(&mut player.state),
            &mut h.ctx(0.1),
        );

        let target = player.state.requests.position.unwrap();
        assert!((1.0..=19.0).contains(&target.x));
        assert!((1.0..=9.0).contains(&target.y));
        assert_eq!(food.state.anim.base, 7 + EATEN_FRAME_OFFSET);
        assert_eq!(h.audio.played(), &[PICKUP_CLIP]);
        assert!(food.state.active);
        assert!(behavior.is_bobbing());
    }

    #[test]
    fn test_bob_ends_back_at_origin() {
        let mut h = Harness::new(TileMap::new(20, 10).unwrap());
        let mut food = trigger_at(3.0, 3.0);
        let mut player = Actor::new("player");
        let mut behavior = FoodBehavior::new();
        behavior.begin_trigger_overlap(
            &mut BehaviorView::new(&mut food.state),
            &mut BehaviorView::new(&mut player.state),
            &mut h.ctx(0.5),
        );

        food.state.dt = 0.5;
        for _ in 0..4 {
            behavior.update(&mut BehaviorView::new(&mut food.state), &mut h.ctx(0.5));
            assert!(food.state.requests.position.is_some());
        }
        assert!(!behavior.is_bobbing());
        assert_eq!(food.state.requests.position, Some(Vec3::new(3.0, 3.0, 0.0)));
        assert_eq!(food.state.anim.base, 7);
    }

    #[test]
    fn test_consumable_food_deactivates() {
        let mut h = Harness::new(TileMap::new(20, 10).unwrap());
        let mut food = trigger_at(3.0, 3.0);
        let mut player = Actor::new("player");
        let mut behavior = FoodBehavior::consumable();
        behavior.begin_trigger_overlap(
            &mut BehaviorView::new(&mut food.state),
            &mut BehaviorView::new(&mut player.state),
            &mut h.ctx(0.1),
        );
        assert!(!food.state.active);
    }

    #[test]
    fn test_static_food_seeds_patrol() {
        let mut h = Harness::new(TileMap::new(20, 10).unwrap());
        let mut food = Actor::new("food").at(2.0, 2.0);
        food.state.classify(ActorKind::Static).unwrap();
        let mut behavior = FoodBehavior::new();
        behavior.begin_play(&mut BehaviorView::new(&mut food.state), &mut h.ctx(0.0));
        let patrol = behavior.patrol().unwrap();
        assert!((2.0..7.0).contains(&patrol.movement));
        assert_eq!(patrol.origin, Vec3::new(2.0, 2.0, 0.0));
    }
}
