//! Capability interfaces and the stock variants.
//!
//! An actor carries up to four capabilities, one per concern. Every hook has a
//! no-op default, so a variant only implements what it cares about and an
//! empty slot needs no special casing in the pipeline.
//!
//! Hooks never reach for global state: whatever they may touch beyond their
//! own actor comes in through [`HookContext`]. Input and behavior hooks see
//! the actor through a restricted view that cannot write `position`; the
//! pipeline applies requested moves at the end of the phase.

mod food;
mod graphics;
mod newton;
mod player;
mod player_input;
mod rigid_body;
mod simple_physics;

pub use food::{FoodBehavior, Patrol, EATEN_FRAME_OFFSET, PICKUP_CLIP};
pub use graphics::{DebugGraphics, SpriteGraphics};
pub use newton::NewtonPhysics;
pub use player::PlayerBehavior;
pub use player_input::PlayerInput;
pub use rigid_body::RigidBodyPhysics;
pub use simple_physics::SimplePhysics;

use glam::Vec3;

use crate::actor::{ActorState, Intent};
use crate::animation::AnimationState;
use crate::audio::AudioSink;
use crate::backend::PhysicsBackend;
use crate::error::{GameError, Result};
use crate::input::Controls;
use crate::math::Vec2;
use crate::render::Renderer;
use crate::sdf::SdfParams;
use crate::world::TileWorld;

/// Shared services handed to behavior and physics hooks.
pub struct HookContext<'a> {
    /// Length of the current tick in seconds.
    pub dt: f32,
    /// Simulation time at the start of the current tick.
    pub time: f32,
    pub sdf: SdfParams,
    pub tiles: &'a dyn TileWorld,
    pub rng: &'a mut fastrand::Rng,
    pub audio: &'a mut dyn AudioSink,
    pub backend: Option<&'a mut PhysicsBackend>,
}

impl<'a> HookContext<'a> {
    /// World size in tiles, as floats.
    pub fn world_size(&self) -> Vec2 {
        let (w, h) = self.tiles.size();
        Vec2::new(w as f32, h as f32)
    }

    pub fn backend(&mut self) -> Result<&mut PhysicsBackend> {
        self.backend.as_deref_mut().ok_or(GameError::MissingBackend)
    }
}

/// What an input capability may touch: velocity and intent.
pub struct InputView<'a> {
    state: &'a mut ActorState,
}

impl<'a> InputView<'a> {
    pub(crate) fn new(state: &'a mut ActorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ActorState {
        self.state
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn set_velocity_x(&mut self, vx: f32) {
        self.state.velocity.x = vx;
    }

    pub fn set_velocity_y(&mut self, vy: f32) {
        self.state.velocity.y = vy;
    }

    pub fn intent(&self) -> Intent {
        self.state.intent
    }

    pub fn intent_mut(&mut self) -> &mut Intent {
        &mut self.state.intent
    }
}

/// What a behavior capability may touch.
///
/// Position changes are requests: they land when the pipeline finishes the
/// current phase, so physics always sees a consistent position.
pub struct BehaviorView<'a> {
    state: &'a mut ActorState,
}

impl<'a> BehaviorView<'a> {
    pub(crate) fn new(state: &'a mut ActorState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ActorState {
        self.state
    }

    pub fn dt(&self) -> f32 {
        self.state.dt
    }

    pub fn anim_mut(&mut self) -> &mut AnimationState {
        &mut self.state.anim
    }

    pub fn switch_anim(&mut self, index: usize) -> bool {
        self.state.switch_anim(index)
    }

    pub fn set_active(&mut self, active: bool) {
        self.state.active = active;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.visible = visible;
    }

    /// Moves the actor to `position` once the current phase ends.
    /// A later request in the same phase wins.
    pub fn request_position(&mut self, position: Vec3) {
        self.state.requests.position = Some(position);
    }

    pub fn pending_position(&self) -> Option<Vec3> {
        self.state.requests.position
    }

    /// Removes the actor at the end of the tick.
    pub fn request_despawn(&mut self) {
        self.state.requests.despawn = true;
    }
}

/// Turns device state into velocity and intent. Called once per frame.
pub trait InputComponent {
    fn update(&mut self, _actor: &mut InputView<'_>, _controls: &Controls<'_>) {}
}

/// Gameplay logic and reactions to collision and overlap events.
pub trait BehaviorComponent {
    fn begin_play(&mut self, _actor: &mut BehaviorView<'_>, _ctx: &mut HookContext<'_>) {}

    fn update(&mut self, _actor: &mut BehaviorView<'_>, _ctx: &mut HookContext<'_>) {}

    /// The physics response reported contact with a solid tile.
    fn on_collide_world(&mut self, _actor: &mut BehaviorView<'_>, _ctx: &mut HookContext<'_>) {}

    fn on_collide_dynamic(
        &mut self,
        _actor: &mut BehaviorView<'_>,
        _other: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    fn on_collide_static(
        &mut self,
        _actor: &mut BehaviorView<'_>,
        _other: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// This actor started overlapping `trigger`.
    fn begin_overlap(
        &mut self,
        _actor: &mut BehaviorView<'_>,
        _trigger: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    fn end_overlap(
        &mut self,
        _actor: &mut BehaviorView<'_>,
        _trigger: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// Called on the trigger's behavior when `visitor` enters it. The only hook
    /// that may change two actors.
    fn begin_trigger_overlap(
        &mut self,
        _trigger: &mut BehaviorView<'_>,
        _visitor: &mut BehaviorView<'_>,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    fn end_trigger_overlap(
        &mut self,
        _trigger: &mut BehaviorView<'_>,
        _visitor: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) {
    }

    /// Remaining health, for behaviors that track it.
    fn health(&self) -> Option<f32> {
        None
    }
}

/// Movement and contact response.
///
/// Collision hooks return `true` when they resolved a contact; the pipeline
/// then notifies the actor's behavior.
pub trait PhysicsComponent {
    /// Called once when the actor enters play. An error refuses the spawn.
    fn begin_play(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called when the actor leaves play.
    fn end_play(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) {}

    /// Whether this component moves the actor itself, so the pipeline must not
    /// integrate its velocity.
    fn owns_integration(&self) -> bool {
        false
    }

    fn preupdate(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) {}

    fn update(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) {}

    fn postupdate(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) {}

    fn collide_world(&mut self, _actor: &mut ActorState, _ctx: &mut HookContext<'_>) -> bool {
        false
    }

    fn collide_dynamic(
        &mut self,
        _actor: &mut ActorState,
        _other: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) -> bool {
        false
    }

    fn collide_static(
        &mut self,
        _actor: &mut ActorState,
        _other: &ActorState,
        _ctx: &mut HookContext<'_>,
    ) -> bool {
        false
    }
}

/// Draws an actor. Read-only with respect to simulation state.
pub trait GraphicsComponent {
    fn draw(&self, _actor: &ActorState, _renderer: &mut dyn Renderer) {}
}

/// Moves `actor` by its velocity over `dt`, clamping speed to `max_speed` first.
pub fn integrate(actor: &mut ActorState, dt: f32) {
    let limit = actor.max_speed.max(0.0);
    let speed = actor.velocity.length();
    if speed > limit && speed > 0.0 {
        actor.velocity *= limit / speed;
    }
    actor.position += actor.velocity * dt;
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut a = Actor::new("a").with_velocity(2.0, -1.0);
        integrate(&mut a.state, 0.5);
        assert_eq!(a.state.position, Vec3::new(1.0, -0.5, 0.0));
    }

    #[test]
    fn test_integrate_clamps_speed() {
        let mut a = Actor::new("a").with_velocity(3.0, 4.0).with_max_speed(1.0);
        integrate(&mut a.state, 1.0);
        assert_abs_diff_eq!(a.state.velocity.length(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(a.state.position.x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_integrate_zero_velocity_with_zero_limit() {
        let mut a = Actor::new("a").with_max_speed(0.0);
        integrate(&mut a.state, 1.0);
        assert!(a.state.position.is_finite());
        assert_eq!(a.state.position, Vec3::ZERO);
    }

    #[test]
    fn test_behavior_view_defers_position() {
        let mut a = Actor::new("a");
        let mut view = BehaviorView::new(&mut a.state);
        view.request_position(Vec3::new(4.0, 5.0, 0.0));
        assert_eq!(view.pending_position(), Some(Vec3::new(4.0, 5.0, 0.0)));
        assert_eq!(a.state.position, Vec3::ZERO);
    }

    #[test]
    fn test_missing_backend_is_an_error() {
        let mut h = test_support::Harness::new(crate::world::TileMap::new(4, 4).unwrap());
        let mut ctx = h.ctx(0.1);
        assert!(matches!(ctx.backend(), Err(GameError::MissingBackend)));
        assert_eq!(ctx.world_size(), Vec2::new(4.0, 4.0));
    }
}
