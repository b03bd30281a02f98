//! Fixed-timestep driver.
//!
//! Real time is banked in an accumulator and spent in fixed ticks. Begin-play
//! runs when an actor is spawned, before it sees its first tick. Each tick
//! then runs, for every active actor:
//!
//! 1. physics `preupdate`
//! 2. behavior `update`
//! 3. physics `update`, then velocity integration
//! 4. the rigid-body backend step
//! 5. collision resolution: tiles, then every overlapping pair
//! 6. physics `postupdate`
//!
//! Drawing happens once per frame, however many ticks ran. The actor
//! collection is never resized while a tick iterates it: despawns are
//! collected and carried out after step 6.

use std::collections::HashSet;
use std::time::Duration;

use crate::actor::{Actor, ActorId, ActorKind, ActorState};
use crate::audio::{AudioSink, NullAudio};
use crate::backend::PhysicsBackend;
use crate::components::{integrate, BehaviorView, HookContext, InputView};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::input::Controls;
use crate::math::PixelTransform;
use crate::render::Renderer;
use crate::world::{pair_mut, TileWorld, World};

/// Lag within this much of a full step still runs the step, so frame times
/// that sum to a whole number of steps are not lost to rounding.
const STEP_TOLERANCE: Duration = Duration::from_micros(1);

pub struct Simulation {
    config: SimulationConfig,
    step: Duration,
    world: World,
    tiles: Box<dyn TileWorld>,
    rng: fastrand::Rng,
    audio: Box<dyn AudioSink>,
    backend: Option<PhysicsBackend>,
    lag: Duration,
    time: f32,
    ticks: u64,
}

impl Simulation {
    /// Fails if `config` does not validate.
    pub fn new(config: SimulationConfig, tiles: impl TileWorld + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            step: config.fixed_delta(),
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            world: World::new(),
            tiles: Box::new(tiles),
            audio: Box::new(NullAudio),
            backend: None,
            lag: Duration::ZERO,
            time: 0.0,
            ticks: 0,
        })
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: PhysicsBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attaches a rigid-body backend configured from the simulation config.
    #[must_use]
    pub fn with_default_backend(self) -> Self {
        let backend = PhysicsBackend::from_config(&self.config);
        self.with_backend(backend)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// World-to-pixel mapping for the configured tile size.
    pub fn pixel_transform(&self) -> PixelTransform {
        let [w, h] = self.config.tile_size;
        PixelTransform::new(w as i32, h as i32)
    }

    pub fn fixed_step(&self) -> Duration {
        self.step
    }

    /// Simulation time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Fraction of a step banked but not yet simulated, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        (self.lag.as_secs_f32() / self.step.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tiles(&self) -> &dyn TileWorld {
        self.tiles.as_ref()
    }

    pub fn backend(&self) -> Option<&PhysicsBackend> {
        self.backend.as_ref()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.world.get(id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.world.get_mut(id)
    }

    pub fn spawn_dynamic(&mut self, actor: Actor) -> Result<ActorId> {
        self.spawn(actor, ActorKind::Dynamic)
    }

    pub fn spawn_static(&mut self, actor: Actor) -> Result<ActorId> {
        self.spawn(actor, ActorKind::Static)
    }

    pub fn spawn_trigger(&mut self, actor: Actor) -> Result<ActorId> {
        self.spawn(actor, ActorKind::Trigger)
    }

    /// Classifies and adds `actor`, then runs its begin-play hooks. If a hook
    /// refuses, the actor is dropped and the error returned.
    pub fn spawn(&mut self, actor: Actor, kind: ActorKind) -> Result<ActorId> {
        let id = self.world.add(actor, kind)?;
        let (world, mut ctx) = self.parts(0.0);
        let begun = match world.get_mut(id) {
            Some(actor) => begin_play(actor, &mut ctx),
            None => Ok(()),
        };
        if let Err(e) = begun {
            log::warn!("refusing to spawn actor {}: {}", id, e);
            world.remove(id);
            return Err(e);
        }
        log::debug!("spawned {:?} actor {}", kind, id);
        Ok(id)
    }

    /// Removes an actor now, running its end-play hook. Returns whether it existed.
    pub fn despawn(&mut self, id: ActorId) -> bool {
        let (world, mut ctx) = self.parts(0.0);
        match world.remove(id) {
            Some(mut actor) => {
                end_play(&mut actor, &mut ctx);
                true
            }
            None => false,
        }
    }

    /// Runs every input capability against this frame's controls.
    pub fn process_input(&mut self, controls: &Controls<'_>) {
        for actor in self.world.iter_mut() {
            if !(actor.in_play && actor.state.active) {
                continue;
            }
            if let Some(input) = actor.input.as_mut() {
                input.update(&mut InputView::new(&mut actor.state), controls);
            }
        }
    }

    /// Banks `elapsed` real time and runs as many fixed ticks as it pays for.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.lag += elapsed;
        let mut ran = 0;
        while self.lag + STEP_TOLERANCE >= self.step {
            self.lag = self.lag.saturating_sub(self.step);
            self.tick();
            ran += 1;
        }
        ran
    }

    pub fn advance_secs(&mut self, seconds: f32) -> u32 {
        self.advance(Duration::from_secs_f32(seconds.max(0.0)))
    }

    /// Input, simulation and drawing for one rendered frame.
    pub fn frame(
        &mut self,
        elapsed: Duration,
        controls: &Controls<'_>,
        renderer: &mut dyn Renderer,
    ) -> u32 {
        self.process_input(controls);
        let ran = self.advance(elapsed);
        self.draw(renderer);
        ran
    }

    /// Draws every visible, active actor that has a graphics capability.
    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for actor in self.world.iter() {
            if !(actor.in_play && actor.state.visible && actor.state.active) {
                continue;
            }
            if let Some(graphics) = actor.graphics.as_ref() {
                graphics.draw(&actor.state, renderer);
            }
        }
    }

    /// Removes every actor, running end-play hooks, and resets the clock.
    pub fn teardown(&mut self) {
        let (world, mut ctx) = self.parts(0.0);
        for mut actor in world.drain() {
            end_play(&mut actor, &mut ctx);
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.clear();
        }
        self.lag = Duration::ZERO;
        self.time = 0.0;
        self.ticks = 0;
        log::debug!("simulation torn down");
    }

    /// Runs exactly one fixed tick.
    pub fn tick(&mut self) {
        let dt = self.step.as_secs_f32();
        let (world, mut ctx) = self.parts(dt);

        let actors = world.actors_mut();
        forget_stale_overlaps(actors);
        start_tick(actors, &ctx);
        preupdate(actors, &mut ctx);
        update_behaviors(actors, &mut ctx);
        update_physics(actors, &mut ctx);
        step_backend(actors, &mut ctx);
        collide_world(actors, &mut ctx);
        collide_pairs(actors, &mut ctx);
        postupdate(actors, &mut ctx);

        let doomed: Vec<ActorId> = actors
            .iter()
            .filter(|a| a.state.requests.despawn)
            .map(Actor::id)
            .collect();
        for id in doomed {
            if let Some(mut actor) = world.remove(id) {
                end_play(&mut actor, &mut ctx);
                log::debug!("despawned actor {}", id);
            }
        }

        self.time += dt;
        self.ticks += 1;
        log::trace!("tick {} at {:.3}s", self.ticks, self.time);
    }

    fn parts(&mut self, dt: f32) -> (&mut World, HookContext<'_>) {
        let ctx = HookContext {
            dt,
            time: self.time,
            sdf: self.config.sdf,
            tiles: self.tiles.as_ref(),
            rng: &mut self.rng,
            audio: self.audio.as_mut(),
            backend: self.backend.as_mut(),
        };
        (&mut self.world, ctx)
    }
}

fn begin_play(actor: &mut Actor, ctx: &mut HookContext<'_>) -> Result<()> {
    let Actor {
        state,
        behavior,
        physics,
        ..
    } = actor;
    state.dt = ctx.dt;
    state.t0 = ctx.time;
    state.t1 = ctx.time;
    state.last_position = state.position;
    state.anim.start(ctx.time);

    if let Some(physics) = physics {
        physics.begin_play(state, ctx)?;
    }
    if let Some(behavior) = behavior {
        behavior.begin_play(&mut BehaviorView::new(state), ctx);
    }
    apply_requests(state, ctx);
    actor.in_play = true;
    Ok(())
}

fn end_play(actor: &mut Actor, ctx: &mut HookContext<'_>) {
    if !actor.in_play {
        return;
    }
    if let Some(physics) = actor.physics.as_mut() {
        physics.end_play(&mut actor.state, ctx);
    }
    actor.in_play = false;
}

/// Moves the actor to a position requested by a behavior hook, keeping any
/// rigid body in step.
fn apply_requests(state: &mut ActorState, ctx: &mut HookContext<'_>) {
    let Some(position) = state.requests.position.take() else {
        return;
    };
    state.position = position;
    if let Some(backend) = ctx.backend.as_deref_mut() {
        if backend.has_body(state.id()) {
            if let Err(e) = backend.set_position(state.id(), state.position2d()) {
                log::warn!("{}: {}", state.name, e);
            }
        }
    }
}

fn runs(actor: &Actor) -> bool {
    actor.in_play && actor.state.active
}

/// Overlap records naming actors that no longer exist are dropped.
fn forget_stale_overlaps(actors: &mut [Actor]) {
    let live: HashSet<ActorId> = actors.iter().map(Actor::id).collect();
    for actor in actors.iter_mut() {
        let id = actor.id();
        let record = &mut actor.state.trigger;
        if let Some(other) = record.other {
            if !live.contains(&other) {
                log::debug!("actor {} lost its overlap with removed actor {}", id, other);
                record.clear();
            }
        }
    }
}

fn start_tick(actors: &mut [Actor], ctx: &HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        let state = &mut actor.state;
        state.dt = ctx.dt;
        state.t1 = ctx.time;
        state.anim.update(ctx.dt);
        state.last_position = state.position;
    }
}

fn preupdate(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        if let Some(physics) = actor.physics.as_mut() {
            physics.preupdate(&mut actor.state, ctx);
        }
    }
}

fn update_behaviors(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        if let Some(behavior) = actor.behavior.as_mut() {
            behavior.update(&mut BehaviorView::new(&mut actor.state), ctx);
        }
        apply_requests(&mut actor.state, ctx);
    }
}

fn update_physics(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        let mut integrates = actor.state.movable;
        if let Some(physics) = actor.physics.as_mut() {
            physics.update(&mut actor.state, ctx);
            integrates &= !physics.owns_integration();
        }
        if integrates {
            integrate(&mut actor.state, ctx.dt);
        }
    }
}

fn step_backend(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    let contacts = match ctx.backend.as_deref_mut() {
        Some(backend) => {
            backend.step(ctx.dt);
            backend.drain_contacts()
        }
        None => return,
    };
    for contact in contacts.iter().filter(|c| c.started) {
        let (Some(i), Some(j)) = (
            actors.iter().position(|a| a.id() == contact.a),
            actors.iter().position(|a| a.id() == contact.b),
        ) else {
            continue;
        };
        if i == j {
            continue;
        }
        let (a, b) = pair_mut(actors, i, j);
        notify_contact(a, &b.state, ctx);
        notify_contact(b, &a.state, ctx);
    }
}

fn notify_contact(actor: &mut Actor, other: &ActorState, ctx: &mut HookContext<'_>) {
    let Actor {
        state, behavior, ..
    } = actor;
    let Some(behavior) = behavior else {
        return;
    };
    let mut view = BehaviorView::new(state);
    match other.kind() {
        ActorKind::Dynamic => behavior.on_collide_dynamic(&mut view, other, ctx),
        _ => behavior.on_collide_static(&mut view, other, ctx),
    }
}

fn collide_world(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        if !(actor.state.is_dynamic() && actor.state.clip_to_world) {
            continue;
        }
        let Actor {
            state,
            physics,
            behavior,
            ..
        } = actor;
        let Some(physics) = physics else {
            continue;
        };
        if physics.collide_world(state, ctx) {
            if let Some(behavior) = behavior {
                behavior.on_collide_world(&mut BehaviorView::new(state), ctx);
            }
        }
    }
}

fn collide_pairs(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    let n = actors.len();
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = pair_mut(actors, i, j);
            if !(a.in_play && b.in_play) {
                continue;
            }
            match (a.state.kind(), b.state.kind()) {
                (ActorKind::Dynamic, ActorKind::Dynamic) => {
                    if runs(a) && runs(b) && a.state.overlaps(&b.state) {
                        let before = a.state.clone();
                        collide(a, &b.state, ctx);
                        collide(b, &before, ctx);
                    }
                }
                (ActorKind::Dynamic, ActorKind::Static) => {
                    if runs(a) && runs(b) && a.state.overlaps(&b.state) {
                        collide(a, &b.state, ctx);
                    }
                }
                (ActorKind::Static, ActorKind::Dynamic) => {
                    if runs(a) && runs(b) && b.state.overlaps(&a.state) {
                        collide(b, &a.state, ctx);
                    }
                }
                (ActorKind::Dynamic, ActorKind::Trigger) => update_overlap(a, b, ctx),
                (ActorKind::Trigger, ActorKind::Dynamic) => update_overlap(b, a, ctx),
                _ => {}
            }
        }
    }
    for actor in actors.iter_mut() {
        apply_requests(&mut actor.state, ctx);
    }
}

/// Runs the physics response of `actor` against `other` and, on contact,
/// tells its behavior.
fn collide(actor: &mut Actor, other: &ActorState, ctx: &mut HookContext<'_>) {
    let Actor {
        state,
        physics,
        behavior,
        ..
    } = actor;
    let Some(physics) = physics else {
        return;
    };
    let dynamic = other.is_dynamic();
    let hit = if dynamic {
        physics.collide_dynamic(state, other, ctx)
    } else {
        physics.collide_static(state, other, ctx)
    };
    if !hit {
        return;
    }
    if let Some(behavior) = behavior {
        let mut view = BehaviorView::new(state);
        if dynamic {
            behavior.on_collide_dynamic(&mut view, other, ctx);
        } else {
            behavior.on_collide_static(&mut view, other, ctx);
        }
    }
}

/// Edge-triggered overlap between a dynamic visitor and a trigger. The trigger
/// tracks one visitor at a time.
fn update_overlap(visitor: &mut Actor, trigger: &mut Actor, ctx: &mut HookContext<'_>) {
    let (vid, tid) = (visitor.id(), trigger.id());
    let now = runs(visitor) && runs(trigger) && visitor.state.overlaps(&trigger.state);
    let was = trigger.state.trigger.is_with(vid);

    if now && !was {
        if trigger.state.trigger.overlapping {
            return;
        }
        trigger.state.trigger.begin(vid);
        visitor.state.trigger.begin(tid);
        log::debug!("actor {} began overlapping trigger {}", vid, tid);

        if let Some(behavior) = visitor.behavior.as_mut() {
            behavior.begin_overlap(&mut BehaviorView::new(&mut visitor.state), &trigger.state, ctx);
        }
        if let Some(behavior) = trigger.behavior.as_mut() {
            behavior.begin_trigger_overlap(
                &mut BehaviorView::new(&mut trigger.state),
                &mut BehaviorView::new(&mut visitor.state),
                ctx,
            );
        }
    } else if was && !now {
        trigger.state.trigger.clear();
        if visitor.state.trigger.is_with(tid) {
            visitor.state.trigger.clear();
        }
        log::debug!("actor {} stopped overlapping trigger {}", vid, tid);

        if let Some(behavior) = visitor.behavior.as_mut() {
            behavior.end_overlap(&mut BehaviorView::new(&mut visitor.state), &trigger.state, ctx);
        }
        if let Some(behavior) = trigger.behavior.as_mut() {
            behavior.end_trigger_overlap(
                &mut BehaviorView::new(&mut trigger.state),
                &visitor.state,
                ctx,
            );
        }
    }
}

fn postupdate(actors: &mut [Actor], ctx: &mut HookContext<'_>) {
    for actor in actors.iter_mut().filter(|a| runs(a)) {
        if let Some(physics) = actor.physics.as_mut() {
            physics.postupdate(&mut actor.state, ctx);
        }
        let state = &mut actor.state;
        state.d_position = state.position - state.last_position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TileMap;
    use approx::assert_abs_diff_eq;

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default(), TileMap::new(16, 16).unwrap()).unwrap()
    }

    #[test]
    fn test_accumulator_banks_partial_steps() {
        let mut sim = sim();
        let step = sim.fixed_step();
        assert_eq!(sim.advance(step / 2), 0);
        assert_abs_diff_eq!(sim.interpolation_alpha(), 0.5, epsilon = 1e-3);
        assert_eq!(sim.advance(step / 2), 1);
        assert_eq!(sim.ticks(), 1);
    }

    #[test]
    fn test_one_long_frame_runs_many_ticks() {
        let mut sim = sim();
        let step = sim.fixed_step();
        assert_eq!(sim.advance(step * 5), 5);
        assert_abs_diff_eq!(sim.time(), 5.0 / 60.0, epsilon = 1e-5);
    }

    #[test]
    fn test_velocity_integrates_once_per_tick() {
        let mut sim = sim();
        let id = sim
            .spawn_dynamic(Actor::new("mover").at(1.0, 1.0).with_velocity(6.0, 0.0))
            .unwrap();
        sim.tick();
        let a = sim.actor(id).unwrap();
        assert_abs_diff_eq!(a.state.position.x, 1.1, epsilon = 1e-5);
        assert_abs_diff_eq!(a.state.d_position.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_inactive_actors_stand_still() {
        let mut sim = sim();
        let id = sim
            .spawn_dynamic(Actor::new("idle").with_velocity(6.0, 0.0))
            .unwrap();
        sim.actor_mut(id).unwrap().state.active = false;
        sim.tick();
        assert_eq!(sim.actor(id).unwrap().state.position.x, 0.0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimulationConfig::default().with_updates_per_second(0.0);
        assert!(Simulation::new(config, TileMap::new(1, 1).unwrap()).is_err());
    }

    #[test]
    fn test_teardown_empties_world() {
        let mut sim = sim();
        sim.spawn_dynamic(Actor::new("a")).unwrap();
        sim.spawn_static(Actor::new("b")).unwrap();
        sim.tick();
        sim.teardown();
        assert!(sim.world().is_empty());
        assert_eq!(sim.ticks(), 0);
    }
}
