//! The simulated entity: spatial state, sprite and animation state, and four
//! optional capability slots.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{IVec2, Vec3};

use crate::animation::AnimationState;
use crate::components::{BehaviorComponent, GraphicsComponent, InputComponent, PhysicsComponent};
use crate::math::{PixelTransform, Transform3D, Vec2};
use crate::render::Flip;
use crate::sdf::{self, BoxShape, SdfParams};

static NEXT_ACTOR_ID: AtomicU32 = AtomicU32::new(1);

/// Unique identity of an actor. Assigned at construction, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(u32);

impl ActorId {
    fn next() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collision classification. Set once when the actor is added to a world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActorKind {
    #[default]
    None,
    Dynamic,
    Static,
    Trigger,
}

/// Which sprite an actor shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteInfo {
    pub tileset: u32,
    pub id: u32,
    pub flip: Flip,
}

/// Overlap record kept by trigger actors (and mirrored on their visitors).
///
/// `other` is an identity, not a handle: it may name an actor that has since
/// been removed, in which case lookups fail and the overlap is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerInfo {
    pub overlapping: bool,
    pub other: Option<ActorId>,
}

impl TriggerInfo {
    pub fn begin(&mut self, other: ActorId) {
        self.overlapping = true;
        self.other = Some(other);
    }

    pub fn clear(&mut self) {
        self.overlapping = false;
        self.other = None;
    }

    pub fn is_with(&self, other: ActorId) -> bool {
        self.overlapping && self.other == Some(other)
    }
}

/// Control intent written by the input capability.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Intent {
    /// Raw axis values from the last input poll.
    pub axis: Vec2,
    /// A jump has been spent and not yet restored by landing.
    pub jumped: bool,
}

/// Changes requested by behavior hooks, applied by the pipeline at phase end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Requests {
    pub(crate) position: Option<Vec3>,
    pub(crate) despawn: bool,
}

/// Everything about an actor except its capabilities.
///
/// `position` is the center of the box. Only physics-response hooks and the
/// pipeline receive `&mut ActorState`; behaviors go through
/// [`BehaviorView`](crate::components::BehaviorView) and renderers get `&ActorState`.
#[derive(Clone, Debug)]
pub struct ActorState {
    id: ActorId,
    pub name: String,
    kind: ActorKind,

    pub position: Vec3,
    pub last_position: Vec3,
    /// Movement over the last tick.
    pub d_position: Vec3,
    size: Vec3,
    pub velocity: Vec3,
    /// Speed limit applied during integration.
    pub max_speed: f32,

    pub visible: bool,
    /// Inactive actors skip update, physics and drawing.
    pub active: bool,
    pub movable: bool,
    /// Whether the actor is tested against solid tiles.
    pub clip_to_world: bool,

    pub sprite: SpriteInfo,
    pub anim: AnimationState,
    /// Named sequences selectable with [`switch_anim`](Self::switch_anim).
    pub anims: Vec<AnimationState>,
    pub trigger: TriggerInfo,
    pub intent: Intent,
    pub transform3d: Transform3D,

    /// Length of the current tick in seconds.
    pub dt: f32,
    /// Time the actor entered play.
    pub t0: f32,
    /// Current simulation time.
    pub t1: f32,

    pub(crate) requests: Requests,
}

impl ActorState {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::next(),
            name: name.into(),
            kind: ActorKind::None,
            position: Vec3::ZERO,
            last_position: Vec3::ZERO,
            d_position: Vec3::ZERO,
            size: Vec3::ONE,
            velocity: Vec3::ZERO,
            max_speed: f32::INFINITY,
            visible: true,
            active: true,
            movable: true,
            clip_to_world: true,
            sprite: SpriteInfo::default(),
            anim: AnimationState::default(),
            anims: Vec::new(),
            trigger: TriggerInfo::default(),
            intent: Intent::default(),
            transform3d: Transform3D::default(),
            dt: 0.0,
            t0: 0.0,
            t1: 0.0,
            requests: Requests::default(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == ActorKind::Dynamic
    }

    pub fn is_static(&self) -> bool {
        self.kind == ActorKind::Static
    }

    pub fn is_trigger(&self) -> bool {
        self.kind == ActorKind::Trigger
    }

    pub(crate) fn classify(&mut self, kind: ActorKind) -> crate::Result<()> {
        if self.kind != ActorKind::None {
            return Err(crate::GameError::AlreadyClassified {
                id: self.id,
                kind: self.kind,
            });
        }
        self.kind = kind;
        Ok(())
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Sets the extents; negative components are clamped to zero.
    pub fn set_size(&mut self, size: Vec3) {
        self.size = size.max(Vec3::ZERO);
    }

    pub fn min(&self) -> Vec3 {
        self.position - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.position + self.size * 0.5
    }

    pub fn position2d(&self) -> Vec2 {
        Vec2::from_xy(self.position)
    }

    pub fn size2d(&self) -> Vec2 {
        Vec2::from_xy(self.size)
    }

    pub fn velocity2d(&self) -> Vec2 {
        Vec2::from_xy(self.velocity)
    }

    pub fn set_position2d(&mut self, p: Vec2) {
        self.position.x = p.x;
        self.position.y = p.y;
    }

    pub fn set_velocity2d(&mut self, v: Vec2) {
        self.velocity.x = v.x;
        self.velocity.y = v.y;
    }

    /// The actor's footprint in the xy plane.
    pub fn shape(&self) -> BoxShape {
        BoxShape::from_center_size(self.position2d(), self.size2d())
    }

    pub fn signed_distance(&self, p: Vec2, radius: f32) -> f32 {
        self.shape().signed_distance(p, radius)
    }

    pub fn support(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        self.shape().support(p, params)
    }

    pub fn normal(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        self.shape().normal(p, params)
    }

    pub fn tangent(&self, p: Vec2, params: &SdfParams) -> Vec2 {
        self.shape().tangent(p, params)
    }

    /// Signed gap to `other`; negative while the two interpenetrate.
    pub fn touching(&self, other: &ActorState, params: &SdfParams) -> f32 {
        sdf::touching(&self.shape(), &other.shape(), params)
    }

    /// Broad-phase test: inclusive overlap of the 3D bounding boxes.
    pub fn overlaps(&self, other: &ActorState) -> bool {
        sdf::aabb_overlap(self.min(), self.max(), other.min(), other.max())
    }

    /// Whether `p` lies within the bounding box, boundary included.
    pub fn contains_point(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// Sets the main sprite and makes it the base frame of the current animation.
    pub fn set_sprite(&mut self, tileset: u32, id: u32) {
        self.sprite.tileset = tileset;
        self.sprite.id = id;
        self.anim.base = id as i32;
    }

    /// Makes sequence `index` current and restarts it at the current time.
    /// Returns false when there is no such sequence.
    pub fn switch_anim(&mut self, index: usize) -> bool {
        match self.anims.get(index) {
            Some(seq) => {
                self.anim = *seq;
                self.anim.start(self.t1);
                true
            }
            None => false,
        }
    }

    /// Restarts the current animation at the current time.
    pub fn restart_anim(&mut self) {
        self.anim.start(self.t1);
    }

    /// Upper-left pixel of the actor.
    pub fn pixel_position(&self, transform: &PixelTransform) -> IVec2 {
        transform.world_to_pixel(Vec2::from_xy(self.min()))
    }

    pub fn pixel_size(&self, transform: &PixelTransform) -> IVec2 {
        transform.scale(self.size2d())
    }

    pub fn pixel_center(&self, transform: &PixelTransform) -> IVec2 {
        transform.world_to_pixel(self.position2d())
    }
}

/// An actor together with its capability slots. Any slot may be empty.
pub struct Actor {
    pub state: ActorState,
    pub(crate) input: Option<Box<dyn InputComponent>>,
    pub(crate) behavior: Option<Box<dyn BehaviorComponent>>,
    pub(crate) physics: Option<Box<dyn PhysicsComponent>>,
    pub(crate) graphics: Option<Box<dyn GraphicsComponent>>,
    pub(crate) in_play: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: ActorState::new(name),
            input: None,
            behavior: None,
            physics: None,
            graphics: None,
            in_play: false,
        }
    }

    pub fn id(&self) -> ActorId {
        self.state.id
    }

    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.state.position = Vec3::new(x, y, 0.0);
        self.state.last_position = self.state.position;
        self
    }

    #[must_use]
    pub fn with_size(mut self, w: f32, h: f32) -> Self {
        self.state.set_size(Vec3::new(w, h, 1.0));
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.state.velocity = Vec3::new(vx, vy, 0.0);
        self
    }

    #[must_use]
    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.state.max_speed = speed;
        self
    }

    #[must_use]
    pub fn with_sprite(mut self, tileset: u32, id: u32) -> Self {
        self.state.set_sprite(tileset, id);
        self
    }

    #[must_use]
    pub fn with_anim(mut self, anim: AnimationState) -> Self {
        self.state.anim = anim;
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: impl InputComponent + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: impl BehaviorComponent + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    #[must_use]
    pub fn with_physics(mut self, physics: impl PhysicsComponent + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }

    #[must_use]
    pub fn with_graphics(mut self, graphics: impl GraphicsComponent + 'static) -> Self {
        self.graphics = Some(Box::new(graphics));
        self
    }

    pub fn behavior(&self) -> Option<&dyn BehaviorComponent> {
        self.behavior.as_deref()
    }

    pub fn physics(&self) -> Option<&dyn PhysicsComponent> {
        self.physics.as_deref()
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    pub fn has_graphics(&self) -> bool {
        self.graphics.is_some()
    }

    /// Whether begin-play has run for this actor.
    pub fn in_play(&self) -> bool {
        self.in_play
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("state", &self.state)
            .field("input", &self.input.is_some())
            .field("behavior", &self.behavior.is_some())
            .field("physics", &self.physics.is_some())
            .field("graphics", &self.graphics.is_some())
            .finish()
    }
}
