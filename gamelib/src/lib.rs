//! GameLib - runtime core for 2D action games.
//!
//! Actors carry optional input, behavior, physics and graphics capabilities.
//! A fixed-timestep [`Simulation`] drives them and resolves contacts with a
//! signed-distance collision kernel over axis-aligned boxes. Rendering, audio
//! and the rigid-body backend sit behind small interfaces the host provides.

pub mod actor;
pub mod animation;
pub mod audio;
pub mod backend;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod pipeline;
pub mod render;
pub mod sdf;
pub mod world;

pub use crate::actor::{Actor, ActorId, ActorKind, ActorState, Intent, SpriteInfo, TriggerInfo};
pub use crate::animation::{AnimMode, AnimationState};
pub use crate::audio::{AudioSink, ClipLog, NullAudio};
pub use crate::backend::{BodyDesc, BodyKind, PhysicsBackend};
pub use crate::components::{
    BehaviorComponent, BehaviorView, DebugGraphics, FoodBehavior, GraphicsComponent, HookContext,
    InputComponent, InputView, NewtonPhysics, PhysicsComponent, PlayerBehavior, PlayerInput,
    RigidBodyPhysics, SimplePhysics, SpriteGraphics,
};
pub use crate::config::SimulationConfig;
pub use crate::error::{GameError, Result};
pub use crate::input::{Controls, InputMap, InputState};
pub use crate::math::{PixelTransform, Transform3D, Vec2};
pub use crate::pipeline::Simulation;
pub use crate::render::{CommandBuffer, DrawCommand, Flip, Renderer};
pub use crate::sdf::{BoxShape, SdfParams};
pub use crate::world::{TileMap, TileWorld, World};
pub use winit::keyboard::KeyCode;

#[cfg(feature = "audio")]
pub use crate::audio::RodioAudio;
