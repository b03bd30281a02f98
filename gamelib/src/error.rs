use thiserror::Error;

use crate::actor::{ActorId, ActorKind};

/// Errors surfaced by the runtime core.
#[derive(Debug, Error)]
pub enum GameError {
    /// The rigid-body backend only simulates static and dynamic bodies.
    #[error("rigid-body backend cannot create a body for a {0:?} actor")]
    UnsupportedBodyType(ActorKind),

    #[error("actor {id} is already classified as {kind:?}")]
    AlreadyClassified { id: ActorId, kind: ActorKind },

    #[error("actor {0} must be spawned as dynamic, static or trigger")]
    Unclassified(ActorId),

    #[error("rigid-body physics requested but no backend is attached")]
    MissingBackend,

    #[error("actor {0} has no rigid body")]
    NoBody(ActorId),

    #[error("tile map {width}x{height} is too large")]
    TileMapTooLarge { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed configuration")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
