//! Tile solidity queries and the actor registry.

use crate::actor::{Actor, ActorId, ActorKind};
use crate::error::{GameError, Result};

/// Static level geometry as seen by the simulation: a grid of solid or empty
/// unit tiles.
pub trait TileWorld {
    /// Whether tile `(x, y)` blocks movement. Tiles outside the world are empty.
    fn is_solid(&self, x: i32, y: i32) -> bool;

    /// World size in tiles.
    fn size(&self) -> (u32, u32);
}

/// Row-major grid of solid flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: u32,
    height: u32,
    solid: Vec<bool>,
}

impl TileMap {
    /// Fails when `width * height` does not fit in a `u32`.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let tiles = width
            .checked_mul(height)
            .ok_or(GameError::TileMapTooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            solid: vec![false; tiles as usize],
        })
    }

    /// Builds a map from text rows; `#` marks a solid tile, anything else is empty.
    /// Short rows are padded with empty tiles.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut map = Self::new(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    map.set_solid(x as u32, y as u32, true);
                }
            }
        }
        Ok(map)
    }

    /// A map whose outer ring of tiles is solid.
    pub fn walled(width: u32, height: u32) -> Result<Self> {
        let mut map = Self::new(width, height)?;
        for x in 0..width {
            map.set_solid(x, 0, true);
            map.set_solid(x, height.saturating_sub(1), true);
        }
        for y in 0..height {
            map.set_solid(0, y, true);
            map.set_solid(width.saturating_sub(1), y, true);
        }
        Ok(map)
    }

    pub fn set_solid(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            let index = (y * self.width + x) as usize;
            self.solid[index] = solid;
        }
    }
}

impl TileWorld for TileMap {
    fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        self.solid[(y as u32 * self.width + x as u32) as usize]
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The actors of the current level, in insertion order.
///
/// Only mutated between ticks; the pipeline never inserts or removes while it
/// iterates.
#[derive(Debug, Default)]
pub struct World {
    actors: Vec<Actor>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dynamic_actor(&mut self, actor: Actor) -> Result<ActorId> {
        self.add(actor, ActorKind::Dynamic)
    }

    pub fn add_static_actor(&mut self, actor: Actor) -> Result<ActorId> {
        self.add(actor, ActorKind::Static)
    }

    pub fn add_trigger_actor(&mut self, actor: Actor) -> Result<ActorId> {
        self.add(actor, ActorKind::Trigger)
    }

    /// Classifies `actor` as `kind` and stores it.
    pub fn add(&mut self, mut actor: Actor, kind: ActorKind) -> Result<ActorId> {
        if kind == ActorKind::None {
            return Err(crate::GameError::Unclassified(actor.id()));
        }
        actor.state.classify(kind)?;
        let id = actor.id();
        self.actors.push(actor);
        Ok(id)
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let index = self.index_of(id)?;
        Some(self.actors.remove(index))
    }

    pub fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.iter().position(|a| a.id() == id)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Actors of one classification, in insertion order.
    pub fn of_kind(&self, kind: ActorKind) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(move |a| a.state.kind() == kind)
    }

    pub fn dynamic_actors(&self) -> impl Iterator<Item = &Actor> {
        self.of_kind(ActorKind::Dynamic)
    }

    pub fn static_actors(&self) -> impl Iterator<Item = &Actor> {
        self.of_kind(ActorKind::Static)
    }

    pub fn trigger_actors(&self) -> impl Iterator<Item = &Actor> {
        self.of_kind(ActorKind::Trigger)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Removes every actor, returning them so the caller can run teardown hooks.
    pub fn drain(&mut self) -> Vec<Actor> {
        std::mem::take(&mut self.actors)
    }

    pub(crate) fn actors_mut(&mut self) -> &mut [Actor] {
        &mut self.actors
    }
}

/// Two distinct elements of a slice, mutably.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert!(i != j, "pair_mut needs two distinct indices");
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
