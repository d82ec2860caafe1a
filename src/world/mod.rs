//! Host-facing world model.
//!
//! Everything in this crate talks to the game through [`HostWorld`]. The host owns
//! blocks, entities and inventories; the mods only keep bookkeeping keyed by the
//! small value types defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod memory;

pub use memory::MemoryWorld;

/// Stable player identifier (the host's player UID).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Privilege level of an actor as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Admin,
}

/// An online actor snapshot handed to the mods by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub role: Role,
    pub position: Vec3,
    pub creative: bool,
}

impl Actor {
    pub fn player(id: &str, name: &str, position: Vec3) -> Self {
        Self {
            id: ActorId::from(id),
            name: name.to_string(),
            role: Role::Player,
            position,
            creative: false,
        }
    }

    pub fn admin(id: &str, name: &str, position: Vec3) -> Self {
        Self {
            role: Role::Admin,
            ..Self::player(id, name, position)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Integer block coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Centre of the block, where loose items are spawned.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f64 + 0.5,
            self.y as f64 + 0.5,
            self.z as f64 + 0.5,
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Continuous entity position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Block containing this point (floors every axis).
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub code: String,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(code: &str, quantity: u32) -> Self {
        Self {
            code: code.to_string(),
            quantity,
        }
    }
}

pub type EntityId = u64;

/// A loose item entity lying in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub id: EntityId,
    pub stack: ItemStack,
    pub position: Vec3,
    pub alive: bool,
}

/// Terrain classification used by placement decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockClass {
    Air,
    /// Anything the host reports as replaceable by a container (tall grass, loose debris).
    Replaceable,
    Plant,
    Snow,
    Water,
    Solid,
}

impl BlockClass {
    pub fn accepts_container(self) -> bool {
        !matches!(self, BlockClass::Solid)
    }
}

/// What the host currently has at a remembered container position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// The chunk holding the position is not loaded; nothing can be decided.
    Unloaded,
    /// No container block entity exists there any more.
    Missing,
    Empty,
    Occupied,
}

/// Collaborator interface implemented by the game host.
///
/// All calls happen on the simulation thread.
pub trait HostWorld {
    /// Milliseconds of world time since server start.
    fn elapsed_ms(&self) -> u64;

    /// Exclusive upper bound of valid block `y` coordinates.
    fn map_size_y(&self) -> i32;

    fn block_class(&self, pos: BlockPos) -> BlockClass;

    /// Replace the block at `pos` with air.
    fn clear_block(&mut self, pos: BlockPos);

    /// Place a container block at `pos` and fill it with `items`.
    ///
    /// `Ok` carries the stacks that did not fit. `Err` hands every stack back untouched
    /// when no container block entity could be created there.
    fn place_container(
        &mut self,
        pos: BlockPos,
        items: Vec<ItemStack>,
    ) -> Result<Vec<ItemStack>, Vec<ItemStack>>;

    fn container_state(&self, pos: BlockPos) -> ContainerState;

    fn spawn_item(&mut self, stack: ItemStack, at: Vec3);

    fn dropped_items(&self) -> Vec<DroppedItem>;

    fn despawn(&mut self, entity: EntityId);

    fn online_actors(&self) -> Vec<Actor>;

    /// Try to put a stack into the actor's inventory; false when it does not fit.
    fn give_stack(&mut self, actor: &ActorId, stack: ItemStack) -> bool;

    /// Remove up to `max` items whose code contains `code` from the actor's active
    /// hand slot. Returns how many were taken.
    fn take_from_hand(&mut self, actor: &ActorId, code: &str, max: u32) -> u32;

    /// Empty every inventory the actor carries (creative inventories excluded).
    fn take_all_items(&mut self, actor: &ActorId) -> Vec<ItemStack>;

    fn notify(&mut self, actor: &ActorId, message: &str);

    /// Mirror the actor's balance to any client-visible attribute the host keeps.
    fn publish_balance(&mut self, _actor: &ActorId, _balance: u64) {}

    fn find_online(&self, name: &str) -> Option<Actor> {
        self.online_actors()
            .into_iter()
            .find(|actor| actor.name.eq_ignore_ascii_case(name))
    }

    fn actor_by_id(&self, id: &ActorId) -> Option<Actor> {
        self.online_actors().into_iter().find(|actor| &actor.id == id)
    }
}
