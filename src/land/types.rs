use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::world::{ActorId, BlockPos};

/// Horizontal edge length of a chunk, the unit of land ownership.
pub const CHUNK_SIZE: i32 = 32;

/// Packed `(chunk_x, chunk_z)` pair.
///
/// Chunk coordinates are floored, so block `-1` lives in chunk `-1` rather than
/// sharing chunk `0` with block `0`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChunkKey(i64);

impl ChunkKey {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self(((chunk_x as i64) << 32) | (chunk_z as u32 as i64))
    }

    pub fn from_block(pos: BlockPos) -> Self {
        Self::new(pos.x.div_euclid(CHUNK_SIZE), pos.z.div_euclid(CHUNK_SIZE))
    }

    pub fn x(self) -> i32 {
        (self.0 >> 32) as i32
    }

    pub fn z(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x(), self.z())
    }
}

/// Ownership record over one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub owner_id: ActorId,
    pub owner_name: String,
    #[serde(default)]
    pub allowed_ids: BTreeSet<ActorId>,
    #[serde(default)]
    pub public_access: bool,
    /// Asking price when listed; `None` when not for sale.
    #[serde(default)]
    pub sale_price: Option<u64>,
}

impl Claim {
    pub fn new(owner_id: ActorId, owner_name: &str) -> Self {
        Self {
            owner_id,
            owner_name: owner_name.to_string(),
            allowed_ids: BTreeSet::new(),
            public_access: false,
            sale_price: None,
        }
    }

    pub fn is_owner(&self, actor: &ActorId) -> bool {
        &self.owner_id == actor
    }

    pub fn is_member(&self, actor: &ActorId) -> bool {
        self.is_owner(actor) || self.allowed_ids.contains(actor)
    }

    pub fn for_sale(&self) -> bool {
        self.sale_price.is_some()
    }
}

/// Chunk pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub base_cost: u64,
    pub multiplier: f64,
}

impl Pricing {
    /// Cost of the next unclaimed chunk for someone already holding `owned` chunks.
    pub fn chunk_cost(&self, owned: usize) -> u64 {
        let exponent = i32::try_from(owned).unwrap_or(i32::MAX);
        (self.base_cost as f64 * self.multiplier.powi(exponent)).floor() as u64
    }
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub chunk: ChunkKey,
    pub cost: u64,
    /// Previous owner when the chunk was bought from a sale listing.
    pub seller: Option<ActorId>,
}
