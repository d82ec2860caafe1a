use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::storage::{SaveBlob, StorageError};
use crate::world::BlockPos;

/// Positions flagged as bank blocks (cash deposit and vacuum points).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankBlocks {
    positions: BTreeSet<BlockPos>,
}

impl BankBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the position was already a bank.
    pub fn insert(&mut self, pos: BlockPos) -> bool {
        self.positions.insert(pos)
    }

    pub fn remove(&mut self, pos: BlockPos) -> bool {
        self.positions.remove(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.positions.contains(&pos)
    }

    /// True when `pos` or the block directly below it is a bank.
    pub fn covers(&self, pos: BlockPos) -> bool {
        self.contains(pos) || self.contains(pos.down())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.positions.iter().copied()
    }
}

impl SaveBlob for BankBlocks {
    const KEY: &'static str = "landbaron.banks";

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
