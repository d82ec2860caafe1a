use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::{SaveBlob, StorageError};
use crate::world::{ActorId, BlockPos};

/// Who a grave container belongs to and when it was dug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveRecord {
    pub owner_id: ActorId,
    pub owner_name: String,
    /// World time (`HostWorld::elapsed_ms`) at creation.
    pub created_at_ms: u64,
}

impl GraveRecord {
    /// Remaining protection in milliseconds at `now_ms`; zero once expired.
    pub fn protection_left_ms(&self, now_ms: u64, protection_ms: u64) -> u64 {
        let age = now_ms.saturating_sub(self.created_at_ms);
        protection_ms.saturating_sub(age)
    }
}

/// Grave records keyed by container position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraveRegistry {
    graves: BTreeMap<BlockPos, GraveRecord>,
}

impl GraveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pos: BlockPos, record: GraveRecord) {
        self.graves.insert(pos, record);
    }

    pub fn get(&self, pos: BlockPos) -> Option<&GraveRecord> {
        self.graves.get(&pos)
    }

    pub fn remove(&mut self, pos: BlockPos) -> Option<GraveRecord> {
        self.graves.remove(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.graves.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.graves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graves.is_empty()
    }

    pub fn positions(&self) -> Vec<BlockPos> {
        self.graves.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, &GraveRecord)> {
        self.graves.iter().map(|(pos, record)| (*pos, record))
    }
}

impl SaveBlob for GraveRegistry {
    const KEY: &'static str = "graves.records";

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        let entries: Vec<(BlockPos, &GraveRecord)> = self.iter().collect();
        Ok(bincode::serialize(&entries)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let entries: Vec<(BlockPos, GraveRecord)> = bincode::deserialize(bytes)?;
        Ok(Self {
            graves: entries.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(at: u64) -> GraveRecord {
        GraveRecord {
            owner_id: ActorId::from("uid-1"),
            owner_name: "Digger".to_string(),
            created_at_ms: at,
        }
    }

    #[test]
    fn protection_counts_down_to_zero() {
        let grave = record(1_000);
        assert_eq!(grave.protection_left_ms(1_000, 900_000), 900_000);
        assert_eq!(grave.protection_left_ms(61_000, 900_000), 840_000);
        assert_eq!(grave.protection_left_ms(2_000_000, 900_000), 0);
    }

    #[test]
    fn bincode_blob_restores_records() {
        let mut registry = GraveRegistry::new();
        registry.insert(BlockPos::new(-4, 62, 17), record(5));
        registry.insert(BlockPos::new(3, 1, 0), record(9));
        let bytes = registry.to_bytes().expect("encode");
        assert_eq!(GraveRegistry::from_bytes(&bytes).expect("decode"), registry);
        assert!(GraveRegistry::from_bytes(&[0xff, 0x01]).is_err());
    }
}
