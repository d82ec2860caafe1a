//! Safe-cell search for grave containers.
//!
//! The search prefers the death cell, then climbs straight up, then sweeps a small
//! cube around the death cell. The first safe cell wins.

use std::collections::HashSet;

use crate::config::GraveConfig;
use crate::world::{BlockPos, HostWorld};

/// Which stage of the search produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStage {
    Exact,
    /// Number of cells climbed above the death cell.
    StepUp(u32),
    CubeScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: BlockPos,
    pub stage: PlacementStage,
}

/// Search extents, taken from [`GraveConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRules {
    pub step_up_cells: u32,
    pub scan_radius: i32,
    pub scan_below: i32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self::from(&GraveConfig::default())
    }
}

impl From<&GraveConfig> for PlacementRules {
    fn from(config: &GraveConfig) -> Self {
        Self {
            step_up_cells: config.step_up_cells,
            scan_radius: config.scan_radius,
            scan_below: config.scan_below,
        }
    }
}

/// A cell can take a container when it was not used yet, lies inside the vertical
/// world bounds and holds nothing solid.
pub fn is_spot_safe(world: &dyn HostWorld, pos: BlockPos, used: &HashSet<BlockPos>) -> bool {
    if used.contains(&pos) {
        return false;
    }
    if pos.y < 1 || pos.y >= world.map_size_y() {
        return false;
    }
    world.block_class(pos).accepts_container()
}

pub fn find_grave_position(
    world: &dyn HostWorld,
    start: BlockPos,
    used: &HashSet<BlockPos>,
    rules: &PlacementRules,
) -> Option<Placement> {
    if is_spot_safe(world, start, used) {
        return Some(Placement {
            pos: start,
            stage: PlacementStage::Exact,
        });
    }

    let mut up = start;
    for climbed in 1..=rules.step_up_cells {
        up = up.up();
        if is_spot_safe(world, up, used) {
            return Some(Placement {
                pos: up,
                stage: PlacementStage::StepUp(climbed),
            });
        }
    }

    let r = rules.scan_radius;
    for dx in -r..=r {
        for dy in -rules.scan_below..=r {
            for dz in -r..=r {
                let pos = start.offset(dx, dy, dz);
                if is_spot_safe(world, pos, used) {
                    return Some(Placement {
                        pos,
                        stage: PlacementStage::CubeScan,
                    });
                }
            }
        }
    }
    None
}
