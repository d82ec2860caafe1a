//! Graves: on death, an actor's items go into containers placed near the body.
//!
//! Fresh graves open only for their owner for a configurable window. A periodic
//! sweep forgets graves whose container was emptied or destroyed.

pub mod placement;
pub mod system;
pub mod types;

pub use placement::{find_grave_position, is_spot_safe, Placement, PlacementRules, PlacementStage};
pub use system::{DeathOutcome, GraveSystem};
pub use types::{GraveRecord, GraveRegistry};
