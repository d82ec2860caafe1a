use std::collections::HashSet;

use log::{debug, info, warn};

use super::placement::{find_grave_position, PlacementRules};
use super::types::{GraveRecord, GraveRegistry};
use crate::config::GraveConfig;
use crate::events::EventOutcome;
use crate::logutil::player_name;
use crate::metrics;
use crate::storage::{self, SaveGameStore, StorageError};
use crate::tasks::IntervalGate;
use crate::world::{Actor, BlockPos, ContainerState, HostWorld, ItemStack};

/// What happened to a dead actor's items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeathOutcome {
    pub graves: Vec<BlockPos>,
    /// Stacks that found no grave and were dropped loose.
    pub dropped: Vec<ItemStack>,
}

pub struct GraveSystem {
    rules: PlacementRules,
    protection_ms: u64,
    registry: GraveRegistry,
    cleanup: IntervalGate,
}

impl GraveSystem {
    pub fn new(config: &GraveConfig) -> Self {
        Self {
            rules: PlacementRules::from(config),
            protection_ms: config.protection_ms(),
            registry: GraveRegistry::new(),
            cleanup: IntervalGate::new(config.cleanup_interval_ms),
        }
    }

    pub fn registry(&self) -> &GraveRegistry {
        &self.registry
    }

    pub fn load(&mut self, store: &dyn SaveGameStore) {
        self.registry = storage::load_or_default(store);
        info!("graves loaded: {}", self.registry.len());
    }

    pub fn encode_tables(&self) -> Result<Vec<(&'static str, Vec<u8>)>, StorageError> {
        Ok(vec![storage::encode(&self.registry)?])
    }

    pub fn save(&self, store: &dyn SaveGameStore) -> Result<(), StorageError> {
        storage::save(store, &self.registry)
    }

    /// Bury everything the actor carried, spreading over as many containers as needed.
    pub fn on_actor_death(&mut self, world: &mut dyn HostWorld, actor: &Actor) -> DeathOutcome {
        let mut items = world.take_all_items(&actor.id);
        let mut outcome = DeathOutcome::default();
        if items.is_empty() {
            return outcome;
        }

        let start = actor.position.block_pos();
        let mut used = HashSet::new();
        while !items.is_empty() {
            let Some(placement) = find_grave_position(world, start, &used, &self.rules) else {
                warn!(
                    "no grave space near {} for {}; dropping {} stacks",
                    start,
                    player_name(&actor.name),
                    items.len()
                );
                for stack in items.drain(..) {
                    world.spawn_item(stack.clone(), start.center());
                    outcome.dropped.push(stack);
                }
                metrics::inc_loose_drops();
                world.notify(
                    &actor.id,
                    "No safe place for a grave was found. Some items were dropped.",
                );
                break;
            };

            let pos = placement.pos;
            used.insert(pos);
            let leftover = match world.place_container(pos, items) {
                Ok(leftover) => leftover,
                Err(returned) => {
                    debug!("container refused at {}, trying next cell", pos);
                    items = returned;
                    continue;
                }
            };

            self.registry.insert(
                pos,
                GraveRecord {
                    owner_id: actor.id.clone(),
                    owner_name: actor.name.clone(),
                    created_at_ms: world.elapsed_ms(),
                },
            );
            metrics::inc_graves_placed();
            info!(
                "grave for {} at {} ({:?})",
                player_name(&actor.name),
                pos,
                placement.stage
            );
            world.notify(&actor.id, &format!("Grave created at {}", pos));
            outcome.graves.push(pos);
            items = leftover;
        }
        outcome
    }

    /// Fresh graves only open for their owner.
    pub fn on_block_use(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        pos: BlockPos,
    ) -> EventOutcome {
        let Some(record) = self.registry.get(pos) else {
            return EventOutcome::Continue;
        };
        if record.owner_id == actor.id {
            return EventOutcome::Continue;
        }
        let left_ms = record.protection_left_ms(world.elapsed_ms(), self.protection_ms);
        if left_ms == 0 {
            return EventOutcome::Continue;
        }
        let message = format!(
            "Grave of {}. Protected for {} min.",
            record.owner_name,
            left_ms / 60_000
        );
        world.notify(&actor.id, &message);
        EventOutcome::Cancel
    }

    pub fn on_block_break(&mut self, pos: BlockPos) -> EventOutcome {
        if let Some(record) = self.registry.remove(pos) {
            debug!("grave of {} at {} broken", player_name(&record.owner_name), pos);
        }
        EventOutcome::Continue
    }

    /// Advance the cleanup gate; sweeps when it fires. Returns graves forgotten.
    pub fn on_tick(&mut self, world: &mut dyn HostWorld, dt_ms: u64) -> usize {
        if !self.cleanup.advance(dt_ms) {
            return 0;
        }
        self.sweep(world)
    }

    /// Forget graves whose container is gone, and clear the ones left empty.
    pub fn sweep(&mut self, world: &mut dyn HostWorld) -> usize {
        let mut removed = 0;
        for pos in self.registry.positions() {
            match world.container_state(pos) {
                ContainerState::Unloaded | ContainerState::Occupied => continue,
                ContainerState::Missing => {}
                ContainerState::Empty => world.clear_block(pos),
            }
            self.registry.remove(pos);
            metrics::inc_graves_cleared();
            removed += 1;
        }
        if removed > 0 {
            debug!("grave sweep removed {}", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MemoryWorld, Vec3};

    fn system() -> GraveSystem {
        GraveSystem::new(&GraveConfig::default())
    }

    fn victim(world: &mut MemoryWorld, stacks: u32) -> Actor {
        let actor = Actor::player("uid-v", "Victim", Vec3::new(10.5, 20.0, 10.5));
        world.add_actor(actor.clone());
        for n in 0..stacks {
            world.give_stack(&actor.id, ItemStack::new(&format!("game:item-{}", n), 1));
        }
        actor
    }

    #[test]
    fn overflow_spills_into_second_grave() {
        let mut world = MemoryWorld::new();
        world.container_slots = 4;
        let actor = victim(&mut world, 6);
        let mut graves = system();

        let outcome = graves.on_actor_death(&mut world, &actor);
        assert_eq!(
            outcome.graves,
            vec![BlockPos::new(10, 20, 10), BlockPos::new(10, 21, 10)]
        );
        assert!(outcome.dropped.is_empty());
        assert_eq!(graves.registry().len(), 2);
        assert_eq!(world.containers[&BlockPos::new(10, 21, 10)].len(), 2);
    }

    #[test]
    fn nothing_to_bury_places_nothing() {
        let mut world = MemoryWorld::new();
        let actor = victim(&mut world, 0);
        assert_eq!(system().on_actor_death(&mut world, &actor), DeathOutcome::default());
        assert!(world.containers.is_empty());
    }

    #[test]
    fn refused_container_moves_to_next_cell() {
        let mut world = MemoryWorld::new();
        let actor = victim(&mut world, 1);
        world.broken_containers.insert(BlockPos::new(10, 20, 10));
        let outcome = system().on_actor_death(&mut world, &actor);
        assert_eq!(outcome.graves, vec![BlockPos::new(10, 21, 10)]);
    }

    #[test]
    fn protection_blocks_strangers_until_expiry() {
        let mut world = MemoryWorld::new();
        let actor = victim(&mut world, 1);
        let mut graves = system();
        world.elapsed_ms = 1_000;
        let pos = graves.on_actor_death(&mut world, &actor).graves[0];

        let thief = Actor::player("uid-t", "Thief", Vec3::default());
        world.elapsed_ms = 1_000 + 5 * 60_000;
        assert_eq!(graves.on_block_use(&mut world, &thief, pos), EventOutcome::Cancel);
        assert_eq!(
            world.messages_for(&thief.id),
            vec!["Grave of Victim. Protected for 10 min."]
        );
        assert_eq!(graves.on_block_use(&mut world, &actor, pos), EventOutcome::Continue);

        world.elapsed_ms = 1_000 + 15 * 60_000;
        assert_eq!(graves.on_block_use(&mut world, &thief, pos), EventOutcome::Continue);
    }

    #[test]
    fn sweep_clears_empty_and_missing_graves() {
        let mut world = MemoryWorld::new();
        let actor = victim(&mut world, 1);
        let mut graves = system();
        let pos = graves.on_actor_death(&mut world, &actor).graves[0];

        world.unloaded.insert(pos);
        world.containers.insert(pos, Vec::new());
        assert_eq!(graves.sweep(&mut world), 0);

        world.unloaded.clear();
        assert_eq!(graves.on_tick(&mut world, 999), 0);
        assert_eq!(graves.on_tick(&mut world, 1), 1);
        assert!(graves.registry().is_empty());
        assert!(!world.containers.contains_key(&pos));
    }
}
