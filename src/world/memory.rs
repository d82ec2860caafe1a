//! In-memory [`HostWorld`] used by the tests and the offline admin CLI.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    Actor, ActorId, BlockClass, BlockPos, ContainerState, DroppedItem, EntityId, HostWorld,
    ItemStack, Vec3,
};

pub const DEFAULT_MAP_HEIGHT: i32 = 256;
pub const DEFAULT_CONTAINER_SLOTS: usize = 16;
pub const DEFAULT_INVENTORY_SLOTS: usize = 36;

/// A tiny, fully observable world. Unset blocks are air.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    pub elapsed_ms: u64,
    pub map_height: i32,
    pub blocks: HashMap<BlockPos, BlockClass>,
    pub containers: HashMap<BlockPos, Vec<ItemStack>>,
    pub container_slots: usize,
    /// Positions where the host fails to create a container block entity.
    pub broken_containers: HashSet<BlockPos>,
    pub unloaded: HashSet<BlockPos>,
    pub items: BTreeMap<EntityId, DroppedItem>,
    pub actors: Vec<Actor>,
    pub inventories: HashMap<ActorId, Vec<ItemStack>>,
    pub inventory_slots: usize,
    pub hands: HashMap<ActorId, ItemStack>,
    pub messages: Vec<(ActorId, String)>,
    pub published_balances: HashMap<ActorId, u64>,
    next_entity: EntityId,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self {
            elapsed_ms: 0,
            map_height: DEFAULT_MAP_HEIGHT,
            blocks: HashMap::new(),
            containers: HashMap::new(),
            container_slots: DEFAULT_CONTAINER_SLOTS,
            broken_containers: HashSet::new(),
            unloaded: HashSet::new(),
            items: BTreeMap::new(),
            actors: Vec::new(),
            inventories: HashMap::new(),
            inventory_slots: DEFAULT_INVENTORY_SLOTS,
            hands: HashMap::new(),
            messages: Vec::new(),
            published_balances: HashMap::new(),
            next_entity: 1,
        }
    }

    pub fn set_block(&mut self, pos: BlockPos, class: BlockClass) {
        self.blocks.insert(pos, class);
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.inventories.entry(actor.id.clone()).or_default();
        self.actors.push(actor);
    }

    pub fn remove_actor(&mut self, id: &ActorId) {
        self.actors.retain(|actor| &actor.id != id);
    }

    pub fn hold(&mut self, actor: &ActorId, stack: ItemStack) {
        self.hands.insert(actor.clone(), stack);
    }

    pub fn drop_item(&mut self, stack: ItemStack, at: Vec3) -> EntityId {
        let id = self.next_entity;
        self.next_entity += 1;
        self.items.insert(
            id,
            DroppedItem {
                id,
                stack,
                position: at,
                alive: true,
            },
        );
        id
    }

    pub fn messages_for(&self, actor: &ActorId) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(to, _)| to == actor)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    pub fn inventory_count(&self, actor: &ActorId, code: &str) -> u32 {
        self.inventories
            .get(actor)
            .map(|stacks| {
                stacks
                    .iter()
                    .filter(|stack| stack.code == code)
                    .map(|stack| stack.quantity)
                    .sum()
            })
            .unwrap_or(0)
    }
}

impl HostWorld for MemoryWorld {
    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    fn map_size_y(&self) -> i32 {
        self.map_height
    }

    fn block_class(&self, pos: BlockPos) -> BlockClass {
        self.blocks.get(&pos).copied().unwrap_or(BlockClass::Air)
    }

    fn clear_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
        self.containers.remove(&pos);
    }

    fn place_container(
        &mut self,
        pos: BlockPos,
        items: Vec<ItemStack>,
    ) -> Result<Vec<ItemStack>, Vec<ItemStack>> {
        if self.broken_containers.contains(&pos) {
            return Err(items);
        }
        let mut stored = Vec::new();
        let mut leftover = Vec::new();
        for stack in items {
            if stored.len() < self.container_slots {
                stored.push(stack);
            } else {
                leftover.push(stack);
            }
        }
        self.blocks.insert(pos, BlockClass::Solid);
        self.containers.insert(pos, stored);
        Ok(leftover)
    }

    fn container_state(&self, pos: BlockPos) -> ContainerState {
        if self.unloaded.contains(&pos) {
            return ContainerState::Unloaded;
        }
        match self.containers.get(&pos) {
            None => ContainerState::Missing,
            Some(stacks) if stacks.is_empty() => ContainerState::Empty,
            Some(_) => ContainerState::Occupied,
        }
    }

    fn spawn_item(&mut self, stack: ItemStack, at: Vec3) {
        self.drop_item(stack, at);
    }

    fn dropped_items(&self) -> Vec<DroppedItem> {
        self.items.values().cloned().collect()
    }

    fn despawn(&mut self, entity: EntityId) {
        self.items.remove(&entity);
    }

    fn online_actors(&self) -> Vec<Actor> {
        self.actors.clone()
    }

    fn give_stack(&mut self, actor: &ActorId, stack: ItemStack) -> bool {
        let slots = self.inventory_slots;
        let inventory = self.inventories.entry(actor.clone()).or_default();
        if let Some(existing) = inventory.iter_mut().find(|s| s.code == stack.code) {
            existing.quantity += stack.quantity;
            return true;
        }
        if inventory.len() >= slots {
            return false;
        }
        inventory.push(stack);
        true
    }

    fn take_from_hand(&mut self, actor: &ActorId, code: &str, max: u32) -> u32 {
        let Some(held) = self.hands.get_mut(actor) else {
            return 0;
        };
        if !held.code.contains(code) {
            return 0;
        }
        let taken = held.quantity.min(max);
        held.quantity -= taken;
        if held.quantity == 0 {
            self.hands.remove(actor);
        }
        taken
    }

    fn take_all_items(&mut self, actor: &ActorId) -> Vec<ItemStack> {
        let mut items = self
            .inventories
            .get_mut(actor)
            .map(std::mem::take)
            .unwrap_or_default();
        if let Some(held) = self.hands.remove(actor) {
            items.push(held);
        }
        items
    }

    fn notify(&mut self, actor: &ActorId, message: &str) {
        self.messages.push((actor.clone(), message.to_string()));
    }

    fn publish_balance(&mut self, actor: &ActorId, balance: u64) {
        self.published_balances.insert(actor.clone(), balance);
    }
}
