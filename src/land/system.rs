//! The LandBaron mod: claims, accounts and bank blocks behind one handle.
//!
//! [`LandBaron`] owns every land table and applies host events to them. All methods
//! run on the simulation thread; the only thing that leaves it is the encoded save
//! data produced by [`LandBaron::encode_tables`].

use std::collections::HashMap;

use log::{debug, info, warn};

use super::access::{can_modify, Intent};
use super::bank::BankBlocks;
use super::claims::ClaimRegistry;
use super::errors::LandError;
use super::ledger::LedgerStore;
use super::types::{ChunkKey, Pricing, PurchaseReceipt};
use super::vacuum::{Deposit, VacuumCollector};
use crate::config::Config;
use crate::events::EventOutcome;
use crate::logutil::player_name;
use crate::metrics;
use crate::storage::{self, SaveGameStore, StorageError};
use crate::tasks::IntervalGate;
use crate::world::{Actor, ActorId, BlockPos, HostWorld, ItemStack};

pub struct LandBaron {
    currency_code: String,
    pricing: Pricing,
    claims: ClaimRegistry,
    ledger: LedgerStore,
    banks: BankBlocks,
    vacuum: Option<VacuumCollector>,
    entry_notices: IntervalGate,
    /// Chunk each online actor stood in at the last entry check.
    last_chunk: HashMap<ActorId, ChunkKey>,
}

impl LandBaron {
    pub fn new(config: &Config) -> Self {
        let vacuum = config
            .vacuum
            .enabled
            .then(|| VacuumCollector::new(&config.vacuum, &config.economy.currency_item_code));
        Self {
            currency_code: config.economy.currency_item_code.clone(),
            pricing: config.economy.pricing(),
            claims: ClaimRegistry::new(),
            ledger: LedgerStore::new(),
            banks: BankBlocks::new(),
            vacuum,
            entry_notices: IntervalGate::new(config.economy.entry_notice_ms),
            last_chunk: HashMap::new(),
        }
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn claims(&self) -> &ClaimRegistry {
        &self.claims
    }

    pub fn claims_mut(&mut self) -> &mut ClaimRegistry {
        &mut self.claims
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut LedgerStore {
        &mut self.ledger
    }

    pub fn banks(&self) -> &BankBlocks {
        &self.banks
    }

    pub fn banks_mut(&mut self) -> &mut BankBlocks {
        &mut self.banks
    }

    /// Replace every table with what the save game holds. Missing or corrupt blobs
    /// start empty.
    pub fn load(&mut self, store: &dyn SaveGameStore) {
        self.claims = storage::load_or_default(store);
        self.banks = storage::load_or_default(store);
        self.ledger = storage::load_or_default(store);
        info!(
            "land loaded: {} claims, {} bank blocks, {} accounts",
            self.claims.len(),
            self.banks.len(),
            self.ledger.len()
        );
    }

    /// Encode all three tables without touching the store.
    pub fn encode_tables(&self) -> Result<Vec<(&'static str, Vec<u8>)>, StorageError> {
        Ok(vec![
            storage::encode(&self.claims)?,
            storage::encode(&self.banks)?,
            storage::encode(&self.ledger)?,
        ])
    }

    pub fn save(&self, store: &dyn SaveGameStore) -> Result<(), StorageError> {
        for (name, bytes) in self.encode_tables()? {
            store.store_data(name, &bytes)?;
        }
        Ok(())
    }

    pub fn can_modify(&self, actor: &Actor, pos: BlockPos, intent: Intent) -> bool {
        can_modify(&self.claims, actor, pos, intent)
    }

    pub fn balance(&self, actor: &ActorId) -> u64 {
        self.ledger.balance(actor)
    }

    /// Price `actor` would pay for their next unclaimed chunk.
    pub fn next_chunk_cost(&self, actor: &ActorId) -> u64 {
        self.pricing.chunk_cost(self.claims.owned_count(actor))
    }

    fn publish(&self, world: &mut dyn HostWorld, actor: &ActorId) {
        world.publish_balance(actor, self.ledger.balance(actor));
    }

    // ---- operations -------------------------------------------------------------

    pub fn purchase(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        chunk: ChunkKey,
    ) -> Result<PurchaseReceipt, LandError> {
        let receipt = self.claims.purchase(
            &mut self.ledger,
            &actor.id,
            &actor.name,
            chunk,
            &self.pricing,
        )?;
        self.publish(world, &actor.id);
        match &receipt.seller {
            Some(seller) => {
                metrics::inc_chunks_resold();
                self.publish(world, seller);
                world.notify(
                    seller,
                    &format!(
                        "{} bought your land at {} for {}.",
                        actor.name, chunk, receipt.cost
                    ),
                );
            }
            None => metrics::inc_chunks_purchased(),
        }
        info!(
            "{} claimed chunk {} for {}",
            player_name(&actor.name),
            chunk,
            receipt.cost
        );
        Ok(receipt)
    }

    pub fn list_for_sale(
        &mut self,
        actor: &Actor,
        chunk: ChunkKey,
        price: u64,
    ) -> Result<(), LandError> {
        self.claims.list_for_sale(&actor.id, chunk, price)?;
        debug!("chunk {} listed by {} at {}", chunk, actor.id, price);
        Ok(())
    }

    pub fn abandon(&mut self, actor: &Actor, chunk: ChunkKey) -> Result<(), LandError> {
        self.claims.abandon(&actor.id, chunk)?;
        metrics::inc_chunks_abandoned();
        info!("{} abandoned chunk {}", player_name(&actor.name), chunk);
        Ok(())
    }

    /// Cancel a sale listing. Returns false when the chunk was not listed.
    pub fn unlist(&mut self, actor: &Actor, chunk: ChunkKey) -> Result<bool, LandError> {
        let was_listed = self.claims.unlist(&actor.id, chunk)?;
        debug!("chunk {} unlisted by {} (was listed: {})", chunk, actor.id, was_listed);
        Ok(was_listed)
    }

    /// Give the chunk to another online actor, found by display name.
    pub fn give_land(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        chunk: ChunkKey,
        target_name: &str,
    ) -> Result<Actor, LandError> {
        if !self.claims.get(chunk).is_some_and(|c| c.is_owner(&actor.id)) {
            return Err(LandError::NotOwner);
        }
        let target = world
            .find_online(target_name)
            .ok_or_else(|| LandError::PlayerNotFound(target_name.to_string()))?;
        self.claims.give_to(&actor.id, chunk, &target.id, &target.name)?;
        world.notify(
            &target.id,
            &format!("{} gave you the land at {}.", actor.name, chunk),
        );
        info!(
            "{} gave chunk {} to {}",
            player_name(&actor.name),
            chunk,
            player_name(&target.name)
        );
        Ok(target)
    }

    /// Move currency from the actor's hand into their account.
    pub fn deposit(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        amount: u64,
    ) -> Result<u64, LandError> {
        if amount == 0 {
            return Err(LandError::InvalidAmount);
        }
        let max = u32::try_from(amount).unwrap_or(u32::MAX);
        let taken = u64::from(world.take_from_hand(&actor.id, &self.currency_code, max));
        if taken == 0 {
            return Err(LandError::InvalidTarget(format!(
                "hold {} in your hand",
                self.currency_code
            )));
        }
        self.ledger.credit(&actor.id, taken);
        self.publish(world, &actor.id);
        Ok(taken)
    }

    /// Pay out currency as items. Stacks that do not fit are dropped at the actor.
    pub fn withdraw(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        amount: u64,
    ) -> Result<(), LandError> {
        let quantity = u32::try_from(amount).map_err(|_| LandError::InvalidAmount)?;
        if quantity == 0 {
            return Err(LandError::InvalidAmount);
        }
        if !self.ledger.debit(&actor.id, amount) {
            return Err(LandError::InsufficientFunds {
                needed: amount,
                available: self.ledger.balance(&actor.id),
            });
        }
        let stack = ItemStack::new(&self.currency_code, quantity);
        if !world.give_stack(&actor.id, stack.clone()) {
            world.spawn_item(stack, actor.position);
        }
        self.publish(world, &actor.id);
        Ok(())
    }

    /// Send currency to another online actor by display name.
    pub fn transfer(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        target_name: &str,
        amount: u64,
    ) -> Result<Actor, LandError> {
        if amount == 0 {
            return Err(LandError::InvalidAmount);
        }
        let target = world
            .find_online(target_name)
            .ok_or_else(|| LandError::PlayerNotFound(target_name.to_string()))?;
        if target.id == actor.id {
            return Err(LandError::InvalidTarget(
                "you cannot transfer to yourself".to_string(),
            ));
        }
        if !self.ledger.transfer(&actor.id, &target.id, amount) {
            return Err(LandError::InsufficientFunds {
                needed: amount,
                available: self.ledger.balance(&actor.id),
            });
        }
        self.publish(world, &actor.id);
        self.publish(world, &target.id);
        world.notify(
            &target.id,
            &format!("You received {} from {}.", amount, actor.name),
        );
        Ok(target)
    }

    // ---- host events ------------------------------------------------------------

    /// Using a bank block shows the balance; other blocks need interact access.
    pub fn on_block_use(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        pos: BlockPos,
    ) -> EventOutcome {
        if self.banks.contains(pos) {
            let balance = self.ledger.balance(&actor.id);
            world.notify(&actor.id, &format!("Bank balance: {}", balance));
            self.publish(world, &actor.id);
            return EventOutcome::Cancel;
        }
        if self.can_modify(actor, pos, Intent::Interact) {
            return EventOutcome::Continue;
        }
        self.deny(world, actor, pos, "You cannot use that here.")
    }

    pub fn on_block_break(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        pos: BlockPos,
    ) -> EventOutcome {
        if self.banks.contains(pos) {
            if !actor.is_admin() {
                return self.deny(world, actor, pos, "Bank blocks cannot be broken.");
            }
            self.banks.remove(pos);
            info!("bank block at {} removed by {}", pos, player_name(&actor.name));
            return EventOutcome::Continue;
        }
        if self.can_modify(actor, pos, Intent::Build) {
            return EventOutcome::Continue;
        }
        self.deny(world, actor, pos, "This land is not yours.")
    }

    /// Denied placements are reverted and the item refunded outside creative mode.
    pub fn on_block_place(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        pos: BlockPos,
        placed: Option<&ItemStack>,
    ) -> EventOutcome {
        if self.can_modify(actor, pos, Intent::Build) {
            return EventOutcome::Continue;
        }
        world.clear_block(pos);
        if let Some(placed) = placed.filter(|_| !actor.creative) {
            let refund = ItemStack::new(&placed.code, 1);
            if !world.give_stack(&actor.id, refund.clone()) {
                world.spawn_item(refund, actor.position);
            }
        }
        self.deny(world, actor, pos, "This land is not yours.")
    }

    /// Publish the balance. The next entry check announces whatever land the actor
    /// spawned on.
    pub fn on_actor_join(&mut self, world: &mut dyn HostWorld, actor: &Actor) -> EventOutcome {
        self.publish(world, &actor.id);
        self.last_chunk.remove(&actor.id);
        EventOutcome::Continue
    }

    pub fn on_actor_leave(&mut self, actor: &Actor) -> EventOutcome {
        self.last_chunk.remove(&actor.id);
        EventOutcome::Continue
    }

    /// Tell actors whose chunk changed since the last check whose land they are on.
    /// Returns how many notices were sent.
    pub fn announce_entries(&mut self, world: &mut dyn HostWorld) -> usize {
        let mut sent = 0;
        for actor in world.online_actors() {
            let chunk = ChunkKey::from_block(actor.position.block_pos());
            if self.last_chunk.insert(actor.id.clone(), chunk) == Some(chunk) {
                continue;
            }
            let Some(claim) = self.claims.get(chunk) else {
                continue;
            };
            let mut notice = format!(
                "Land of {} ({} chunks).",
                claim.owner_name,
                self.claims.owned_count(&claim.owner_id)
            );
            if let Some(price) = claim.sale_price {
                notice.push_str(&format!(" For sale at {}.", price));
            }
            world.notify(&actor.id, &notice);
            sent += 1;
        }
        sent
    }

    /// Run the entry check and the vacuum when their intervals elapse.
    pub fn on_tick(&mut self, world: &mut dyn HostWorld, dt_ms: u64) -> Vec<Deposit> {
        if self.entry_notices.advance(dt_ms) {
            self.announce_entries(world);
        }
        let Some(vacuum) = self.vacuum.as_mut() else {
            return Vec::new();
        };
        let deposits = vacuum.tick(dt_ms, world, &self.banks, &mut self.ledger);
        for deposit in &deposits {
            metrics::add_currency_vacuumed(deposit.amount);
            self.publish(world, &deposit.actor);
        }
        deposits
    }

    fn deny(
        &self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        pos: BlockPos,
        message: &str,
    ) -> EventOutcome {
        metrics::inc_actions_denied();
        warn!("denied {} at {}", player_name(&actor.name), pos);
        world.notify(&actor.id, message);
        EventOutcome::Cancel
    }
}
