//! Bank block vacuum: dropped currency lying on a bank is credited to the closest actor.

use log::debug;

use super::bank::BankBlocks;
use super::ledger::LedgerStore;
use crate::config::VacuumConfig;
use crate::tasks::IntervalGate;
use crate::world::{Actor, ActorId, HostWorld, Vec3};

/// One collected stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub actor: ActorId,
    pub amount: u64,
}

pub struct VacuumCollector {
    gate: IntervalGate,
    pickup_radius: f64,
    currency_code: String,
}

impl VacuumCollector {
    pub fn new(config: &VacuumConfig, currency_code: &str) -> Self {
        Self {
            gate: IntervalGate::new(config.interval_ms),
            pickup_radius: config.pickup_radius,
            currency_code: currency_code.to_string(),
        }
    }

    /// Advance the interval gate and scan when it fires.
    pub fn tick(
        &mut self,
        dt_ms: u64,
        world: &mut dyn HostWorld,
        banks: &BankBlocks,
        ledger: &mut LedgerStore,
    ) -> Vec<Deposit> {
        if !self.gate.advance(dt_ms) {
            return Vec::new();
        }
        self.collect(world, banks, ledger)
    }

    /// Scan loose items once, regardless of the interval gate.
    pub fn collect(
        &self,
        world: &mut dyn HostWorld,
        banks: &BankBlocks,
        ledger: &mut LedgerStore,
    ) -> Vec<Deposit> {
        if banks.is_empty() {
            return Vec::new();
        }
        let actors = world.online_actors();
        if actors.is_empty() {
            return Vec::new();
        }

        let mut deposits = Vec::new();
        for item in world.dropped_items() {
            if !item.alive || !item.stack.code.contains(&self.currency_code) {
                continue;
            }
            if !banks.covers(item.position.block_pos()) {
                continue;
            }
            let Some(collector) = nearest_within(&actors, &item.position, self.pickup_radius)
            else {
                continue;
            };
            let amount = u64::from(item.stack.quantity);
            ledger.credit(&collector.id, amount);
            world.despawn(item.id);
            debug!(
                "vacuumed {} x{} into account {}",
                item.stack.code, amount, collector.id
            );
            deposits.push(Deposit {
                actor: collector.id.clone(),
                amount,
            });
        }
        deposits
    }
}

/// Closest actor strictly within `radius`; the first one seen wins a tie.
pub fn nearest_within<'a>(actors: &'a [Actor], point: &Vec3, radius: f64) -> Option<&'a Actor> {
    let mut best: Option<&Actor> = None;
    let mut best_distance = radius;
    for actor in actors {
        let distance = actor.position.distance_to(point);
        if distance < best_distance {
            best_distance = distance;
            best = Some(actor);
        }
    }
    best
}
