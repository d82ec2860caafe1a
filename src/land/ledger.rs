//! Per-actor currency balances.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::storage::{SaveBlob, StorageError};
use crate::world::ActorId;

/// Balances keyed by actor. Unseen actors have a balance of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerStore {
    accounts: BTreeMap<ActorId, u64>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, actor: &ActorId) -> u64 {
        self.accounts.get(actor).copied().unwrap_or(0)
    }

    /// Withdraw `amount` when the balance covers it; otherwise leave everything untouched.
    pub fn debit(&mut self, actor: &ActorId, amount: u64) -> bool {
        let current = self.balance(actor);
        if current < amount {
            return false;
        }
        self.accounts.insert(actor.clone(), current - amount);
        true
    }

    pub fn credit(&mut self, actor: &ActorId, amount: u64) {
        let entry = self.accounts.entry(actor.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Move funds between accounts. Nothing changes when `from` cannot cover `amount`.
    pub fn transfer(&mut self, from: &ActorId, to: &ActorId, amount: u64) -> bool {
        if !self.debit(from, amount) {
            return false;
        }
        self.credit(to, amount);
        true
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, u64)> {
        self.accounts.iter().map(|(id, balance)| (id, *balance))
    }

    /// Sum of every balance, handy for conservation checks.
    pub fn total(&self) -> u64 {
        self.accounts
            .values()
            .fold(0u64, |acc, balance| acc.saturating_add(*balance))
    }
}

impl SaveBlob for LedgerStore {
    const KEY: &'static str = "landbaron.accounts";

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
