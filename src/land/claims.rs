//! Chunk ownership registry.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::LandError;
use super::ledger::LedgerStore;
use super::types::{ChunkKey, Claim, Pricing, PurchaseReceipt};
use crate::storage::{SaveBlob, StorageError};
use crate::world::ActorId;

/// All claims, at most one per chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimRegistry {
    claims: BTreeMap<ChunkKey, Claim>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chunk: ChunkKey) -> Option<&Claim> {
        self.claims.get(&chunk)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &Claim)> {
        self.claims.iter().map(|(key, claim)| (*key, claim))
    }

    pub fn owned_count(&self, actor: &ActorId) -> usize {
        self.claims.values().filter(|c| c.is_owner(actor)).count()
    }

    /// Buy an unclaimed chunk, or a claimed one that is listed for sale.
    ///
    /// Nothing is mutated unless the purchase succeeds.
    pub fn purchase(
        &mut self,
        ledger: &mut LedgerStore,
        buyer: &ActorId,
        buyer_name: &str,
        chunk: ChunkKey,
        pricing: &Pricing,
    ) -> Result<PurchaseReceipt, LandError> {
        let receipt = match self.claims.get(&chunk) {
            None => {
                let cost = pricing.chunk_cost(self.owned_count(buyer));
                Self::charge(ledger, buyer, cost)?;
                PurchaseReceipt {
                    chunk,
                    cost,
                    seller: None,
                }
            }
            Some(existing) => {
                let Some(price) = existing.sale_price else {
                    return Err(LandError::AlreadyOwned);
                };
                if existing.is_owner(buyer) {
                    return Err(LandError::AlreadyYours);
                }
                let seller = existing.owner_id.clone();
                Self::charge(ledger, buyer, price)?;
                ledger.credit(&seller, price);
                PurchaseReceipt {
                    chunk,
                    cost: price,
                    seller: Some(seller),
                }
            }
        };

        debug!(
            "chunk {} bought by {} for {} (seller={:?})",
            chunk, buyer, receipt.cost, receipt.seller
        );
        self.claims.insert(chunk, Claim::new(buyer.clone(), buyer_name));
        Ok(receipt)
    }

    fn charge(ledger: &mut LedgerStore, buyer: &ActorId, cost: u64) -> Result<(), LandError> {
        if ledger.debit(buyer, cost) {
            Ok(())
        } else {
            Err(LandError::InsufficientFunds {
                needed: cost,
                available: ledger.balance(buyer),
            })
        }
    }

    fn owned_mut(&mut self, actor: &ActorId, chunk: ChunkKey) -> Result<&mut Claim, LandError> {
        match self.claims.get_mut(&chunk) {
            Some(claim) if claim.is_owner(actor) => Ok(claim),
            _ => Err(LandError::NotOwner),
        }
    }

    pub fn list_for_sale(
        &mut self,
        actor: &ActorId,
        chunk: ChunkKey,
        price: u64,
    ) -> Result<(), LandError> {
        let claim = self.owned_mut(actor, chunk)?;
        if price == 0 {
            return Err(LandError::InvalidAmount);
        }
        claim.sale_price = Some(price);
        Ok(())
    }

    /// Take the chunk off the market. Returns false when it was not listed.
    pub fn unlist(&mut self, actor: &ActorId, chunk: ChunkKey) -> Result<bool, LandError> {
        let claim = self.owned_mut(actor, chunk)?;
        Ok(claim.sale_price.take().is_some())
    }

    /// Hand the chunk to another player for free. The listing and friend list are dropped.
    pub fn give_to(
        &mut self,
        owner: &ActorId,
        chunk: ChunkKey,
        new_owner: &ActorId,
        new_owner_name: &str,
    ) -> Result<(), LandError> {
        let claim = self.owned_mut(owner, chunk)?;
        if new_owner == owner {
            return Err(LandError::AlreadyYours);
        }
        debug!("chunk {} given by {} to {}", chunk, owner, new_owner);
        claim.owner_id = new_owner.clone();
        claim.owner_name = new_owner_name.to_string();
        claim.sale_price = None;
        claim.allowed_ids.clear();
        Ok(())
    }

    pub fn abandon(&mut self, actor: &ActorId, chunk: ChunkKey) -> Result<Claim, LandError> {
        self.owned_mut(actor, chunk)?;
        self.claims.remove(&chunk).ok_or(LandError::NotOwner)
    }

    /// Toggle `friend` in the chunk's allowed list. Returns true when now allowed.
    pub fn add_friend(
        &mut self,
        actor: &ActorId,
        chunk: ChunkKey,
        friend: &ActorId,
    ) -> Result<bool, LandError> {
        let claim = self.owned_mut(actor, chunk)?;
        if friend == actor {
            return Err(LandError::InvalidTarget("you already own this land".to_string()));
        }
        if claim.allowed_ids.remove(friend) {
            Ok(false)
        } else {
            claim.allowed_ids.insert(friend.clone());
            Ok(true)
        }
    }

    /// Allow `friend` on every chunk `owner` holds. Returns how many chunks changed.
    pub fn grant_everywhere(
        &mut self,
        owner: &ActorId,
        friend: &ActorId,
    ) -> Result<usize, LandError> {
        if owner == friend {
            return Err(LandError::InvalidTarget("you already own this land".to_string()));
        }
        let mut changed = 0;
        for claim in self.claims.values_mut().filter(|c| c.is_owner(owner)) {
            if claim.allowed_ids.insert(friend.clone()) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Flip public interaction access. Returns the new state.
    pub fn toggle_public(&mut self, actor: &ActorId, chunk: ChunkKey) -> Result<bool, LandError> {
        let claim = self.owned_mut(actor, chunk)?;
        claim.public_access = !claim.public_access;
        Ok(claim.public_access)
    }
}

#[derive(Serialize, Deserialize)]
struct ClaimEntry {
    chunk_x: i32,
    chunk_z: i32,
    #[serde(flatten)]
    claim: Claim,
}

impl SaveBlob for ClaimRegistry {
    const KEY: &'static str = "landbaron.claims";

    fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        let entries: Vec<ClaimEntry> = self
            .claims
            .iter()
            .map(|(key, claim)| ClaimEntry {
                chunk_x: key.x(),
                chunk_z: key.z(),
                claim: claim.clone(),
            })
            .collect();
        Ok(serde_json::to_vec(&entries)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let entries: Vec<ClaimEntry> = serde_json::from_slice(bytes)?;
        let claims = entries
            .into_iter()
            .filter(|entry| !entry.claim.owner_id.is_empty())
            .map(|entry| (ChunkKey::new(entry.chunk_x, entry.chunk_z), entry.claim))
            .collect();
        Ok(Self { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICING: Pricing = Pricing {
        base_cost: 10,
        multiplier: 1.5,
    };

    fn id(s: &str) -> ActorId {
        ActorId::from(s)
    }

    fn funded(actor: &str, amount: u64) -> LedgerStore {
        let mut ledger = LedgerStore::new();
        ledger.credit(&id(actor), amount);
        ledger
    }

    #[test]
    fn purchase_costs_follow_owned_count() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        let first = claims
            .purchase(&mut ledger, &id("a"), "A", ChunkKey::new(0, 0), &PRICING)
            .expect("first");
        assert_eq!(first.cost, 10);
        assert_eq!(ledger.balance(&id("a")), 90);
        let second = claims
            .purchase(&mut ledger, &id("a"), "A", ChunkKey::new(0, 1), &PRICING)
            .expect("second");
        assert_eq!(second.cost, 15);
        assert_eq!(ledger.balance(&id("a")), 75);
        assert_eq!(claims.owned_count(&id("a")), 2);
    }

    #[test]
    fn claimed_chunk_not_for_sale_is_untouched() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        ledger.credit(&id("b"), 100);
        let chunk = ChunkKey::new(4, 4);
        claims
            .purchase(&mut ledger, &id("a"), "A", chunk, &PRICING)
            .expect("buy");
        let (claims_before, ledger_before) = (claims.clone(), ledger.clone());

        let err = claims
            .purchase(&mut ledger, &id("b"), "B", chunk, &PRICING)
            .unwrap_err();
        assert_eq!(err, LandError::AlreadyOwned);
        let err = claims
            .purchase(&mut ledger, &id("a"), "A", chunk, &PRICING)
            .unwrap_err();
        assert_eq!(err, LandError::AlreadyOwned);
        assert_eq!(claims, claims_before);
        assert_eq!(ledger, ledger_before);
    }

    #[test]
    fn buying_a_listed_chunk_pays_the_seller_and_resets_the_claim() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("seller", 10);
        ledger.credit(&id("buyer"), 50);
        let chunk = ChunkKey::new(1, 1);
        claims
            .purchase(&mut ledger, &id("seller"), "Seller", chunk, &PRICING)
            .expect("buy");
        claims.add_friend(&id("seller"), chunk, &id("pal")).expect("friend");
        claims.toggle_public(&id("seller"), chunk).expect("public");
        claims.list_for_sale(&id("seller"), chunk, 40).expect("list");

        let receipt = claims
            .purchase(&mut ledger, &id("buyer"), "Buyer", chunk, &PRICING)
            .expect("resale");
        assert_eq!(receipt.cost, 40);
        assert_eq!(receipt.seller, Some(id("seller")));
        assert_eq!(ledger.balance(&id("seller")), 40);
        assert_eq!(ledger.balance(&id("buyer")), 10);

        let claim = claims.get(chunk).expect("claim");
        assert_eq!(claim.owner_id, id("buyer"));
        assert_eq!(claim.owner_name, "Buyer");
        assert!(claim.allowed_ids.is_empty());
        assert!(!claim.public_access);
        assert_eq!(claim.sale_price, None);
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn owner_cannot_buy_own_listing() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        let chunk = ChunkKey::new(0, 0);
        claims.purchase(&mut ledger, &id("a"), "A", chunk, &PRICING).expect("buy");
        claims.list_for_sale(&id("a"), chunk, 5).expect("list");
        let err = claims
            .purchase(&mut ledger, &id("a"), "A", chunk, &PRICING)
            .unwrap_err();
        assert_eq!(err, LandError::AlreadyYours);
    }

    #[test]
    fn insufficient_funds_reports_cost_and_balance() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 9);
        let err = claims
            .purchase(&mut ledger, &id("a"), "A", ChunkKey::new(0, 0), &PRICING)
            .unwrap_err();
        assert_eq!(
            err,
            LandError::InsufficientFunds {
                needed: 10,
                available: 9
            }
        );
        assert!(claims.is_empty());
        assert_eq!(ledger.balance(&id("a")), 9);
    }

    #[test]
    fn owner_only_mutations() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        let chunk = ChunkKey::new(2, -2);
        claims.purchase(&mut ledger, &id("a"), "A", chunk, &PRICING).expect("buy");

        assert_eq!(claims.list_for_sale(&id("b"), chunk, 5), Err(LandError::NotOwner));
        assert_eq!(claims.list_for_sale(&id("a"), chunk, 0), Err(LandError::InvalidAmount));
        assert_eq!(
            claims.add_friend(&id("b"), chunk, &id("c")),
            Err(LandError::NotOwner)
        );
        assert_eq!(claims.abandon(&id("b"), chunk).unwrap_err(), LandError::NotOwner);
        assert_eq!(
            claims.abandon(&id("a"), ChunkKey::new(9, 9)).unwrap_err(),
            LandError::NotOwner
        );

        let removed = claims.abandon(&id("a"), chunk).expect("abandon");
        assert_eq!(removed.owner_id, id("a"));
        assert!(claims.get(chunk).is_none());
    }

    #[test]
    fn unlist_takes_chunk_off_the_market() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        ledger.credit(&id("b"), 100);
        let chunk = ChunkKey::new(3, 0);
        claims.purchase(&mut ledger, &id("a"), "A", chunk, &PRICING).expect("buy");
        claims.list_for_sale(&id("a"), chunk, 20).expect("list");

        assert_eq!(claims.unlist(&id("b"), chunk), Err(LandError::NotOwner));
        assert_eq!(claims.unlist(&id("a"), chunk), Ok(true));
        assert_eq!(claims.unlist(&id("a"), chunk), Ok(false));
        assert_eq!(
            claims.purchase(&mut ledger, &id("b"), "B", chunk, &PRICING),
            Err(LandError::AlreadyOwned)
        );
    }

    #[test]
    fn give_to_moves_ownership_without_payment() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        let chunk = ChunkKey::new(-1, 7);
        claims.purchase(&mut ledger, &id("a"), "A", chunk, &PRICING).expect("buy");
        claims.add_friend(&id("a"), chunk, &id("pal")).expect("friend");
        claims.list_for_sale(&id("a"), chunk, 50).expect("list");

        assert_eq!(
            claims.give_to(&id("b"), chunk, &id("c"), "C"),
            Err(LandError::NotOwner)
        );
        assert_eq!(
            claims.give_to(&id("a"), chunk, &id("a"), "A"),
            Err(LandError::AlreadyYours)
        );
        claims.give_to(&id("a"), chunk, &id("b"), "B").expect("give");

        let claim = claims.get(chunk).expect("claim");
        assert_eq!(claim.owner_id, id("b"));
        assert_eq!(claim.owner_name, "B");
        assert_eq!(claim.sale_price, None);
        assert!(claim.allowed_ids.is_empty());
        assert_eq!(ledger.balance(&id("a")), 90);
        assert_eq!(ledger.balance(&id("b")), 0);
        assert_eq!(claims.owned_count(&id("a")), 0);
    }

    #[test]
    fn add_friend_toggles_membership() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 100);
        let chunk = ChunkKey::new(0, 0);
        claims.purchase(&mut ledger, &id("a"), "A", chunk, &PRICING).expect("buy");
        assert_eq!(claims.add_friend(&id("a"), chunk, &id("b")), Ok(true));
        assert!(claims.get(chunk).expect("claim").is_member(&id("b")));
        assert_eq!(claims.add_friend(&id("a"), chunk, &id("b")), Ok(false));
        assert!(!claims.get(chunk).expect("claim").is_member(&id("b")));
        assert!(matches!(
            claims.add_friend(&id("a"), chunk, &id("a")),
            Err(LandError::InvalidTarget(_))
        ));
    }

    #[test]
    fn grant_everywhere_counts_new_memberships() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 1000);
        for x in 0..3 {
            claims
                .purchase(&mut ledger, &id("a"), "A", ChunkKey::new(x, 0), &PRICING)
                .expect("buy");
        }
        claims
            .add_friend(&id("a"), ChunkKey::new(0, 0), &id("b"))
            .expect("friend");
        assert_eq!(claims.grant_everywhere(&id("a"), &id("b")), Ok(2));
        assert_eq!(claims.grant_everywhere(&id("a"), &id("b")), Ok(0));
    }

    #[test]
    fn save_blob_round_trip() {
        let mut claims = ClaimRegistry::new();
        let mut ledger = funded("a", 1000);
        for (x, z) in [(0, 0), (-5, 3), (i32::MAX, i32::MIN)] {
            claims
                .purchase(&mut ledger, &id("a"), "A", ChunkKey::new(x, z), &PRICING)
                .expect("buy");
        }
        claims.add_friend(&id("a"), ChunkKey::new(-5, 3), &id("b")).expect("friend");
        claims.list_for_sale(&id("a"), ChunkKey::new(0, 0), 99).expect("list");

        let bytes = claims.to_bytes().expect("encode");
        let restored = ClaimRegistry::from_bytes(&bytes).expect("decode");
        assert_eq!(restored, claims);
    }
}
