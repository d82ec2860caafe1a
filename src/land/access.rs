//! Build and interaction permission checks.

use super::claims::ClaimRegistry;
use super::types::ChunkKey;
use crate::world::{Actor, BlockPos};

/// What the actor is trying to do at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Break or place blocks.
    Build,
    /// Use a block without changing the terrain (doors, chests, workstations).
    Interact,
}

/// Decide whether `actor` may act on `pos`.
///
/// Administrators always pass and unclaimed land is open to everyone. On claimed land the
/// owner and listed friends pass; anyone passes for [`Intent::Interact`] when the claim is
/// public.
pub fn can_modify(claims: &ClaimRegistry, actor: &Actor, pos: BlockPos, intent: Intent) -> bool {
    if actor.is_admin() {
        return true;
    }
    match claims.get(ChunkKey::from_block(pos)) {
        None => true,
        Some(claim) => {
            claim.is_member(&actor.id) || (intent == Intent::Interact && claim.public_access)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land::ledger::LedgerStore;
    use crate::land::types::Pricing;
    use crate::world::{ActorId, Vec3};

    fn setup() -> (ClaimRegistry, BlockPos) {
        let mut claims = ClaimRegistry::new();
        let mut ledger = LedgerStore::new();
        ledger.credit(&ActorId::from("owner"), 100);
        let pos = BlockPos::new(40, 70, 40);
        claims
            .purchase(
                &mut ledger,
                &ActorId::from("owner"),
                "Owner",
                ChunkKey::from_block(pos),
                &Pricing {
                    base_cost: 10,
                    multiplier: 1.5,
                },
            )
            .expect("buy");
        (claims, pos)
    }

    #[test]
    fn unclaimed_land_is_open() {
        let claims = ClaimRegistry::new();
        let stranger = Actor::player("x", "X", Vec3::default());
        assert!(can_modify(&claims, &stranger, BlockPos::new(0, 0, 0), Intent::Build));
    }

    #[test]
    fn strangers_are_denied_and_admins_pass() {
        let (claims, pos) = setup();
        let stranger = Actor::player("x", "X", Vec3::default());
        let admin = Actor::admin("root", "Root", Vec3::default());
        let owner = Actor::player("owner", "Owner", Vec3::default());
        assert!(!can_modify(&claims, &stranger, pos, Intent::Build));
        assert!(!can_modify(&claims, &stranger, pos, Intent::Interact));
        assert!(can_modify(&claims, &admin, pos, Intent::Build));
        assert!(can_modify(&claims, &owner, pos, Intent::Build));
    }

    #[test]
    fn friends_build_and_public_only_interacts() {
        let (mut claims, pos) = setup();
        let chunk = ChunkKey::from_block(pos);
        let owner = ActorId::from("owner");
        let friend = Actor::player("pal", "Pal", Vec3::default());
        let stranger = Actor::player("x", "X", Vec3::default());

        claims.add_friend(&owner, chunk, &friend.id).expect("friend");
        assert!(can_modify(&claims, &friend, pos, Intent::Build));

        claims.toggle_public(&owner, chunk).expect("public");
        assert!(can_modify(&claims, &stranger, pos, Intent::Interact));
        assert!(!can_modify(&claims, &stranger, pos, Intent::Build));
    }
}
