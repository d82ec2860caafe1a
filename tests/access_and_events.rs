//! Access policy as seen through host events.
mod common;

use common::{host, spawn, spawn_admin};
use landbaron::events::{EventOutcome, GameEvent};
use landbaron::land::Intent;
use landbaron::world::{BlockClass, BlockPos, HostWorld, ItemStack, MemoryWorld};

fn break_at(actor: &landbaron::world::Actor, pos: BlockPos) -> GameEvent {
    GameEvent::BlockBreak {
        actor: actor.clone(),
        pos,
    }
}

#[test]
fn strangers_cannot_build_on_claimed_land() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let owner = spawn(&mut world, "uid-o", "Owner", 8.0, 64.0, 8.0);
    let stranger = spawn(&mut world, "uid-s", "Stranger", 9.0, 64.0, 9.0);
    host.land_mut().ledger_mut().credit(&owner.id, 10);
    host.run_command(&mut world, &owner, None, "land buy").unwrap();

    let inside = BlockPos::new(20, 63, 20);
    let outside = BlockPos::new(40, 63, 20);
    assert_eq!(
        host.dispatch(&mut world, &break_at(&stranger, inside)),
        EventOutcome::Cancel
    );
    assert_eq!(
        host.dispatch(&mut world, &break_at(&stranger, outside)),
        EventOutcome::Continue
    );
    assert_eq!(
        host.dispatch(&mut world, &break_at(&owner, inside)),
        EventOutcome::Continue
    );
    assert_eq!(world.messages_for(&stranger.id), vec!["This land is not yours."]);
}

#[test]
fn friends_build_and_public_only_interacts() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let owner = spawn(&mut world, "uid-o", "Owner", 8.0, 64.0, 8.0);
    let friend = spawn(&mut world, "uid-f", "Friend", 9.0, 64.0, 9.0);
    let visitor = spawn(&mut world, "uid-v", "Visitor", 10.0, 64.0, 10.0);
    host.land_mut().ledger_mut().credit(&owner.id, 10);
    host.run_command(&mut world, &owner, None, "land buy").unwrap();
    host.run_command(&mut world, &owner, None, "land friend Friend").unwrap();
    host.run_command(&mut world, &owner, None, "land public").unwrap();

    let door = BlockPos::new(3, 64, 3);
    let land = host.land();
    assert!(land.can_modify(&friend, door, Intent::Build));
    assert!(!land.can_modify(&visitor, door, Intent::Build));
    assert!(land.can_modify(&visitor, door, Intent::Interact));
    drop(land);

    assert_eq!(
        host.dispatch(
            &mut world,
            &GameEvent::BlockUse {
                actor: visitor.clone(),
                pos: door
            }
        ),
        EventOutcome::Continue
    );
}

#[test]
fn friend_toggle_removes_access_again() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let owner = spawn(&mut world, "uid-o", "Owner", 8.0, 64.0, 8.0);
    let friend = spawn(&mut world, "uid-f", "Friend", 9.0, 64.0, 9.0);
    host.land_mut().ledger_mut().credit(&owner.id, 10);
    host.run_command(&mut world, &owner, None, "land buy").unwrap();
    host.run_command(&mut world, &owner, None, "land friend friend").unwrap();
    let reply = host
        .run_command(&mut world, &owner, None, "land friend friend")
        .unwrap();
    assert_eq!(reply.text(), "Friend removed from chunk 0,0.");
    assert!(!host
        .land()
        .can_modify(&friend, BlockPos::new(1, 64, 1), Intent::Build));
}

#[test]
fn denied_placement_is_reverted_and_refunded() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let owner = spawn(&mut world, "uid-o", "Owner", 8.0, 64.0, 8.0);
    let griefer = spawn(&mut world, "uid-g", "Griefer", 9.0, 64.0, 9.0);
    host.land_mut().ledger_mut().credit(&owner.id, 10);
    host.run_command(&mut world, &owner, None, "land buy").unwrap();

    let pos = BlockPos::new(4, 65, 4);
    world.set_block(pos, BlockClass::Solid);
    let outcome = host.dispatch(
        &mut world,
        &GameEvent::BlockPlace {
            actor: griefer.clone(),
            pos,
            stack: Some(ItemStack::new("game:cobblestone", 32)),
        },
    );
    assert_eq!(outcome, EventOutcome::Cancel);
    assert_eq!(world.block_class(pos), BlockClass::Air);
    assert_eq!(world.inventory_count(&griefer.id, "game:cobblestone"), 1);
}

#[test]
fn admins_manage_bank_blocks_by_selection() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let admin = spawn_admin(&mut world, "uid-admin", 0.0, 64.0, 0.0);
    let player = spawn(&mut world, "uid-p", "Player", 0.0, 64.0, 0.0);
    let bank = BlockPos::new(2, 63, 2);

    let reply = host
        .run_command(&mut world, &player, Some(bank), "bank create")
        .unwrap();
    assert_eq!(reply.text(), "You do not have permission to do that");

    let reply = host.run_command(&mut world, &admin, None, "bank create").unwrap();
    assert!(!reply.is_success());

    let reply = host
        .run_command(&mut world, &admin, Some(bank), "bank create")
        .unwrap();
    assert!(reply.is_success());
    assert!(host.land().banks().contains(bank));

    assert_eq!(
        host.dispatch(&mut world, &break_at(&player, bank)),
        EventOutcome::Cancel
    );
    assert_eq!(
        host.dispatch(&mut world, &break_at(&admin, bank)),
        EventOutcome::Continue
    );
    assert!(host.land().banks().is_empty());
}

#[test]
fn rejoining_player_hears_whose_land_they_are_on() {
    let mut world = MemoryWorld::new();
    let mut host = host();
    let owner = spawn(&mut world, "uid-o", "Owner", 8.0, 64.0, 8.0);
    let visitor = spawn(&mut world, "uid-v", "Visitor", 9.0, 64.0, 9.0);
    host.land_mut().ledger_mut().credit(&owner.id, 10);
    host.run_command(&mut world, &owner, None, "land buy").unwrap();

    let notice = "Land of Owner (1 chunks).";
    host.dispatch(&mut world, &GameEvent::Tick { dt_ms: 1_000 });
    host.dispatch(&mut world, &GameEvent::Tick { dt_ms: 1_000 });
    assert_eq!(world.messages_for(&visitor.id), vec![notice]);

    host.dispatch(
        &mut world,
        &GameEvent::ActorLeave {
            actor: visitor.clone(),
        },
    );
    host.dispatch(
        &mut world,
        &GameEvent::ActorJoin {
            actor: visitor.clone(),
        },
    );
    host.dispatch(&mut world, &GameEvent::Tick { dt_ms: 1_000 });
    assert_eq!(world.messages_for(&visitor.id), vec![notice, notice]);
}
