//! Shared fixtures for the integration tests.

use landbaron::config::Config;
use landbaron::host::ModHost;
use landbaron::world::{Actor, MemoryWorld, Vec3};

pub const CURRENCY: &str = "game:gear-rusty";

pub fn host() -> ModHost {
    ModHost::new(&Config::default())
}

/// A player standing at the given block, added to `world`.
pub fn spawn(world: &mut MemoryWorld, id: &str, name: &str, x: f64, y: f64, z: f64) -> Actor {
    let actor = Actor::player(id, name, Vec3::new(x, y, z));
    world.add_actor(actor.clone());
    actor
}

#[allow(dead_code)] // Not every test file needs an admin.
pub fn spawn_admin(world: &mut MemoryWorld, id: &str, x: f64, y: f64, z: f64) -> Actor {
    let actor = Actor::admin(id, "Admin", Vec3::new(x, y, z));
    world.add_actor(actor.clone());
    actor
}
