//! # LandBaron - land claims, currency and graves for voxel game servers
//!
//! LandBaron is the bookkeeping core of two server mods. The game host owns the world;
//! this crate owns the tables the mods keep about it and decides what the host should
//! allow.
//!
//! ## Features
//!
//! - **Chunk Claims**: Buy 32×32 chunks with an escalating price, resell or give them away, abandon
//!   them, share them with friends or open them for public use.
//! - **Currency Ledger**: Per-player balances fed by deposits, withdrawals, transfers and
//!   bank blocks that vacuum up dropped currency.
//! - **Access Policy**: Block break, place and use events are vetoed on land the actor
//!   has no rights on.
//! - **Graves**: On death the actor's items go into containers near the body, protected
//!   for their owner for a while and swept away once emptied.
//! - **Save Blobs**: Every table persists as one named blob in the host's save game (or
//!   a sled tree when running standalone).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use landbaron::config::Config;
//! use landbaron::events::GameEvent;
//! use landbaron::host::ModHost;
//! use landbaron::storage::MemorySaveStore;
//! use landbaron::world::MemoryWorld;
//!
//! let config = Config::default();
//! let store = MemorySaveStore::new();
//! let mut world = MemoryWorld::new();
//!
//! let mut host = ModHost::new(&config);
//! host.load(&store);
//! host.dispatch(&mut world, &GameEvent::Tick { dt_ms: 250 });
//! host.save(&store).expect("save");
//! ```
//!
//! ## Module Organization
//!
//! - [`land`] - claims, ledger, bank blocks, access policy, vacuum and chat commands
//! - [`grave`] - grave placement search, records and cleanup
//! - [`events`] - host events and the ordered handler dispatcher
//! - [`host`] - wires both mods into the dispatcher and owns persistence
//! - [`world`] - the [`world::HostWorld`] collaborator trait and an in-memory world
//! - [`storage`] - save-game blob stores (memory and sled)
//! - [`tasks`] - tick interval gates and the background offload queue
//! - [`config`] - configuration management and validation

pub mod config;
pub mod events;
pub mod grave;
pub mod host;
pub mod land;
pub mod logutil;
pub mod metrics;
pub mod storage;
pub mod tasks;
pub mod world;
