//! LandBaron: chunk claims, a per-player currency ledger and bank blocks.
//!
//! Chunks are bought with currency held in the ledger. Currency enters the ledger
//! through deposits and through the bank vacuum, and leaves it through withdrawals,
//! purchases and transfers. Claimed chunks are protected by [`access::can_modify`].

pub mod access;
pub mod bank;
pub mod claims;
pub mod commands;
pub mod errors;
pub mod ledger;
pub mod system;
pub mod types;
pub mod vacuum;

pub use access::Intent;
pub use bank::BankBlocks;
pub use claims::ClaimRegistry;
pub use commands::{parse_land_command, CommandContext, CommandReply, LandCommand};
pub use errors::LandError;
pub use ledger::LedgerStore;
pub use system::LandBaron;
pub use types::{ChunkKey, Claim, Pricing, PurchaseReceipt, CHUNK_SIZE};
pub use vacuum::{Deposit, VacuumCollector};
