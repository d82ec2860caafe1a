//! Chat command surface for land, bank and account verbs.
//!
//! Input is the text after the command prefix, for example `land buy` or
//! `transfer Alice 20`. Verbs are case-insensitive; player names keep their case and
//! are matched case-insensitively by the host.

use log::info;

use super::errors::LandError;
use super::system::LandBaron;
use super::types::ChunkKey;
use crate::logutil::player_name;
use crate::world::{Actor, ActorId, BlockPos, HostWorld};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandCommand {
    Buy,
    Sell(u64),
    /// Cancel a sale listing.
    Unsell,
    /// Hand the current chunk to another player.
    Give(String),
    Abandon,
    /// Toggle a friend on the current chunk, or grant on every owned chunk.
    Friend { name: String, everywhere: bool },
    Public,
    Info,
    Balance,
    Deposit(u64),
    Withdraw(u64),
    Transfer { name: String, amount: u64 },
    BankCreate,
    BankRemove,
    /// Recognised verb with bad arguments; carries the usage line.
    Usage(&'static str),
}

/// Parse a command line. `None` when the verb does not belong to this mod.
pub fn parse_land_command(input: &str) -> Option<LandCommand> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let verb = parts.first()?.to_ascii_lowercase();
    let sub = parts.get(1).map(|s| s.to_ascii_lowercase());

    let command = match verb.as_str() {
        "land" => match sub.as_deref() {
            Some("buy") => LandCommand::Buy,
            Some("sell") => match parts.get(2).and_then(|p| parse_amount(p)) {
                Some(price) => LandCommand::Sell(price),
                None => LandCommand::Usage("Usage: land sell <price>"),
            },
            Some("unsell") => LandCommand::Unsell,
            Some("give") => match parts.get(2) {
                Some(name) => LandCommand::Give(name.to_string()),
                None => LandCommand::Usage("Usage: land give <player>"),
            },
            Some("abandon") => LandCommand::Abandon,
            Some("friend") | Some("add") => match parts.get(2) {
                Some(name) => LandCommand::Friend {
                    name: name.to_string(),
                    everywhere: parts
                        .get(3)
                        .is_some_and(|flag| flag.eq_ignore_ascii_case("all")),
                },
                None => LandCommand::Usage("Usage: land friend <player> [all]"),
            },
            Some("public") => LandCommand::Public,
            Some("info") => LandCommand::Info,
            _ => LandCommand::Usage("Usage: land buy|sell <price>|unsell|give <player>|abandon|friend <player> [all]|public|info"),
        },
        "balance" | "bal" => LandCommand::Balance,
        "deposit" => match parts.get(1).and_then(|p| parse_amount(p)) {
            Some(amount) => LandCommand::Deposit(amount),
            None => LandCommand::Usage("Usage: deposit <amount>"),
        },
        "withdraw" => match parts.get(1).and_then(|p| parse_amount(p)) {
            Some(amount) => LandCommand::Withdraw(amount),
            None => LandCommand::Usage("Usage: withdraw <amount>"),
        },
        "transfer" | "pay" => match (parts.get(1), parts.get(2).and_then(|p| parse_amount(p))) {
            (Some(name), Some(amount)) => LandCommand::Transfer {
                name: name.to_string(),
                amount,
            },
            _ => LandCommand::Usage("Usage: transfer <player> <amount>"),
        },
        "bank" => match sub.as_deref() {
            Some("create") | Some("add") => LandCommand::BankCreate,
            Some("remove") | Some("delete") => LandCommand::BankRemove,
            _ => LandCommand::Usage("Usage: bank create|remove"),
        },
        _ => return None,
    };
    Some(command)
}

/// Non-negative integer amount. Zero parses so the operation can reject it.
fn parse_amount(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok()
}

/// Who issued a command and what block they have selected.
#[derive(Debug, Clone)]
pub struct CommandContext<'a> {
    pub actor: &'a Actor,
    pub selected: Option<BlockPos>,
}

impl<'a> CommandContext<'a> {
    pub fn new(actor: &'a Actor) -> Self {
        Self {
            actor,
            selected: None,
        }
    }

    pub fn with_selection(mut self, pos: BlockPos) -> Self {
        self.selected = Some(pos);
        self
    }

    fn chunk(&self) -> ChunkKey {
        ChunkKey::from_block(self.actor.position.block_pos())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Success(String),
    Error(String),
}

impl CommandReply {
    pub fn text(&self) -> &str {
        match self {
            CommandReply::Success(text) | CommandReply::Error(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandReply::Success(_))
    }
}

impl From<Result<String, LandError>> for CommandReply {
    fn from(result: Result<String, LandError>) -> Self {
        match result {
            Ok(text) => CommandReply::Success(text),
            Err(e) => CommandReply::Error(capitalize(&e.to_string())),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl LandBaron {
    pub fn execute(
        &mut self,
        world: &mut dyn HostWorld,
        ctx: &CommandContext<'_>,
        command: LandCommand,
    ) -> CommandReply {
        info!(
            "command from {}: {:?}",
            player_name(&ctx.actor.name),
            command
        );
        self.run(world, ctx, command).into()
    }

    fn run(
        &mut self,
        world: &mut dyn HostWorld,
        ctx: &CommandContext<'_>,
        command: LandCommand,
    ) -> Result<String, LandError> {
        let actor = ctx.actor;
        match command {
            LandCommand::Usage(usage) => Err(LandError::Usage(usage)),
            LandCommand::Buy => {
                let receipt = self.purchase(world, actor, ctx.chunk())?;
                Ok(format!(
                    "You bought chunk {} for {}. Balance: {}",
                    receipt.chunk,
                    receipt.cost,
                    self.balance(&actor.id)
                ))
            }
            LandCommand::Sell(price) => {
                self.list_for_sale(actor, ctx.chunk(), price)?;
                Ok(format!("Chunk {} is now for sale at {}.", ctx.chunk(), price))
            }
            LandCommand::Unsell => {
                let chunk = ctx.chunk();
                Ok(if self.unlist(actor, chunk)? {
                    format!("Chunk {} is no longer for sale.", chunk)
                } else {
                    format!("Chunk {} was not for sale.", chunk)
                })
            }
            LandCommand::Give(name) => {
                let target = self.give_land(world, actor, ctx.chunk(), &name)?;
                Ok(format!("Chunk {} now belongs to {}.", ctx.chunk(), target.name))
            }
            LandCommand::Abandon => {
                self.abandon(actor, ctx.chunk())?;
                Ok(format!("You abandoned chunk {}.", ctx.chunk()))
            }
            LandCommand::Friend { name, everywhere } => self.friend(world, ctx, &name, everywhere),
            LandCommand::Public => {
                let chunk = ctx.chunk();
                let public = self.claims_mut().toggle_public(&actor.id, chunk)?;
                Ok(if public {
                    format!("Chunk {} is now open for anyone to use.", chunk)
                } else {
                    format!("Chunk {} is now private.", chunk)
                })
            }
            LandCommand::Info => Ok(self.describe(&actor.id, ctx.chunk())),
            LandCommand::Balance => {
                let balance = self.balance(&actor.id);
                world.publish_balance(&actor.id, balance);
                Ok(format!("Balance: {}", balance))
            }
            LandCommand::Deposit(amount) => {
                let taken = self.deposit(world, actor, amount)?;
                Ok(format!(
                    "Deposited {}. Balance: {}",
                    taken,
                    self.balance(&actor.id)
                ))
            }
            LandCommand::Withdraw(amount) => {
                self.withdraw(world, actor, amount)?;
                Ok(format!(
                    "Withdrew {}. Balance: {}",
                    amount,
                    self.balance(&actor.id)
                ))
            }
            LandCommand::Transfer { name, amount } => {
                let target = self.transfer(world, actor, &name, amount)?;
                Ok(format!("Sent {} to {}.", amount, target.name))
            }
            LandCommand::BankCreate => self.bank_block(ctx, true),
            LandCommand::BankRemove => self.bank_block(ctx, false),
        }
    }

    /// Admin-only: mark or unmark the selected block as a bank.
    fn bank_block(&mut self, ctx: &CommandContext<'_>, create: bool) -> Result<String, LandError> {
        if !ctx.actor.is_admin() {
            return Err(LandError::NoPermission);
        }
        let pos = ctx
            .selected
            .ok_or_else(|| LandError::InvalidTarget("look at a block first".to_string()))?;
        if create {
            if !self.banks_mut().insert(pos) {
                return Err(LandError::InvalidTarget(format!("{} is already a bank", pos)));
            }
            info!("bank block created at {}", pos);
            Ok(format!("Bank block created at {}.", pos))
        } else {
            if !self.banks_mut().remove(pos) {
                return Err(LandError::InvalidTarget(format!("{} is not a bank", pos)));
            }
            info!("bank block removed at {}", pos);
            Ok(format!("Bank block removed at {}.", pos))
        }
    }

    fn friend(
        &mut self,
        world: &mut dyn HostWorld,
        ctx: &CommandContext<'_>,
        name: &str,
        everywhere: bool,
    ) -> Result<String, LandError> {
        let actor = ctx.actor;
        let friend = world
            .find_online(name)
            .ok_or_else(|| LandError::PlayerNotFound(name.to_string()))?;
        if everywhere {
            let changed = self.claims_mut().grant_everywhere(&actor.id, &friend.id)?;
            return Ok(format!(
                "{} can now build on {} more of your chunks.",
                friend.name, changed
            ));
        }
        let chunk = ctx.chunk();
        if self.claims_mut().add_friend(&actor.id, chunk, &friend.id)? {
            world.notify(
                &friend.id,
                &format!("{} gave you access to chunk {}.", actor.name, chunk),
            );
            Ok(format!("{} can now build on chunk {}.", friend.name, chunk))
        } else {
            Ok(format!("{} removed from chunk {}.", friend.name, chunk))
        }
    }

    fn describe(&self, actor: &ActorId, chunk: ChunkKey) -> String {
        let Some(claim) = self.claims().get(chunk) else {
            return format!(
                "Chunk {} is unclaimed. Price for you: {}",
                chunk,
                self.next_chunk_cost(actor)
            );
        };
        let mut text = format!("Chunk {} is owned by {}.", chunk, claim.owner_name);
        if let Some(price) = claim.sale_price {
            text.push_str(&format!(" For sale at {}.", price));
        }
        if claim.public_access {
            text.push_str(" Public.");
        }
        if claim.is_owner(actor) && !claim.allowed_ids.is_empty() {
            text.push_str(&format!(" Friends: {}.", claim.allowed_ids.len()));
        }
        text
    }
}
