//! Binary entrypoint for the LandBaron admin CLI.
//!
//! Commands:
//! - `init` - create a starter `landbaron.toml`
//! - `status` - print table sizes and save store contents
//! - `claims` - list every claimed chunk
//! - `balance <id>` - show one account
//! - `grant <id> <amount>` - credit an account
//! - `bank add|remove <x> <y> <z>` - manage bank blocks
//!
//! All commands work offline against the sled save directory from the config.
//! See the library crate docs for module‑level details: `landbaron::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use landbaron::config::Config;
use landbaron::host::ModHost;
use landbaron::metrics;
use landbaron::storage::{SaveGameStore, SledSaveStore};
use landbaron::world::{ActorId, BlockPos};

#[derive(Parser)]
#[command(name = "landbaron")]
#[command(about = "Offline administration for LandBaron save data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "landbaron.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show table sizes and stored blobs
    Status,
    /// List claimed chunks
    Claims,
    /// Show the balance of an account
    Balance {
        /// Player UID
        id: String,
    },
    /// Credit currency to an account
    Grant {
        /// Player UID
        id: String,
        amount: u64,
    },
    /// Manage bank blocks
    Bank {
        #[command(subcommand)]
        action: BankAction,
    },
}

#[derive(Subcommand)]
enum BankAction {
    /// Mark a block as a bank
    Add { x: i32, y: i32, z: i32 },
    /// Unmark a bank block
    Remove { x: i32, y: i32, z: i32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        Config::create_default(&cli.config).await?;
        println!("Wrote default configuration to {}", cli.config);
        return Ok(());
    }

    // A missing file means defaults; a broken one is fatal
    let config = if std::path::Path::new(&cli.config).exists() {
        Config::load(&cli.config).await?
    } else {
        eprintln!("{} not found; using defaults", cli.config);
        Config::default()
    };
    init_logging(&config, cli.verbose);
    info!("LandBaron v{}", env!("CARGO_PKG_VERSION"));

    let store = SledSaveStore::open(&config.storage.save_dir)?;
    let mut host = ModHost::new(&config);
    host.load(&store);

    match cli.command {
        // Written before any store is opened
        Commands::Init => {}
        Commands::Status => {
            let land = host.land();
            println!("LandBaron v{}", env!("CARGO_PKG_VERSION"));
            println!("Save dir: {}", config.storage.save_dir);
            println!("Claims: {}", land.claims().len());
            println!("Bank blocks: {}", land.banks().len());
            println!(
                "Accounts: {} (total {} {})",
                land.ledger().len(),
                land.ledger().total(),
                land.currency_code()
            );
            println!("Graves: {}", host.graves().registry().len());
            println!("Blobs: {}", store.names()?.join(", "));
            println!("Counters: {:?}", metrics::snapshot());
        }
        Commands::Claims => {
            let land = host.land();
            if land.claims().is_empty() {
                println!("No claims.");
            }
            for (chunk, claim) in land.claims().iter() {
                let sale = claim
                    .sale_price
                    .map(|price| format!(" for sale at {}", price))
                    .unwrap_or_default();
                println!(
                    "{:>12}  {} ({}){}{}",
                    chunk.to_string(),
                    claim.owner_name,
                    claim.owner_id,
                    if claim.public_access { " public" } else { "" },
                    sale
                );
            }
        }
        Commands::Balance { id } => {
            let id = ActorId::new(id);
            println!("{}: {}", id, host.land().balance(&id));
        }
        Commands::Grant { id, amount } => {
            if amount == 0 {
                return Err(anyhow!("amount must be greater than zero"));
            }
            let id = ActorId::new(id);
            host.land_mut().ledger_mut().credit(&id, amount);
            host.save(&store)?;
            info!("granted {} to {}", amount, id);
            println!("{}: {}", id, host.land().balance(&id));
        }
        Commands::Bank { action } => {
            let changed = match action {
                BankAction::Add { x, y, z } => {
                    let pos = BlockPos::new(x, y, z);
                    let added = host.land_mut().banks_mut().insert(pos);
                    println!("{}", if added { "Bank added" } else { "Already a bank" });
                    added
                }
                BankAction::Remove { x, y, z } => {
                    let pos = BlockPos::new(x, y, z);
                    let removed = host.land_mut().banks_mut().remove(pos);
                    println!("{}", if removed { "Bank removed" } else { "Not a bank" });
                    removed
                }
            };
            if changed {
                host.save(&store)?;
            } else {
                warn!("bank table unchanged");
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let level = match verbosity {
        0 => config.logging.level_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Console output only when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
