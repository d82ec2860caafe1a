//! # Configuration Management Module
//!
//! Centralized, TOML-backed configuration for the land and grave mods. Every section
//! has sensible defaults so a partial file (or no file at all) still yields a usable
//! configuration.
//!
//! ## Configuration Structure
//!
//! - [`EconomyConfig`] - currency item and chunk pricing
//! - [`VacuumConfig`] - bank block vacuum cadence and pickup radius
//! - [`GraveConfig`] - grave placement search and protection window
//! - [`StorageConfig`] - where the standalone save store lives
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use landbaron::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("landbaron.toml").await?;
//!     println!("Currency: {}", config.economy.currency_item_code);
//!     Config::create_default("landbaron.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [economy]
//! currency_item_code = "game:gear-rusty"
//! base_chunk_cost = 10
//! cost_multiplier = 1.5
//!
//! [graves]
//! protection_minutes = 15
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::land::Pricing;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub vacuum: VacuumConfig,
    #[serde(default)]
    pub graves: GraveConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Item code (or code fragment) that counts as currency.
    pub currency_item_code: String,
    /// Price of the first unclaimed chunk.
    pub base_chunk_cost: u64,
    /// Each additional owned chunk multiplies the next price by this factor.
    pub cost_multiplier: f64,
    /// Milliseconds of tick time between checks for actors entering claimed land.
    pub entry_notice_ms: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            currency_item_code: "game:gear-rusty".to_string(),
            base_chunk_cost: 10,
            cost_multiplier: 1.5,
            entry_notice_ms: 1000,
        }
    }
}

impl EconomyConfig {
    pub fn pricing(&self) -> Pricing {
        Pricing {
            base_cost: self.base_chunk_cost,
            multiplier: self.cost_multiplier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VacuumConfig {
    pub enabled: bool,
    /// Milliseconds of tick time between scans.
    pub interval_ms: u64,
    /// Only actors strictly closer than this (blocks) are credited.
    pub pickup_radius: f64,
}

impl Default for VacuumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 250,
            pickup_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraveConfig {
    pub enabled: bool,
    /// Minutes during which only the owner may open a fresh grave.
    pub protection_minutes: u64,
    /// Cells tried straight above the death position.
    pub step_up_cells: u32,
    /// Horizontal (and upward) half-size of the fallback cube scan.
    pub scan_radius: i32,
    /// How far below the death position the cube scan reaches.
    pub scan_below: i32,
    /// Milliseconds of tick time between empty-grave sweeps.
    pub cleanup_interval_ms: u64,
}

impl Default for GraveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            protection_minutes: 15,
            step_up_cells: 5,
            scan_radius: 3,
            scan_below: 1,
            cleanup_interval_ms: 1000,
        }
    }
}

impl GraveConfig {
    pub fn protection_ms(&self) -> u64 {
        self.protection_minutes.saturating_mul(60_000)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Sled directory used by the standalone CLI as the save-game store.
    pub save_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "./data/savegame".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("landbaron.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter; unknown strings fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values that would make the economy or the scans misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.economy.currency_item_code.trim().is_empty() {
            return Err(anyhow!("economy.currency_item_code must not be empty"));
        }
        if !(self.economy.cost_multiplier.is_finite() && self.economy.cost_multiplier >= 1.0) {
            return Err(anyhow!("economy.cost_multiplier must be a finite number >= 1.0"));
        }
        if self.vacuum.interval_ms == 0
            || self.graves.cleanup_interval_ms == 0
            || self.economy.entry_notice_ms == 0
        {
            return Err(anyhow!("tick intervals must be greater than zero"));
        }
        if !(self.vacuum.pickup_radius.is_finite() && self.vacuum.pickup_radius > 0.0) {
            return Err(anyhow!("vacuum.pickup_radius must be positive"));
        }
        if self.graves.scan_radius < 0 || self.graves.scan_below < 0 {
            return Err(anyhow!("graves scan extents must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mod_values() {
        let config = Config::default();
        assert_eq!(config.economy.currency_item_code, "game:gear-rusty");
        assert_eq!(config.economy.base_chunk_cost, 10);
        assert_eq!(config.vacuum.interval_ms, 250);
        assert_eq!(config.graves.protection_ms(), 15 * 60 * 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let config: Config = toml::from_str(
            r#"
            [economy]
            currency_item_code = "game:gear-temporal"
            base_chunk_cost = 25
            cost_multiplier = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.economy.pricing().chunk_cost(2), 100);
        assert_eq!(config.graves.step_up_cells, 5);
        assert_eq!(config.storage.save_dir, "./data/savegame");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str("[graves]\nprotection_minutes = 30\n").unwrap();
        assert_eq!(config.graves.protection_minutes, 30);
        assert_eq!(config.graves.step_up_cells, 5);
        assert!(config.graves.enabled);

        let config: Config = toml::from_str("[vacuum]\nenabled = false\n").unwrap();
        assert!(!config.vacuum.enabled);
        assert_eq!(config.vacuum.interval_ms, 250);

        let config: Config = toml::from_str("[economy]\nbase_chunk_cost = 40\n").unwrap();
        assert_eq!(config.economy.currency_item_code, "game:gear-rusty");
        assert_eq!(config.economy.base_chunk_cost, 40);

        let config: Config = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shrinking_multiplier_is_rejected() {
        let mut config = Config::default();
        config.economy.cost_multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn default_config_serializes_to_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.graves.scan_radius, 3);
        assert!(back.vacuum.enabled);
    }
}
