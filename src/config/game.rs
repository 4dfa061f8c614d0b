//! Game settings loaded from config.toml
//!
//! Only presentation and administration settings live here. The economic
//! constants are fixed in [`crate::core`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    /// Display name of the currency
    pub currency_name: String,
    /// Symbol appended to amounts
    pub currency_symbol: String,
    /// Discord user ids allowed to run `debug_*` commands
    pub developers: Vec<String>,
    /// Guilds to register commands in; empty registers globally
    pub guild_ids: Vec<u64>,
    /// Seconds before command replies are deleted
    pub notice_ttl_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            currency_name: "로소".to_string(),
            currency_symbol: "R".to_string(),
            developers: Vec::new(),
            guild_ids: Vec::new(),
            notice_ttl_secs: 20,
        }
    }
}

impl GameConfig {
    /// Formats an amount with two decimals and the currency symbol.
    #[must_use]
    pub fn format_money(&self, amount: f64) -> String {
        format!("{amount:.2} {}", self.currency_symbol)
    }

    /// Whether `user_id` may run admin commands.
    #[must_use]
    pub fn is_developer(&self, user_id: &str) -> bool {
        self.developers.iter().any(|id| id == user_id)
    }
}

/// Loads game configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GameConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads game configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<GameConfig> {
    load_config("config.toml")
}
