//! Application settings loaded from `config.toml`.
//!
//! Every section has defaults, so a missing file starts the bot with the stock
//! game timings. A file that exists but does not parse is a hard error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Discord-facing settings
    pub bot: BotSettings,
    /// Game timings
    pub games: GameSettings,
}

/// Discord-facing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Prefix for prefix commands
    pub prefix: String,
    /// Role allowed to run admin commands
    pub admin_role_id: Option<u64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            admin_role_id: None,
        }
    }
}

/// Game timings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// How long a player may take for one decision before the round is abandoned
    pub round_timeout_secs: u64,
    /// Pause between dealer draws in Blackjack
    pub dealer_delay_ms: u64,
    /// Intermediate pockets shown while the roulette wheel spins
    pub spin_frames: usize,
    /// Pause between spin frames
    pub spin_delay_ms: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_timeout_secs: 300,
            dealer_delay_ms: 2000,
            spin_frames: 4,
            spin_delay_ms: 500,
        }
    }
}

impl GameSettings {
    /// Round timeout as a [`Duration`].
    #[must_use]
    pub const fn round_timeout(&self) -> Duration {
        Duration::from_secs(self.round_timeout_secs)
    }

    /// Dealer pause as a [`Duration`].
    #[must_use]
    pub const fn dealer_delay(&self) -> Duration {
        Duration::from_millis(self.dealer_delay_ms)
    }

    /// Spin frame pause as a [`Duration`].
    #[must_use]
    pub const fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration from `CONFIG_PATH` (default `config.toml`).
///
/// A missing file falls back to [`AppConfig::default`].
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("No config file at {path}, using defaults");
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!("Loaded configuration from {path}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [bot]
            prefix = "$"
            admin_role_id = 1234

            [games]
            round_timeout_secs = 60
            dealer_delay_ms = 0
            spin_frames = 2
            spin_delay_ms = 10
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.bot.prefix, "$");
        assert_eq!(config.bot.admin_role_id, Some(1234));
        assert_eq!(config.games.round_timeout(), Duration::from_secs(60));
        assert_eq!(config.games.spin_frames, 2);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[bot]\nprefix = \"?\"\n").unwrap();
        assert_eq!(config.bot.prefix, "?");
        assert_eq!(config.bot.admin_role_id, None);
        assert_eq!(config.games.round_timeout_secs, 300);
        assert_eq!(config.games.spin_frames, 4);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_config("[games\nround_timeout_secs = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
