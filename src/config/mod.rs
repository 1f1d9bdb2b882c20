/// Database configuration and connection management
pub mod database;

/// Bot and game settings loaded from config.toml
pub mod settings;

pub use settings::{AppConfig, BotSettings, GameSettings, load_app_configuration};
