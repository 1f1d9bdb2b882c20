//! Discord interaction handlers
//!
//! Games render through [`notifier::DiscordNotifier`]: one message per round,
//! edited in place, with buttons for the player's decisions.

/// Embeds and buttons for running games
pub mod notifier;

pub use notifier::DiscordNotifier;
