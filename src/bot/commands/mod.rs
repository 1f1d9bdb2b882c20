//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Admin commands
pub mod admin;

/// Balance, daily reward, transfers and scoreboard
pub mod economy;

/// Casino games and robberies
pub mod games;

/// General utility commands
pub mod general;

use crate::bot::BotData;
use crate::errors::Error;

// Export commands
pub use admin::*;
pub use economy::*;
pub use games::*;
pub use general::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        money(),
        daily(),
        send(),
        scoreboard(),
        blackjack(),
        roulette(),
        higher_lower(),
        rob(),
        status(),
        shutdown(),
    ]
}
