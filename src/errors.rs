//! Unified error type for the economy engine and the Discord layer.
//!
//! Rejections (bad bets, busy sessions, cooldowns) are ordinary values the bot
//! reports back to the user. Storage and framework failures are infrastructure
//! errors and are logged before a generic reply is sent.

use chrono::NaiveDate;
use thiserror::Error;

/// Every failure the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// The bet was not an integer or was smaller than 1.
    #[error("Invalid bet `{input}`: must be a whole number of at least 1")]
    InvalidBet {
        /// Raw user input
        input: String,
    },

    /// A bet, transfer or robbery requires more coins than the account holds.
    #[error("Insufficient funds: you have {balance} coins but {required} are required")]
    InsufficientFunds {
        /// Current balance of the account
        balance: i64,
        /// Amount the operation needs
        required: i64,
    },

    /// The user is already inside a game or robbery.
    #[error("User {user} is busy with another game")]
    SessionBusy {
        /// The busy user
        user: u64,
    },

    /// Sending coins to yourself.
    #[error("You cannot send coins to yourself")]
    SelfTransferDenied,

    /// Robbing yourself.
    #[error("You cannot rob yourself")]
    SelfTargetDenied,

    /// The target of a transfer or robbery is a bot account.
    #[error("Please stop pinging the bots")]
    BotTargetDenied,

    /// The robbery target does not hold enough coins to be worth robbing.
    #[error("The target only has {balance} coins; robbing someone below {required} is not allowed")]
    TargetTooPoor {
        /// Target balance
        balance: i64,
        /// Minimum target balance
        required: i64,
    },

    /// The player did not answer in time; the round was abandoned.
    #[error("You took longer than {seconds} seconds, the round is over")]
    RoundTimeout {
        /// Timeout budget that elapsed
        seconds: u64,
    },

    /// Roulette entry that is neither 0-36 nor a color.
    #[error("Invalid entry `{input}`. Valid: 0-36, red, black, green")]
    InvalidEntry {
        /// Raw user input
        input: String,
    },

    /// Non-positive transfer amount.
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// The daily reward was already claimed today.
    #[error("You already claimed your daily reward today")]
    DailyAlreadyClaimed,

    /// The user is still hiding after the last robbery.
    #[error("You are still hiding, wait until {}", .until.format("%d.%m.%Y"))]
    RobberyCooldown {
        /// First day the user may rob again
        until: NaiveDate,
    },

    /// A stacked deck ran out of cards.
    #[error("The deck is exhausted")]
    DeckExhausted,

    /// A user identifier that does not fit the storage key.
    #[error("User id {user} cannot be stored")]
    InvalidUser {
        /// The rejected identifier
        user: u64,
    },

    /// Storage failure. Never treated as a zero balance.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(#[from] sea_orm::DbErr),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Details
        message: String,
    },

    /// Missing environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serenity/Poise failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Whether this error is a rejection meant to be shown to the user as-is.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::LedgerUnavailable(_)
                | Self::Config { .. }
                | Self::EnvVar(_)
                | Self::Io(_)
                | Self::Framework(_)
                | Self::DeckExhausted
                | Self::InvalidUser { .. }
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_user_facing() {
        assert!(Error::InvalidBet { input: "abc".to_string() }.is_user_facing());
        assert!(Error::SessionBusy { user: 1 }.is_user_facing());
        assert!(Error::RoundTimeout { seconds: 300 }.is_user_facing());
        assert!(!Error::LedgerUnavailable(sea_orm::DbErr::Custom("down".to_string())).is_user_facing());
    }

    #[test]
    fn test_cooldown_message_shows_date() {
        let until = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default();
        let message = Error::RobberyCooldown { until }.to_string();
        assert!(message.contains("09.03.2024"));
    }
}
