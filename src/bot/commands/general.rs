//! General Discord commands - ping and help.
//! These commands don't touch the economy.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**CoinBuddy Help**\n\
        Every new player starts with 1000 coins.\n\n\
        **Economy**\n\
        • `/money [user]` - Shows a balance.\n\
        • `/daily` - Claims 300 coins once per day, plus a bonus for every day in a row.\n\
        • `/send <user> <amount>` - Sends coins to another player.\n\
        • `/scoreboard` - Shows the ten richest players.\n\n\
        **Games**\n\
        • `/blackjack <bet>` - Beat the dealer without going over 21. A natural pays 2.5x.\n\
        • `/roulette <bet> <entry>` - Bet on a number 0-36 or on red, black or green.\n\
        • `/higherlower <bet>` - Guess whether the hidden number is higher or lower. A fifth of the bet is at stake.\n\
        • `/rob [user]` - Rob a player, or the bank when nobody is named. You have to hide afterwards.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
