//! Game Discord commands - `blackjack`, `roulette`, `higherlower` and `rob`.
//!
//! Games run inside the command invocation. The round message is driven by a
//! [`DiscordNotifier`](crate::bot::handlers::DiscordNotifier); rejections such
//! as a bad bet or a busy player come back as errors and are answered by the
//! framework error handler.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::DiscordNotifier},
        core::{
            economy::{Heist, RobTarget},
            robbery::{self, BANK_ROB_REWARD, BankRobOutcome, PlayerRobOutcome},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Plays a round of Blackjack.
    #[poise::command(slash_command, prefix_command)]
    pub async fn blackjack(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many coins to bet"] bet: String,
    ) -> Result<()> {
        let notifier = DiscordNotifier::new(ctx);
        ctx.data()
            .economy
            .play_blackjack(ctx.author().id.get(), &bet, &notifier)
            .await?;
        Ok(())
    }

    /// Spins the roulette wheel.
    #[poise::command(slash_command, prefix_command)]
    pub async fn roulette(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many coins to bet"] bet: String,
        #[description = "A number from 0 to 36, or red, black or green"] entry: String,
    ) -> Result<()> {
        let notifier = DiscordNotifier::new(ctx);
        ctx.data()
            .economy
            .play_roulette(ctx.author().id.get(), &bet, &entry, &notifier)
            .await?;
        Ok(())
    }

    /// Guesses whether a hidden number is higher or lower.
    #[poise::command(slash_command, prefix_command, rename = "higherlower")]
    pub async fn higher_lower(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many coins to bet"] bet: String,
    ) -> Result<()> {
        let notifier = DiscordNotifier::new(ctx);
        ctx.data()
            .economy
            .play_higher_lower(ctx.author().id.get(), &bet, &notifier)
            .await?;
        Ok(())
    }

    /// Robs a player, or the bank when no player is named.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rob(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to rob; leave empty to rob the bank"] user: Option<serenity::User>,
    ) -> Result<()> {
        let target = user.as_ref().map(|user| RobTarget {
            user: user.id.get(),
            is_bot: user.bot,
        });
        let report = ctx.data().economy.rob(ctx.author().id.get(), target).await?;

        let (title, story, color): (&str, String, u32) = match report.heist {
            Heist::Player {
                target,
                outcome: PlayerRobOutcome::Success { amount },
                ..
            } => (
                "Robbery successful",
                format!("You robbed <@{target}> and got away with **{amount}** coins."),
                0x00_00_ff_00,
            ),
            Heist::Player {
                target,
                outcome: PlayerRobOutcome::Caught { penalty },
                ..
            } => (
                "Caught!",
                format!(
                    "<@{target}> noticed you and called the police. You pay a fine of **{penalty}** coins."
                ),
                0x00_ff_00_00,
            ),
            Heist::Bank(BankRobOutcome::Success) => (
                "Bank robbed",
                format!("You emptied the vault and escaped with **{BANK_ROB_REWARD}** coins."),
                0x00_00_ff_00,
            ),
            Heist::Bank(BankRobOutcome::Caught { penalty, story }) => (
                "Caught!",
                robbery::tell_story(story, penalty),
                0x00_ff_00_00,
            ),
        };

        let embed = serenity::CreateEmbed::default()
            .title(title)
            .description(story)
            .color(color)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Balance {} · hiding until {}",
                report.balance,
                report.cooldown_until.format("%d.%m.%Y")
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
