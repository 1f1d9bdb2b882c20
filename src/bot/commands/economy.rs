//! Economy Discord commands - `money`, `daily`, `send` and `scoreboard`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows your balance, or another player's. Bots have no balance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn money(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whose balance to show"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let balance = ctx
            .data()
            .economy
            .balance_of(user.id.get(), user.bot)
            .await?;

        if user.id == ctx.author().id {
            ctx.say(format!("💰 You have **{balance}** coins.")).await?;
        } else {
            ctx.say(format!("💰 <@{}> has **{balance}** coins.", user.id))
                .await?;
        }
        Ok(())
    }

    /// Claims the daily reward.
    #[poise::command(slash_command, prefix_command)]
    pub async fn daily(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let reward = ctx.data().economy.claim_daily(ctx.author().id.get()).await?;

        let bonus = if reward.bonus > 0 {
            format!(" ({} + {} streak bonus)", reward.base, reward.bonus)
        } else {
            String::new()
        };
        ctx.say(format!(
            "✅ You claimed **{}** coins{bonus}. Your balance is now {}.",
            reward.total(),
            reward.balance
        ))
        .await?;
        Ok(())
    }

    /// Sends coins to another player.
    #[poise::command(slash_command, prefix_command)]
    pub async fn send(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who receives the coins"] user: serenity::User,
        #[description = "How many coins to send"] amount: i64,
    ) -> Result<()> {
        let (balance, _) = ctx
            .data()
            .economy
            .send(ctx.author().id.get(), user.id.get(), user.bot, amount)
            .await?;

        ctx.say(format!(
            "✅ Sent **{amount}** coins to <@{}>. You have {balance} coins left.",
            user.id
        ))
        .await?;
        Ok(())
    }

    /// Shows the richest players.
    #[poise::command(slash_command, prefix_command)]
    pub async fn scoreboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let standings = ctx.data().economy.scoreboard().await?;

        if standings.is_empty() {
            ctx.say("Nobody has any coins yet.").await?;
            return Ok(());
        }

        let lines: Vec<String> = standings
            .iter()
            .enumerate()
            .map(|(rank, standing)| {
                format!("**{}.** <@{}>: {} coins", rank + 1, standing.user, standing.balance)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title("🏆 Scoreboard")
            .description(lines.join("\n"))
            .color(0x00_ff_d7_00);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
