//! Admin Discord commands - `status` and `shutdown`.
//!
//! Bot owners may always run these. Everyone else needs the role configured
//! as `bot.admin_role_id`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::{info, warn};

    async fn is_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
        if ctx.framework().options().owners.contains(&ctx.author().id) {
            return Ok(true);
        }
        let Some(role) = ctx.data().config.bot.admin_role_id else {
            return Ok(false);
        };
        let Some(member) = ctx.author_member().await else {
            return Ok(false);
        };
        let allowed = member.roles.contains(&serenity::RoleId::new(role));
        if !allowed {
            warn!(user = %ctx.author().id, "admin command denied");
        }
        Ok(allowed)
    }

    /// Shows uptime, running games and account count.
    #[poise::command(slash_command, prefix_command, check = "is_admin")]
    pub async fn status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let status = ctx.data().economy.status().await?;
        let uptime = ctx.data().started_at.elapsed().as_secs();

        let embed = serenity::CreateEmbed::default()
            .title("Bot status")
            .fields(vec![
                (
                    "Uptime",
                    format!("{}h {}m", uptime / 3600, uptime % 3600 / 60),
                    true,
                ),
                ("Running games", status.active_sessions.to_string(), true),
                ("Accounts", status.accounts.to_string(), true),
            ])
            .color(0x00_00_99_ff);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shuts the bot down.
    #[poise::command(slash_command, prefix_command, check = "is_admin")]
    pub async fn shutdown(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        info!(user = %ctx.author().id, "shutdown requested");
        ctx.say("👋 Shutting down.").await?;
        ctx.framework().shard_manager().shutdown_all().await;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
