//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `CoinBuddy`: the slash and
//! prefix commands, the embed/button adapter the games talk through, and the
//! Poise framework setup.

/// Discord command implementations (economy, games, general, admin)
pub mod commands;
/// Discord interaction handlers (game embeds and buttons)
pub mod handlers;

use crate::config::AppConfig;
use crate::core::economy::Economy;
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// The economy every command goes through
    pub economy: Arc<Economy>,
    /// Loaded application configuration
    pub config: Arc<AppConfig>,
    /// When the bot process started
    pub started_at: Instant,
}

impl BotData {
    /// Creates a new `BotData` instance around the economy and configuration.
    #[must_use]
    pub fn new(economy: Arc<Economy>, config: Arc<AppConfig>) -> Self {
        Self {
            economy,
            config,
            started_at: Instant::now(),
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if error.is_user_facing() {
                debug!("Command `{}` rejected: {}", ctx.command().name, error);
                format!("❌ {error}")
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                "❌ Something went wrong on our side, please try again later.".to_string()
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until shut down.
#[instrument(skip(token, config, economy))]
pub async fn run_bot(token: String, config: Arc<AppConfig>, economy: Arc<Economy>) -> Result<()> {
    let prefix = config.bot.prefix.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(economy, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
