//! Discord adapter for [`Notifier`]: renders game views as embeds and turns
//! button clicks into [`Choice`]s.
//!
//! A round owns a single message. The first view sends it, later views edit it.
//! Button ids carry the invocation id so clicks on older game messages are
//! never picked up by a newer round.

use crate::bot::BotData;
use crate::config::GameSettings;
use crate::core::{
    blackjack::{Outcome, Phase},
    cards::Card,
    notifier::{BlackjackView, Choice, GameView, Notifier},
    play::{HigherLowerReport, RouletteReport},
    roulette::{Color, Pocket},
};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::{CreateReply, ReplyHandle};
use tokio::sync::Mutex;
use tracing::debug;

const COLOR_PLAYING: u32 = 0x00_99_ff;
const COLOR_WON: u32 = 0x00_ff_00;
const COLOR_LOST: u32 = 0xff_00_00;
const COLOR_NEUTRAL: u32 = 0xff_d7_00;

/// Renders games into the channel a command was invoked in.
pub struct DiscordNotifier<'a> {
    ctx: poise::Context<'a, BotData, Error>,
    settings: GameSettings,
    handle: Mutex<Option<ReplyHandle<'a>>>,
}

impl<'a> DiscordNotifier<'a> {
    /// Creates a notifier for the invoking user of `ctx`.
    #[must_use]
    pub fn new(ctx: poise::Context<'a, BotData, Error>) -> Self {
        Self {
            settings: ctx.data().config.games.clone(),
            ctx,
            handle: Mutex::new(None),
        }
    }

    fn custom_id(&self, choice: Choice) -> String {
        format!("{}:{}", self.ctx.id(), choice.id())
    }

    fn parse_custom_id(&self, custom_id: &str) -> Option<Choice> {
        let (invocation, choice) = custom_id.split_once(':')?;
        if invocation != self.ctx.id().to_string() {
            return None;
        }
        Choice::from_id(choice)
    }

    fn buttons(&self, choices: &[Choice]) -> Vec<serenity::CreateActionRow> {
        if choices.is_empty() {
            return Vec::new();
        }
        let buttons = choices
            .iter()
            .map(|choice| {
                serenity::CreateButton::new(self.custom_id(*choice))
                    .label(choice.label())
                    .style(serenity::ButtonStyle::Primary)
            })
            .collect();
        vec![serenity::CreateActionRow::Buttons(buttons)]
    }

    async fn show(&self, embed: serenity::CreateEmbed, choices: &[Choice]) -> Result<()> {
        let reply = CreateReply::default()
            .embed(embed)
            .components(self.buttons(choices));
        let mut handle = self.handle.lock().await;
        match handle.as_ref() {
            Some(existing) => existing.edit(self.ctx, reply).await?,
            None => *handle = Some(self.ctx.send(reply).await?),
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier<'_> {
    async fn present(&self, view: GameView) -> Result<()> {
        match view {
            GameView::Blackjack(table) => {
                if table.phase == Phase::DealerTurn || table.outcome.is_some() {
                    tokio::time::sleep(self.settings.dealer_delay()).await;
                }
                let choices: &[Choice] = if table.phase == Phase::PlayerTurn {
                    &Choice::BLACKJACK
                } else {
                    &[]
                };
                self.show(blackjack_embed(&table), choices).await
            }
            GameView::HigherLowerRedraw => self.show(redraw_embed(), &[]).await,
            GameView::HigherLowerPrompt { shown } => {
                let embed = serenity::CreateEmbed::default()
                    .title("Higher or Lower")
                    .description(format!(
                        "The number is **{shown}**.\nIs the hidden number higher or lower?"
                    ))
                    .color(COLOR_PLAYING);
                self.show(embed, &Choice::HIGHER_LOWER).await
            }
            GameView::HigherLowerResult(report) => {
                self.show(higher_lower_embed(&report), &[]).await
            }
            GameView::RouletteSpinning { pocket } => {
                let embed = serenity::CreateEmbed::default()
                    .title("Roulette")
                    .description(format!("The wheel is spinning... {}", pocket_label(pocket)))
                    .color(COLOR_PLAYING);
                self.show(embed, &[]).await?;
                tokio::time::sleep(self.settings.spin_delay()).await;
                Ok(())
            }
            GameView::RouletteResult(report) => self.show(roulette_embed(&report), &[]).await,
        }
    }

    async fn await_choice(&self, allowed: &[Choice]) -> Result<Choice> {
        let message_id = {
            let handle = self.handle.lock().await;
            let Some(handle) = handle.as_ref() else {
                return Err(serenity::Error::Other("no game message to collect clicks on").into());
            };
            handle.message().await?.id
        };

        loop {
            let Some(interaction) =
                serenity::ComponentInteractionCollector::new(self.ctx.serenity_context())
                    .message_id(message_id)
                    .author_id(self.ctx.author().id)
                    .await
            else {
                return Err(serenity::Error::Other("component collector closed").into());
            };

            interaction
                .create_response(
                    self.ctx.serenity_context(),
                    serenity::CreateInteractionResponse::Acknowledge,
                )
                .await?;

            match self.parse_custom_id(&interaction.data.custom_id) {
                Some(choice) if allowed.contains(&choice) => return Ok(choice),
                other => debug!(custom_id = %interaction.data.custom_id, ?other, "ignoring click"),
            }
        }
    }
}

fn hand_line(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn pocket_label(pocket: Pocket) -> String {
    let marker = match pocket.color {
        Color::Green => "🟢",
        Color::Red => "🔴",
        Color::Black => "⚫",
    };
    format!("{marker} **{}**", pocket.number)
}

fn signed(net: i64) -> String {
    if net >= 0 {
        format!("+{net}")
    } else {
        net.to_string()
    }
}

fn blackjack_verdict(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Draw => "Draw! You get your bet back.",
        Outcome::Player => "You win!",
        Outcome::Dealer => "The dealer wins.",
        Outcome::Natural => "Blackjack! You win double.",
    }
}

fn blackjack_embed(table: &BlackjackView) -> serenity::CreateEmbed {
    let dealer_label = if table.phase == Phase::PlayerTurn {
        format!("{} ??", hand_line(&table.dealer))
    } else {
        hand_line(&table.dealer)
    };
    let mut embed = serenity::CreateEmbed::default()
        .title("Blackjack")
        .fields(vec![
            (
                format!("Your hand ({})", table.player_total),
                hand_line(&table.player),
                true,
            ),
            (
                format!("Dealer ({})", table.dealer_total),
                dealer_label,
                true,
            ),
        ])
        .color(COLOR_PLAYING);

    if let (Some(outcome), Some(net), Some(balance)) = (table.outcome, table.net, table.balance) {
        let color = match outcome {
            Outcome::Player | Outcome::Natural => COLOR_WON,
            Outcome::Dealer => COLOR_LOST,
            Outcome::Draw => COLOR_NEUTRAL,
        };
        embed = embed
            .description(blackjack_verdict(outcome))
            .color(color)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} coins · balance {balance}",
                signed(net)
            )));
    }
    embed
}

fn roulette_embed(report: &RouletteReport) -> serenity::CreateEmbed {
    let verdict = if report.won { "You win!" } else { "You lose." };
    serenity::CreateEmbed::default()
        .title("Roulette")
        .description(format!(
            "The ball landed on {}.\nYou bet on **{}**. {verdict}",
            pocket_label(report.pocket),
            report.bet
        ))
        .color(if report.won { COLOR_WON } else { COLOR_LOST })
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} coins · balance {}",
            signed(report.net),
            report.balance
        )))
}

fn redraw_embed() -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title("Higher or Lower")
        .description("Both numbers were identical. Drawing again...")
        .color(COLOR_NEUTRAL)
}

fn higher_lower_embed(report: &HigherLowerReport) -> serenity::CreateEmbed {
    let verdict = if report.won { "Correct!" } else { "Wrong guess." };
    serenity::CreateEmbed::default()
        .title("Higher or Lower")
        .description(format!(
            "The number was **{}**, the hidden number was **{}**. {verdict}",
            report.shown, report.hidden
        ))
        .color(if report.won { COLOR_WON } else { COLOR_LOST })
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} coins · balance {}",
            signed(report.net),
            report.balance
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cards::{Rank, Suit};

    #[test]
    fn test_hand_line_joins_cards() {
        let cards = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Number(7), Suit::Hearts),
        ];
        let line = hand_line(&cards);
        assert_eq!(line.split(' ').count(), 2);
        assert_eq!(line, format!("{} {}", cards[0], cards[1]));
    }

    #[test]
    fn test_signed_amounts() {
        assert_eq!(signed(50), "+50");
        assert_eq!(signed(0), "+0");
        assert_eq!(signed(-20), "-20");
    }

    #[test]
    fn test_redraw_embed_tells_the_player() {
        let rendered = format!("{:?}", redraw_embed());
        assert!(rendered.contains("identical"));
        assert!(rendered.contains("Higher or Lower"));
    }

    #[test]
    fn test_pocket_label_marks_color() {
        let label = pocket_label(Pocket {
            number: 0,
            color: Color::Green,
        });
        assert!(label.starts_with("🟢"));
        assert!(label.contains("**0**"));
    }
}
