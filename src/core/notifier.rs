//! Presentation seam between the game engines and the chat transport.
//!
//! The economy describes what the player should see as a [`GameView`] and asks
//! for the next decision with [`Notifier::await_choice`]. The Discord adapter in
//! `bot::handlers::notifier` renders views as embeds with buttons.

use crate::core::{
    blackjack::{BlackjackRound, Outcome, Phase},
    cards::Card,
    higher_lower::Guess,
    play::{HigherLowerReport, RouletteReport},
    roulette::Pocket,
};
use crate::errors::Result;
use async_trait::async_trait;

/// A decision the player can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Blackjack: take a card
    Draw,
    /// Blackjack: keep the hand
    Stand,
    /// Higher-Lower: hidden number is greater
    Higher,
    /// Higher-Lower: hidden number is smaller
    Lower,
}

impl Choice {
    /// Blackjack decisions.
    pub const BLACKJACK: [Self; 2] = [Self::Draw, Self::Stand];
    /// Higher-Lower decisions.
    pub const HIGHER_LOWER: [Self; 2] = [Self::Higher, Self::Lower];

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Stand => "Stand",
            Self::Higher => "Higher",
            Self::Lower => "Lower",
        }
    }

    /// Stable identifier used in component ids.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Stand => "stand",
            Self::Higher => "higher",
            Self::Lower => "lower",
        }
    }

    /// Inverse of [`Self::id`].
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::Draw, Self::Stand, Self::Higher, Self::Lower]
            .into_iter()
            .find(|choice| choice.id() == id)
    }

    /// The Higher-Lower guess this choice stands for.
    #[must_use]
    pub const fn guess(self) -> Option<Guess> {
        match self {
            Self::Higher => Some(Guess::Higher),
            Self::Lower => Some(Guess::Lower),
            Self::Draw | Self::Stand => None,
        }
    }
}

/// Snapshot of a Blackjack table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlackjackView {
    /// Player cards
    pub player: Vec<Card>,
    /// Player score
    pub player_total: u32,
    /// Dealer cards visible to the player (only the first during the player turn)
    pub dealer: Vec<Card>,
    /// Dealer score of the visible cards
    pub dealer_total: u32,
    /// Round phase
    pub phase: Phase,
    /// Result, once settled
    pub outcome: Option<Outcome>,
    /// Balance change applied at settlement
    pub net: Option<i64>,
    /// Balance after settlement
    pub balance: Option<i64>,
}

impl BlackjackView {
    /// Snapshot of `round`, hiding the dealer's hole card during the player turn.
    #[must_use]
    pub fn of(round: &BlackjackRound) -> Self {
        let phase = round.phase();
        let dealer: Vec<Card> = if phase == Phase::PlayerTurn {
            round.dealer().cards().iter().take(1).copied().collect()
        } else {
            round.dealer().cards().to_vec()
        };
        Self {
            player: round.player().cards().to_vec(),
            player_total: round.player().total(),
            dealer_total: crate::core::cards::score(&dealer),
            dealer,
            phase,
            outcome: None,
            net: None,
            balance: None,
        }
    }
}

/// Everything the economy may show to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameView {
    /// Blackjack table state
    Blackjack(BlackjackView),
    /// Higher-Lower number on display, waiting for a guess
    HigherLowerPrompt {
        /// Number shown
        shown: u8,
    },
    /// Both numbers were equal and have been redrawn
    HigherLowerRedraw,
    /// Higher-Lower result
    HigherLowerResult(HigherLowerReport),
    /// Roulette wheel still turning
    RouletteSpinning {
        /// Pocket passing the marker
        pocket: Pocket,
    },
    /// Roulette result
    RouletteResult(RouletteReport),
}

/// Shows game state to a player and collects their decisions.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows `view` to the player.
    async fn present(&self, view: GameView) -> Result<()>;

    /// Waits for the player to pick one of `allowed`.
    ///
    /// This is the only suspension point of a game; the caller bounds it with
    /// the round timeout.
    async fn await_choice(&self, allowed: &[Choice]) -> Result<Choice>;
}
