//! Game drivers: run one round of a game against a [`Notifier`].
//!
//! Each driver holds the player's [`SessionGuard`](crate::core::session::SessionGuard)
//! for the whole round, so the player is released on every exit path. Waiting
//! for a decision is bounded by the configured round timeout; an abandoned
//! round settles nothing.

use crate::core::{
    blackjack::{Action, BlackjackRound, Phase},
    cards::Deck,
    economy::Economy,
    higher_lower::HigherLowerRound,
    notifier::{BlackjackView, Choice, GameView, Notifier},
    roulette::{self, Bet, Pocket},
    session::UserId,
};
use crate::errors::{Error, Result};
use tracing::{debug, info, instrument, warn};

/// Final state of a roulette round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouletteReport {
    /// What the player bet on
    pub bet: Bet,
    /// Where the ball landed
    pub pocket: Pocket,
    /// The bet hit
    pub won: bool,
    /// Balance change
    pub net: i64,
    /// Balance afterwards
    pub balance: i64,
}

/// Final state of a Higher-Lower round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HigherLowerReport {
    /// Number shown
    pub shown: u8,
    /// Number hidden
    pub hidden: u8,
    /// The guess was right
    pub won: bool,
    /// Balance change
    pub net: i64,
    /// Balance afterwards
    pub balance: i64,
}

impl Economy {
    /// Waits for one of `allowed`, ignoring anything else, within the round timeout.
    async fn next_choice(
        &self,
        user: UserId,
        notifier: &dyn Notifier,
        allowed: &[Choice],
    ) -> Result<Choice> {
        let budget = self.settings().round_timeout();
        let wait = async {
            loop {
                let choice = notifier.await_choice(allowed).await?;
                if allowed.contains(&choice) {
                    return Ok(choice);
                }
                debug!(user, ?choice, "ignoring choice");
            }
        };
        tokio::time::timeout(budget, wait).await.map_err(|_| {
            warn!(user, seconds = budget.as_secs(), "round abandoned");
            Error::RoundTimeout {
                seconds: budget.as_secs(),
            }
        })?
    }

    /// Applies `net` to the balance and returns the new balance.
    async fn settle(&self, user: UserId, net: i64) -> Result<i64> {
        if net == 0 {
            self.balance(user).await
        } else {
            self.ledger().adjust_balance(user, net).await
        }
    }

    /// Plays one round of Blackjack.
    #[instrument(skip(self, notifier))]
    pub async fn play_blackjack(
        &self,
        user: UserId,
        raw_bet: &str,
        notifier: &dyn Notifier,
    ) -> Result<BlackjackView> {
        let _session = self.sessions().try_enter(user)?;
        let bet = self.check_bet(user, raw_bet).await?;
        let deck = self.with_rng(|rng| Deck::shuffled(rng));
        let round = BlackjackRound::deal(bet, deck)?;
        self.run_blackjack(user, round, notifier).await
    }

    /// Drives a dealt round to settlement. The caller holds the session.
    pub(crate) async fn run_blackjack(
        &self,
        user: UserId,
        mut round: BlackjackRound,
        notifier: &dyn Notifier,
    ) -> Result<BlackjackView> {
        notifier
            .present(GameView::Blackjack(BlackjackView::of(&round)))
            .await?;

        while round.phase() == Phase::PlayerTurn {
            let action = match self.next_choice(user, notifier, &Choice::BLACKJACK).await? {
                Choice::Draw => Action::Draw,
                _ => Action::Stand,
            };
            round.apply(action)?;
            notifier
                .present(GameView::Blackjack(BlackjackView::of(&round)))
                .await?;
        }

        while round.phase() == Phase::DealerTurn {
            if round.dealer_step()?.is_some() {
                notifier
                    .present(GameView::Blackjack(BlackjackView::of(&round)))
                    .await?;
            }
        }

        let outcome = round.outcome();
        let net = outcome.net(round.bet());
        let balance = self.settle(user, net).await?;
        info!(user, ?outcome, net, balance, "blackjack settled");

        let mut view = BlackjackView::of(&round);
        view.outcome = Some(outcome);
        view.net = Some(net);
        view.balance = Some(balance);
        notifier.present(GameView::Blackjack(view.clone())).await?;
        Ok(view)
    }

    /// Plays one round of roulette on `entry`: a number 0 to 36 or a color.
    #[instrument(skip(self, notifier))]
    pub async fn play_roulette(
        &self,
        user: UserId,
        raw_bet: &str,
        entry: &str,
        notifier: &dyn Notifier,
    ) -> Result<RouletteReport> {
        let _session = self.sessions().try_enter(user)?;
        let stake = self.check_bet(user, raw_bet).await?;
        let bet = roulette::validate_entry(entry)?;

        let frames = self.settings().spin_frames;
        let (passing, pocket) = self.with_rng(|rng| {
            let passing: Vec<Pocket> = (0..frames).map(|_| roulette::spin(rng)).collect();
            (passing, roulette::spin(rng))
        });
        for pocket in passing {
            notifier.present(GameView::RouletteSpinning { pocket }).await?;
        }

        let net = bet.settle(stake, pocket);
        let balance = self.settle(user, net).await?;
        let report = RouletteReport {
            bet,
            pocket,
            won: bet.wins_on(pocket),
            net,
            balance,
        };
        info!(user, %bet, pocket = pocket.number, net, "roulette settled");
        notifier.present(GameView::RouletteResult(report)).await?;
        Ok(report)
    }

    /// Plays one round of Higher-Lower.
    #[instrument(skip(self, notifier))]
    pub async fn play_higher_lower(
        &self,
        user: UserId,
        raw_bet: &str,
        notifier: &dyn Notifier,
    ) -> Result<HigherLowerReport> {
        let _session = self.sessions().try_enter(user)?;
        let bet = self.check_bet(user, raw_bet).await?;
        let round = self.with_rng(|rng| HigherLowerRound::new(bet, rng));
        self.run_higher_lower(user, round, notifier).await
    }

    /// Drives a drawn round to settlement. The caller holds the session.
    pub(crate) async fn run_higher_lower(
        &self,
        user: UserId,
        mut round: HigherLowerRound,
        notifier: &dyn Notifier,
    ) -> Result<HigherLowerReport> {
        while round.is_identical() {
            notifier.present(GameView::HigherLowerRedraw).await?;
            self.with_rng(|rng| round.draw_numbers(rng));
        }
        notifier
            .present(GameView::HigherLowerPrompt {
                shown: round.shown(),
            })
            .await?;

        let guess = loop {
            let choice = self
                .next_choice(user, notifier, &Choice::HIGHER_LOWER)
                .await?;
            if let Some(guess) = choice.guess() {
                break guess;
            }
        };

        let net = round.settle(guess);
        let balance = self.settle(user, net).await?;
        let report = HigherLowerReport {
            shown: round.shown(),
            hidden: round.hidden(),
            won: round.won(guess),
            net,
            balance,
        };
        info!(user, ?guess, net, balance, "higher-lower settled");
        notifier.present(GameView::HigherLowerResult(report)).await?;
        Ok(report)
    }
}
