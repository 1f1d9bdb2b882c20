//! Blackjack round state machine.
//!
//! A round deals two cards to the player and two to the dealer, then accepts
//! `Draw`/`Stand` decisions until the player stands or busts. The dealer plays
//! automatically afterwards and the round is settled once both sides stand.
//!
//! The engine is synchronous and owns no I/O; driving it against a player and
//! settling the result is done by [`crate::core::economy::Economy`].

use crate::core::cards::{Card, Deck, Hand};
use crate::errors::{Error, Result};

/// Where the round currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player's next decision
    PlayerTurn,
    /// Player is done, dealer draws automatically
    DealerTurn,
    /// Both sides stand
    Settled,
}

/// A player decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Take another card
    Draw,
    /// Keep the current hand
    Stand,
}

/// Who won the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Stake is returned
    Draw,
    /// Player wins
    Player,
    /// Dealer wins, stake is lost
    Dealer,
    /// Player won with a natural blackjack the dealer did not match
    Natural,
}

impl Outcome {
    /// Gross amount paid back for a stake of `bet`, including the stake itself.
    #[must_use]
    pub const fn payout(self, bet: i64) -> i64 {
        match self {
            Self::Draw => bet,
            Self::Player => bet * 2,
            Self::Dealer => 0,
            Self::Natural => bet * 5 / 2,
        }
    }

    /// Balance change for a stake of `bet` that was never debited up front.
    #[must_use]
    pub const fn net(self, bet: i64) -> i64 {
        self.payout(bet) - bet
    }
}

/// One round of Blackjack.
#[derive(Clone, Debug)]
pub struct BlackjackRound {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    bet: i64,
    natural_player: bool,
}

impl BlackjackRound {
    /// Deals the opening hands from `deck`.
    ///
    /// A player natural is recorded and forces the player to stand, so the
    /// round starts directly in [`Phase::DealerTurn`].
    pub fn deal(bet: i64, deck: Deck) -> Result<Self> {
        let mut round = Self {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            bet,
            natural_player: false,
        };
        for _ in 0..2 {
            round.draw_player()?;
        }
        round.natural_player = round.player.is_natural();
        for _ in 0..2 {
            round.draw_dealer()?;
        }
        if round.natural_player {
            round.player.stand();
        }
        Ok(round)
    }

    /// Stake of this round.
    #[must_use]
    pub const fn bet(&self) -> i64 {
        self.bet
    }

    /// The player's hand.
    #[must_use]
    pub const fn player(&self) -> &Hand {
        &self.player
    }

    /// The dealer's hand.
    #[must_use]
    pub const fn dealer(&self) -> &Hand {
        &self.dealer
    }

    /// Whether the opening player hand was a natural.
    #[must_use]
    pub const fn natural_player(&self) -> bool {
        self.natural_player
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match (self.player.is_standing(), self.dealer.is_standing()) {
            (false, _) => Phase::PlayerTurn,
            (true, false) => Phase::DealerTurn,
            (true, true) => Phase::Settled,
        }
    }

    /// Both sides stand.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase(), Phase::Settled)
    }

    fn draw_player(&mut self) -> Result<Card> {
        let card = self.deck.draw().ok_or(Error::DeckExhausted)?;
        self.player.push(card);
        Ok(card)
    }

    fn draw_dealer(&mut self) -> Result<Card> {
        let card = self.deck.draw().ok_or(Error::DeckExhausted)?;
        self.dealer.push(card);
        Ok(card)
    }

    /// Applies a player decision. Ignored outside [`Phase::PlayerTurn`].
    ///
    /// Drawing into a bust stands the player automatically.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        if self.phase() != Phase::PlayerTurn {
            return Ok(());
        }
        match action {
            Action::Draw => {
                self.draw_player()?;
                if self.player.is_bust() {
                    self.player.stand();
                }
            }
            Action::Stand => self.player.stand(),
        }
        Ok(())
    }

    /// Whether the dealer takes another card.
    ///
    /// The dealer draws under 17, draws while behind a non-busted player, and
    /// keeps drawing with an ace in hand while still behind the player unless
    /// already above 17 against a busted player.
    #[must_use]
    pub fn dealer_should_draw(&self) -> bool {
        let dealer = self.dealer.total();
        let player = self.player.total();
        let player_bust = self.player.is_bust();

        if self.dealer.has_ace() && !(dealer > 17 && player_bust) && dealer < player {
            return true;
        }
        dealer < 17 || (dealer < player && !player_bust)
    }

    /// Plays one dealer step: draws a card when [`Self::dealer_should_draw`]
    /// holds, otherwise stands. Returns the drawn card, if any.
    ///
    /// A busted player ends the round without further dealer cards.
    pub fn dealer_step(&mut self) -> Result<Option<Card>> {
        if self.phase() != Phase::DealerTurn {
            return Ok(None);
        }
        if self.player.is_bust() || !self.dealer_should_draw() {
            self.dealer.stand();
            return Ok(None);
        }
        let card = self.draw_dealer()?;
        if self.dealer.is_bust() {
            self.dealer.stand();
        }
        Ok(Some(card))
    }

    /// Runs the dealer turn to completion.
    pub fn play_dealer(&mut self) -> Result<()> {
        while self.phase() == Phase::DealerTurn {
            self.dealer_step()?;
        }
        Ok(())
    }

    fn natural_beats_dealer(&self) -> bool {
        self.player.is_natural() && !self.dealer.is_natural()
    }

    /// Decides the winner from the current hands.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let player = self.player.total();
        let dealer = self.dealer.total();
        let player_bust = self.player.is_bust();
        let dealer_bust = self.dealer.is_bust();

        let tied = player == dealer && !player_bust && !dealer_bust;
        if tied || (player_bust && dealer_bust) {
            return if self.natural_beats_dealer() {
                Outcome::Natural
            } else {
                Outcome::Draw
            };
        }
        if player_bust {
            return Outcome::Dealer;
        }
        if dealer_bust || player > dealer {
            return if self.natural_beats_dealer() {
                Outcome::Natural
            } else {
                Outcome::Player
            };
        }
        Outcome::Dealer
    }

    /// Gross payout for this round's stake.
    #[must_use]
    pub fn payout(&self) -> i64 {
        self.outcome().payout(self.bet)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::cards::{Rank, Suit};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const fn c(rank: Rank) -> Card {
        Card::new(rank, Suit::Spades)
    }

    const fn n(value: u8) -> Card {
        c(Rank::Number(value))
    }

    /// Player gets the first two cards, dealer the next two, then draws follow.
    fn deal_stacked(cards: Vec<Card>, bet: i64) -> BlackjackRound {
        BlackjackRound::deal(bet, Deck::stacked(cards)).unwrap()
    }

    #[test]
    fn test_deal_gives_two_cards_each() {
        let round = deal_stacked(vec![n(2), n(3), n(4), n(5)], 10);
        assert_eq!(round.player().cards(), &[n(2), n(3)]);
        assert_eq!(round.dealer().cards(), &[n(4), n(5)]);
        assert_eq!(round.phase(), Phase::PlayerTurn);
    }

    #[test]
    fn test_natural_forces_player_to_stand() {
        let round = deal_stacked(vec![c(Rank::Ace), c(Rank::King), n(9), n(8)], 10);
        assert!(round.natural_player());
        assert_eq!(round.phase(), Phase::DealerTurn);
    }

    #[test]
    fn test_draw_into_bust_stands_player() -> Result<()> {
        let mut round = deal_stacked(vec![c(Rank::King), n(8), n(9), n(8), c(Rank::Queen)], 10);
        round.apply(Action::Draw)?;
        assert!(round.player().is_bust());
        assert_eq!(round.phase(), Phase::DealerTurn);

        round.play_dealer()?;
        assert_eq!(round.dealer().cards().len(), 2);
        assert_eq!(round.outcome(), Outcome::Dealer);
        assert_eq!(round.payout(), 0);
        Ok(())
    }

    #[test]
    fn test_actions_ignored_after_stand() -> Result<()> {
        let mut round = deal_stacked(vec![n(10), n(8), n(10), n(9), n(2)], 10);
        round.apply(Action::Stand)?;
        round.apply(Action::Draw)?;
        assert_eq!(round.player().cards().len(), 2);
        Ok(())
    }

    #[test]
    fn test_dealer_draws_below_17() -> Result<()> {
        let mut round = deal_stacked(vec![n(10), n(2), n(10), n(5), n(2), n(9)], 10);
        round.apply(Action::Stand)?;
        assert!(round.dealer_should_draw());
        round.play_dealer()?;
        // 15 -> 17 stands against a player on 12
        assert_eq!(round.dealer().total(), 17);
        assert_eq!(round.outcome(), Outcome::Dealer);
        Ok(())
    }

    #[test]
    fn test_dealer_chases_higher_player() -> Result<()> {
        let mut round = deal_stacked(vec![n(10), n(9), n(10), n(7), n(3)], 10);
        round.apply(Action::Stand)?;
        // 17 is behind 19, so the dealer draws once more
        assert!(round.dealer_should_draw());
        round.play_dealer()?;
        assert_eq!(round.dealer().total(), 20);
        assert_eq!(round.outcome(), Outcome::Dealer);
        Ok(())
    }

    #[test]
    fn test_dealer_ace_clause() {
        // Dealer soft 18 vs player 20: behind, holds an ace -> draws
        let mut round = deal_stacked(vec![n(10), n(10), c(Rank::Ace), n(7)], 10);
        round.player.stand();
        assert!(round.dealer_should_draw());

        // Dealer 18 with an ace level with player 18: no clause applies
        let mut level = deal_stacked(vec![n(10), n(8), c(Rank::Ace), n(7)], 10);
        level.player.stand();
        assert!(!level.dealer_should_draw());
    }

    #[test]
    fn test_player_beats_busted_dealer() -> Result<()> {
        let mut round = deal_stacked(vec![n(10), n(10), n(10), n(6), n(6)], 100);
        round.apply(Action::Stand)?;
        round.play_dealer()?;
        assert_eq!(round.dealer().total(), 22);
        assert_eq!(round.outcome(), Outcome::Player);
        assert_eq!(round.payout(), 200);
        Ok(())
    }

    #[test]
    fn test_equal_totals_draw() -> Result<()> {
        let mut round = deal_stacked(vec![n(10), n(9), n(10), n(9)], 40);
        round.apply(Action::Stand)?;
        round.play_dealer()?;
        assert_eq!(round.outcome(), Outcome::Draw);
        assert_eq!(round.payout(), 40);
        assert_eq!(Outcome::Draw.net(40), 0);
        Ok(())
    }

    #[test]
    fn test_natural_beats_three_card_21() -> Result<()> {
        let mut round = deal_stacked(
            vec![c(Rank::Ace), c(Rank::Queen), n(5), n(6), c(Rank::King)],
            100,
        );
        round.play_dealer()?;
        assert_eq!(round.dealer().total(), 21);
        assert_eq!(round.outcome(), Outcome::Natural);
        assert_eq!(round.payout(), 250);
        assert_eq!(Outcome::Natural.net(100), 150);
        Ok(())
    }

    #[test]
    fn test_both_naturals_draw() -> Result<()> {
        let mut round = deal_stacked(
            vec![c(Rank::Ace), c(Rank::Queen), c(Rank::Ace), c(Rank::King)],
            100,
        );
        round.play_dealer()?;
        assert_eq!(round.outcome(), Outcome::Draw);
        Ok(())
    }

    #[test]
    fn test_payout_table() {
        assert_eq!(Outcome::Player.payout(30), 60);
        assert_eq!(Outcome::Dealer.payout(30), 0);
        assert_eq!(Outcome::Draw.payout(30), 30);
        assert_eq!(Outcome::Natural.payout(30), 75);
        assert_eq!(Outcome::Dealer.net(30), -30);
        assert_eq!(Outcome::Player.net(30), 30);
    }

    #[test]
    fn test_random_rounds_always_settle() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let mut round = BlackjackRound::deal(10, Deck::shuffled(&mut rng))?;
            while round.phase() == Phase::PlayerTurn {
                let action = if round.player().total() < 15 {
                    Action::Draw
                } else {
                    Action::Stand
                };
                round.apply(action)?;
            }
            round.play_dealer()?;
            assert!(round.is_over());
            assert!([0, 10, 20, 25].contains(&round.payout()));
        }
        Ok(())
    }
}
