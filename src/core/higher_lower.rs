//! Higher-Lower: guess whether a hidden number is above or below a shown one.
//!
//! Both numbers are drawn from 0 to 100. Identical draws are redrawn before any
//! guess counts. Only a fifth of the nominal bet is at stake either way.

use rand::Rng;

/// Largest number that can be drawn.
pub const MAX_NUMBER: u8 = 100;

/// The player's guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guess {
    /// Hidden number is greater
    Higher,
    /// Hidden number is smaller
    Lower,
}

impl Guess {
    /// Parses "higher" or "lower".
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "higher" => Some(Self::Higher),
            "lower" => Some(Self::Lower),
            _ => None,
        }
    }
}

/// One Higher-Lower round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HigherLowerRound {
    shown: u8,
    hidden: u8,
    bet: i64,
}

impl HigherLowerRound {
    /// Draws a fresh pair of numbers.
    pub fn new<R: Rng + ?Sized>(bet: i64, rng: &mut R) -> Self {
        let mut round = Self {
            shown: 0,
            hidden: 0,
            bet,
        };
        round.draw_numbers(rng);
        round
    }

    /// Builds a round from fixed numbers.
    #[must_use]
    pub const fn with_numbers(bet: i64, shown: u8, hidden: u8) -> Self {
        Self { shown, hidden, bet }
    }

    /// Redraws both numbers.
    pub fn draw_numbers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.hidden = rng.gen_range(0..=MAX_NUMBER);
        self.shown = rng.gen_range(0..=MAX_NUMBER);
    }

    /// Both numbers are equal and the round has to be redrawn.
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.shown == self.hidden
    }

    /// The number shown to the player.
    #[must_use]
    pub const fn shown(&self) -> u8 {
        self.shown
    }

    /// The number the player guesses against.
    #[must_use]
    pub const fn hidden(&self) -> u8 {
        self.hidden
    }

    /// Nominal bet.
    #[must_use]
    pub const fn bet(&self) -> i64 {
        self.bet
    }

    /// Whether `guess` is right.
    #[must_use]
    pub const fn won(&self, guess: Guess) -> bool {
        match guess {
            Guess::Higher => self.hidden > self.shown,
            Guess::Lower => self.hidden < self.shown,
        }
    }

    /// Coins actually at stake: a fifth of the bet.
    #[must_use]
    pub const fn stake(&self) -> i64 {
        self.bet / 5
    }

    /// Balance change for `guess`.
    #[must_use]
    pub const fn settle(&self, guess: Guess) -> i64 {
        if self.won(guess) {
            self.stake()
        } else {
            -self.stake()
        }
    }
}
