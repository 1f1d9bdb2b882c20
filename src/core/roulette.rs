//! Roulette wheel, bet parsing and payout rules.
//!
//! The wheel table has 38 pockets: zero appears twice (both green) and every
//! number from 1 to 36 once with its standard red/black coloring. A spin picks
//! one pocket uniformly.
//!
//! Payouts are deliberately uneven: a number or green bet wins 20x the stake,
//! red or black only pays half the stake.

use crate::errors::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Pocket color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Zero
    Green,
    /// Red numbers
    Red,
    /// Black numbers
    Black,
}

impl Color {
    /// Parses a case-insensitive color name.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "green" => Some(Self::Green),
            "red" => Some(Self::Red),
            "black" => Some(Self::Black),
            _ => None,
        }
    }

    /// Lowercase color name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single wheel pocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pocket {
    /// Number 0-36
    pub number: u8,
    /// Pocket color
    pub color: Color,
}

const fn pocket(number: u8, color: Color) -> Pocket {
    Pocket { number, color }
}

/// Pocket table in wheel order.
pub const WHEEL: [Pocket; 38] = {
    use Color::{Black, Green, Red};
    [
        pocket(0, Green),
        pocket(32, Red),
        pocket(15, Black),
        pocket(19, Red),
        pocket(4, Black),
        pocket(21, Red),
        pocket(2, Black),
        pocket(25, Red),
        pocket(17, Black),
        pocket(34, Red),
        pocket(6, Black),
        pocket(27, Red),
        pocket(13, Black),
        pocket(36, Red),
        pocket(11, Black),
        pocket(30, Red),
        pocket(8, Black),
        pocket(23, Red),
        pocket(10, Black),
        pocket(5, Red),
        pocket(24, Black),
        pocket(16, Red),
        pocket(33, Black),
        pocket(1, Red),
        pocket(20, Black),
        pocket(14, Red),
        pocket(31, Black),
        pocket(9, Red),
        pocket(22, Black),
        pocket(18, Red),
        pocket(29, Black),
        pocket(7, Red),
        pocket(28, Black),
        pocket(12, Red),
        pocket(35, Black),
        pocket(3, Red),
        pocket(26, Black),
        pocket(0, Green),
    ]
};

/// What the player bet on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bet {
    /// A single number 0-36
    Number(u8),
    /// A color
    Color(Color),
}

impl Bet {
    /// Winnings on a hit, as a multiple of the stake: 20x for numbers and
    /// green, half the stake for red or black.
    #[must_use]
    pub const fn winnings(self, stake: i64) -> i64 {
        match self {
            Self::Number(_) | Self::Color(Color::Green) => stake * 20,
            Self::Color(Color::Red | Color::Black) => stake / 2,
        }
    }

    /// Whether this bet wins on `pocket`.
    #[must_use]
    pub fn wins_on(self, pocket: Pocket) -> bool {
        match self {
            Self::Number(number) => number == pocket.number,
            Self::Color(color) => color == pocket.color,
        }
    }

    /// Balance change for `stake` once the wheel stopped on `pocket`.
    #[must_use]
    pub fn settle(self, stake: i64, pocket: Pocket) -> i64 {
        if self.wins_on(pocket) {
            self.winnings(stake)
        } else {
            -stake
        }
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Color(color) => write!(f, "{color}"),
        }
    }
}

/// Parses a roulette entry: "0" to "36" or a color name in any case.
pub fn validate_entry(input: &str) -> Result<Bet> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return match trimmed.parse::<u8>() {
            Ok(number) if number <= 36 => Ok(Bet::Number(number)),
            _ => Err(Error::InvalidEntry {
                input: input.to_string(),
            }),
        };
    }
    Color::parse(trimmed)
        .map(Bet::Color)
        .ok_or_else(|| Error::InvalidEntry {
            input: input.to_string(),
        })
}

/// Picks one pocket uniformly from the wheel table.
pub fn spin<R: Rng + ?Sized>(rng: &mut R) -> Pocket {
    // The table is non-empty, so choose always yields a pocket.
    WHEEL.choose(rng).copied().unwrap_or(WHEEL[0])
}
