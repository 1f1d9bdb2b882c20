//! Playing cards for Blackjack: ranks, suits, a single 52-card deck and hand scoring.
//!
//! The deck is shuffled once when it is created and then drawn from the back, so
//! every card is dealt at most once per round and an exhausted deck simply
//! returns `None`.

use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Card rank. Jack, Queen and King count 10, Ace counts 1 or 11.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    /// Ace
    Ace,
    /// Numeric rank 2-10
    Number(u8),
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
}

impl Rank {
    /// All 13 ranks in deck order.
    pub const ALL: [Self; 13] = [
        Self::Ace,
        Self::Number(2),
        Self::Number(3),
        Self::Number(4),
        Self::Number(5),
        Self::Number(6),
        Self::Number(7),
        Self::Number(8),
        Self::Number(9),
        Self::Number(10),
        Self::Jack,
        Self::Queen,
        Self::King,
    ];

    /// Value of a non-ace rank. Aces are resolved by [`Hand::total`].
    #[must_use]
    pub const fn base_value(self) -> u32 {
        match self {
            Self::Ace => 11,
            Self::Number(n) => n as u32,
            Self::Jack | Self::Queen | Self::King => 10,
        }
    }

    /// Short label used on the table ("A", "7", "K").
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Ace => "A".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Jack => "J".to_string(),
            Self::Queen => "Q".to_string(),
            Self::King => "K".to_string(),
        }
    }
}

/// Card suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suit {
    /// Hearts
    Hearts,
    /// Spades
    Spades,
    /// Diamonds
    Diamonds,
    /// Clubs
    Clubs,
}

impl Suit {
    /// All four suits.
    pub const ALL: [Self; 4] = [Self::Hearts, Self::Spades, Self::Diamonds, Self::Clubs];

    const fn symbol(self) -> char {
        match self {
            Self::Hearts => '♥',
            Self::Spades => '♠',
            Self::Diamonds => '♦',
            Self::Clubs => '♣',
        }
    }
}

/// A single playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    /// Rank of the card
    pub rank: Rank,
    /// Suit of the card
    pub suit: Suit,
}

impl Card {
    /// Creates a card.
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.label(), self.suit.symbol())
    }
}

/// One 52-card deck, consumed without replacement.
#[derive(Clone, Debug)]
pub struct Deck {
    // Next card is at the back.
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a full deck and shuffles it with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards: Vec<Card> = Rank::ALL
            .iter()
            .flat_map(|&rank| Suit::ALL.iter().map(move |&suit| Card::new(rank, suit)))
            .collect();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Builds a deck that deals `cards` in the given order.
    #[must_use]
    pub fn stacked(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the next card, or `None` when the deck is empty.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Cards left in the deck.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Whether `card` has not been dealt yet.
    #[must_use]
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }
}

/// Cards held by one side of the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    total: u32,
    standing: bool,
}

impl Hand {
    /// Creates an empty hand.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a hand holding `cards`.
    #[must_use]
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut hand = Self::new();
        for &card in cards {
            hand.push(card);
        }
        hand
    }

    /// Adds a card and rescores the whole hand.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
        self.total = score(&self.cards);
    }

    /// Cards in the order they were drawn.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Current score.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Whether this side has stopped drawing.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        self.standing
    }

    /// Marks this side as standing.
    pub const fn stand(&mut self) {
        self.standing = true;
    }

    /// Total above 21.
    #[must_use]
    pub const fn is_bust(&self) -> bool {
        self.total > 21
    }

    /// Exactly two cards totalling 21.
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.total == 21 && self.cards.len() == 2
    }

    /// Whether the hand holds at least one ace.
    #[must_use]
    pub fn has_ace(&self) -> bool {
        self.cards.iter().any(|card| card.rank == Rank::Ace)
    }
}

/// Scores a set of cards: every ace starts at 11 and is demoted to 1, one at a
/// time, while the total is above 21.
#[must_use]
pub fn score(cards: &[Card]) -> u32 {
    let aces = cards.iter().filter(|card| card.rank == Rank::Ace).count();
    let mut total: u32 = cards.iter().map(|card| card.rank.base_value()).sum();
    let mut soft_aces = aces;
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    const fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Hearts)
    }

    #[test]
    fn test_ace_king_is_natural() {
        let hand = Hand::from_cards(&[card(Rank::Ace), card(Rank::King)]);
        assert_eq!(hand.total(), 21);
        assert!(hand.is_natural());
        assert!(!hand.is_bust());
    }

    #[test]
    fn test_two_aces_and_nine() {
        let hand = Hand::from_cards(&[card(Rank::Ace), card(Rank::Ace), card(Rank::Number(9))]);
        assert_eq!(hand.total(), 21);
        assert!(!hand.is_natural());
    }

    #[test]
    fn test_ace_only_demoted_when_over_21() {
        let soft = Hand::from_cards(&[card(Rank::Ace), card(Rank::Number(6))]);
        assert_eq!(soft.total(), 17);

        let mut hand = soft;
        hand.push(card(Rank::Number(9)));
        assert_eq!(hand.total(), 16);

        let four_aces = Hand::from_cards(&[card(Rank::Ace); 4]);
        assert_eq!(four_aces.total(), 14);
    }

    #[test]
    fn test_face_cards_count_ten() {
        let hand = Hand::from_cards(&[card(Rank::Jack), card(Rank::Queen), card(Rank::King)]);
        assert_eq!(hand.total(), 30);
        assert!(hand.is_bust());
    }

    #[test]
    fn test_twenty_one_with_three_cards_is_not_natural() {
        let hand = Hand::from_cards(&[
            card(Rank::Number(7)),
            card(Rank::Number(7)),
            card(Rank::Number(7)),
        ]);
        assert_eq!(hand.total(), 21);
        assert!(!hand.is_natural());
    }

    #[test]
    fn test_shuffled_deck_deals_each_card_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.remaining(), 52);

        let mut seen = HashSet::new();
        while let Some(card) = deck.draw() {
            assert!(seen.insert(card), "{card} dealt twice");
            assert!(!deck.contains(card));
        }
        assert_eq!(seen.len(), 52);
        assert!(deck.draw().is_none());
    }

    #[test]
    fn test_stacked_deck_deals_in_order() {
        let mut deck = Deck::stacked(vec![card(Rank::Ace), card(Rank::Number(2))]);
        assert_eq!(deck.draw(), Some(card(Rank::Ace)));
        assert_eq!(deck.draw(), Some(card(Rank::Number(2))));
        assert_eq!(deck.draw(), None);
    }
}
