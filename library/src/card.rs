use enum_iterator::{all, Sequence};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

/// Suits in ascending Big Two order: diamonds are the weakest suit and
/// spades the strongest.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Sequence, Serialize, Deserialize, Hash,
)]
pub enum Suit {
    Diamonds,
    Clubs,
    Hearts,
    Spades,
}

impl Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Suit::Diamonds => "♦",
                Suit::Clubs => "♣",
                Suit::Hearts => "♥",
                Suit::Spades => "♠",
            }
        )
    }
}

/// Ranks in raw deck order: `Ace` is raw rank 0 and `King` is raw rank 12.
/// Gameplay never orders by this encoding; every comparison goes through
/// [`Rank::strength`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Sequence, Serialize, Deserialize, Hash)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    /// The comparison key used for all gameplay ordering: "3" remaps to 0
    /// and "2" to 12, making the two the strongest rank in the game.
    pub fn strength(self) -> u8 {
        (self as u8 + 11) % 13
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Rank::Ace => "A",
                Rank::Two => "2",
                Rank::Three => "3",
                Rank::Four => "4",
                Rank::Five => "5",
                Rank::Six => "6",
                Rank::Seven => "7",
                Rank::Eight => "8",
                Rank::Nine => "9",
                Rank::Ten => "T",
                Rank::Jack => "J",
                Rank::Queen => "Q",
                Rank::King => "K",
            }
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Sequence, Serialize, Deserialize, Hash)]
pub struct Card(pub Suit, pub Rank);

impl Card {
    pub fn suit(self) -> Suit {
        self.0
    }

    pub fn rank(self) -> Rank {
        self.1
    }

    pub fn strength(self) -> u8 {
        self.1.strength()
    }
}

/// Cards order by remapped rank, with the suit breaking ties.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.strength()
            .cmp(&other.strength())
            .then(self.0.cmp(&other.0))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.1, self.0)
    }
}

/// The card that must be part of the very first play of a round.
pub const OPENING_CARD: Card = Card(Suit::Diamonds, Rank::Three);

/// The 52 distinct cards of a Big Two deck.
pub fn deck() -> Vec<Card> {
    all::<Card>().collect()
}

pub fn shuffled<R>(rng: &mut R) -> Vec<Card>
where
    R: Rng + ?Sized,
{
    use rand::seq::SliceRandom;

    let mut deck = deck();
    deck.shuffle(rng);
    deck
}

/// Splits a deck into four equal piles in seat order.
pub fn dealt(mut deck: Vec<Card>) -> [Vec<Card>; 4] {
    let len = deck.len();
    let range = 0..len / 4;
    [
        deck.drain(range.clone()).collect(),
        deck.drain(range.clone()).collect(),
        deck.drain(range.clone()).collect(),
        deck.drain(range).collect(),
    ]
}

// Test shorthand for card lists, "3D 9S TC" style.
#[cfg(test)]
pub(crate) fn cards(s: &str) -> Vec<Card> {
    s.split(' ')
        .map(|x| {
            let mut chars = x.chars();
            let rank = match chars.next().unwrap() {
                'A' => Rank::Ace,
                '2' => Rank::Two,
                '3' => Rank::Three,
                '4' => Rank::Four,
                '5' => Rank::Five,
                '6' => Rank::Six,
                '7' => Rank::Seven,
                '8' => Rank::Eight,
                '9' => Rank::Nine,
                'T' => Rank::Ten,
                'J' => Rank::Jack,
                'Q' => Rank::Queen,
                'K' => Rank::King,
                _ => todo!(),
            };
            let suit = match chars.next().unwrap() {
                'D' => Suit::Diamonds,
                'C' => Suit::Clubs,
                'H' => Suit::Hearts,
                'S' => Suit::Spades,
                _ => todo!(),
            };
            Card(suit, rank)
        })
        .collect()
}

#[test]
fn test_strength_remaps_threes_low_and_twos_high() {
    assert_eq!(Rank::Three.strength(), 0);
    assert_eq!(Rank::Four.strength(), 1);
    assert_eq!(Rank::Ace.strength(), 11);
    assert_eq!(Rank::Two.strength(), 12);
}

#[test]
fn test_card_ordering_uses_strength_then_suit() {
    assert!(Card(Suit::Clubs, Rank::Three) > Card(Suit::Diamonds, Rank::Three));
    assert!(Card(Suit::Diamonds, Rank::Four) > Card(Suit::Spades, Rank::Three));
    assert!(Card(Suit::Diamonds, Rank::Two) > Card(Suit::Spades, Rank::Ace));

    let mut deck = deck();
    deck.sort();
    assert_eq!(deck.first(), Some(&OPENING_CARD));
    assert_eq!(deck.last(), Some(&Card(Suit::Spades, Rank::Two)));
}

#[test]
fn test_deck_holds_every_card_once() {
    let deck = deck();
    assert_eq!(deck.len(), 52);
    let unique: std::collections::BTreeSet<_> = deck.into_iter().collect();
    assert_eq!(unique.len(), 52);
}

#[test]
fn test_dealt_splits_in_seat_order() {
    let deck = deck();
    let hands = dealt(deck.clone());
    for hand in &hands {
        assert_eq!(hand.len(), 13);
    }
    assert_eq!(hands[0], deck[..13]);
    assert_eq!(hands[3], deck[39..]);
}

#[test]
fn test_shuffled_preserves_the_card_set() {
    use rand::{rngs::StdRng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let mut shuffled = shuffled(&mut rng);
    shuffled.sort();
    let mut full = deck();
    full.sort();
    assert_eq!(shuffled, full);
}
