use crate::card::{Card, Rank};
use crate::seat::Seat;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

/// Hand categories in ascending strength order. For five-card hands a
/// later category beats any earlier one regardless of the cards in it;
/// one-, two- and three-card hands only ever meet their own category.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize, Hash,
)]
pub enum Category {
    Single,
    Pair,
    Triple,
    Straight,
    Flush,
    FullHouse,
    Quad,
    StraightFlush,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Single => "Single",
                Category::Pair => "Pair",
                Category::Triple => "Triple",
                Category::Straight => "Straight",
                Category::Flush => "Flush",
                Category::FullHouse => "FullHouse",
                Category::Quad => "Quad",
                Category::StraightFlush => "StraightFlush",
            }
        )
    }
}

/// A playable combination of cards together with the seat that played it.
/// A `Hand` only ever exists for card sets that satisfy the category's
/// predicate; classification happens at construction.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Hand {
    seat: Seat,
    category: Category,
    cards: Vec<Card>,
}

impl Hand {
    /// Classifies a selection of cards, or `None` if they form no known
    /// category. Five-card sets are tried as Quad, FullHouse,
    /// StraightFlush, Straight and finally Flush, so a straight flush is
    /// never reported as the weaker straight or flush it also resembles.
    pub fn compose(seat: Seat, mut cards: Vec<Card>) -> Option<Self> {
        cards.sort();
        let category = match cards.len() {
            1 => Some(Category::Single),
            2 if cards[0].rank() == cards[1].rank() => Some(Category::Pair),
            3 if cards.iter().map(|c| c.rank()).all_equal() => Some(Category::Triple),
            5 => five_card_category(&cards),
            _ => None,
        }?;
        Some(Self {
            seat,
            category,
            cards,
        })
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The cards of this hand, sorted by strength.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    /// The card this hand is compared by. For full houses and quads that
    /// is the highest card of the three- or four-of-a-kind group, not of
    /// the whole hand.
    pub fn top_card(&self) -> Card {
        match self.category {
            Category::FullHouse => self.group_top(3),
            Category::Quad => self.group_top(4),
            _ => *self.cards.last().unwrap(),
        }
    }

    // Highest card of the rank occurring `size` times. Located by counting
    // so the kicker's sorted position never matters.
    fn group_top(&self, size: usize) -> Card {
        let (rank, _) = self
            .cards
            .iter()
            .map(|c| c.rank())
            .counts()
            .into_iter()
            .find(|&(_, n)| n == size)
            .unwrap();
        *self
            .cards
            .iter()
            .filter(|c| c.rank() == rank)
            .max()
            .unwrap()
    }

    /// Whether this hand beats `incumbent` on the table. Hands of
    /// different sizes never beat each other; callers are expected to
    /// compare same-arity hands only.
    pub fn beats(&self, incumbent: &Hand) -> bool {
        if self.size() != incumbent.size() {
            return false;
        }
        if self.category != incumbent.category {
            return self.category > incumbent.category;
        }
        match self.category {
            // flushes compare by suit before looking at any rank
            Category::Flush => {
                let (a, b) = (self.top_card(), incumbent.top_card());
                a.suit().cmp(&b.suit()).then(a.cmp(&b)) == Ordering::Greater
            }
            _ => self.top_card() > incumbent.top_card(),
        }
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.category)?;
        for card in &self.cards {
            write!(f, " {card}")?;
        }
        Ok(())
    }
}

fn five_card_category(cards: &[Card]) -> Option<Category> {
    let straight = is_straight(cards);
    let flush = cards.iter().map(|c| c.suit()).all_equal();
    if is_quad(cards) {
        Some(Category::Quad)
    } else if is_full_house(cards) {
        Some(Category::FullHouse)
    } else if straight && flush {
        Some(Category::StraightFlush)
    } else if straight {
        Some(Category::Straight)
    } else if flush {
        Some(Category::Flush)
    } else {
        None
    }
}

// Cards arrive sorted by strength, so a four of a kind occupies either the
// first or the last four positions.
fn is_quad(cards: &[Card]) -> bool {
    cards[..4].iter().map(|c| c.rank()).all_equal()
        || cards[1..].iter().map(|c| c.rank()).all_equal()
}

fn is_full_house(cards: &[Card]) -> bool {
    let r: Vec<Rank> = cards.iter().map(|c| c.rank()).collect();
    (r[0] == r[2] && r[3] == r[4] && r[2] != r[3])
        || (r[0] == r[1] && r[2] == r[4] && r[1] != r[2])
}

// Strengths never wrap past 12: Q-K-A-2-3 is not consecutive under the
// remap and is no straight.
fn is_straight(cards: &[Card]) -> bool {
    cards
        .windows(2)
        .all(|w| w[0].strength() + 1 == w[1].strength())
}

#[cfg(test)]
use crate::card::cards;

#[cfg(test)]
fn class(s: &str) -> Option<Category> {
    Hand::compose(Seat::A, cards(s)).map(|h| h.category())
}

#[cfg(test)]
fn hand(s: &str) -> Hand {
    Hand::compose(Seat::A, cards(s)).unwrap()
}

#[test]
fn test_classification() {
    use Category::*;

    assert_eq!(class("3D"), Some(Single));
    assert_eq!(class("3D 3C"), Some(Pair));
    assert_eq!(class("3D 4D"), None);
    assert_eq!(class("7D 7C 7H"), Some(Triple));
    assert_eq!(class("7D 7C 8H"), None);
    assert_eq!(class("3D 4C 5H 6S 7D"), Some(Straight));
    assert_eq!(class("3D 5D 7D 9D JD"), Some(Flush));
    assert_eq!(class("9D 9C 9H 4S 4D"), Some(FullHouse));
    assert_eq!(class("4S 9D 9C 9H 9S"), Some(Quad));
    assert_eq!(class("3H 4H 5H 6H 7H"), Some(StraightFlush));
    // junk five-card sets, two pairs and off sizes are nothing
    assert_eq!(class("3D 4C 5H 6S 8D"), None);
    assert_eq!(class("3D 3C 4H 4S 5D"), None);
    assert_eq!(class("3D 4D 5D 6D"), None);
}

#[test]
fn test_quad_and_full_house_kicker_positions() {
    use Category::*;

    // kicker sorted below the group, then above it
    assert_eq!(class("3D 9D 9C 9H 9S"), Some(Quad));
    assert_eq!(class("9D 9C 9H 9S 2S"), Some(Quad));
    assert_eq!(class("4D 4C 9D 9C 9H"), Some(FullHouse));
    assert_eq!(class("9D 9C 9H KD KC"), Some(FullHouse));
}

#[test]
fn test_every_suited_straight_is_a_straight_flush() {
    use enum_iterator::all;

    let by_strength: Vec<Rank> = all::<Rank>()
        .sorted_by_key(|r| r.strength())
        .collect();
    for suit in all::<crate::card::Suit>() {
        for run in by_strength.windows(5) {
            let cards = run.iter().map(|&rank| Card(suit, rank)).collect();
            let hand = Hand::compose(Seat::A, cards).unwrap();
            assert_eq!(hand.category(), Category::StraightFlush);
        }
    }
}

#[test]
fn test_straights_never_wrap() {
    // Q-K-A-2-3 looks circular but 2 (12) and 3 (0) are not adjacent
    assert_eq!(class("QD KC AH 2S 3D"), None);
    assert_eq!(class("2D 3D 4D 5D 6D"), Some(Category::Flush));
    assert_eq!(class("JD QD KD AD 2D"), Some(Category::StraightFlush));
}

#[test]
fn test_category_strength_beats_any_cards() {
    let straight = hand("9D TC JH QS KD");
    let flush = hand("3H 4H 5H 7H 9H");
    let full_house = hand("3D 3C 3S 4S 4D");
    let quad = hand("5D 5C 5H 5S 3S");
    let straight_flush = hand("3C 4C 5C 6C 7C");

    assert!(flush.beats(&straight));
    assert!(!straight.beats(&flush));
    assert!(full_house.beats(&flush));
    assert!(quad.beats(&full_house));
    assert!(straight_flush.beats(&quad));
    assert!(!quad.beats(&straight_flush));
}

#[test]
fn test_single_comparison_uses_strength_then_suit() {
    assert!(hand("2D").beats(&hand("AS")));
    assert!(!hand("AS").beats(&hand("2D")));
    assert!(hand("3C").beats(&hand("3D")));
    assert!(!hand("3D").beats(&hand("3C")));
}

#[test]
fn test_beats_is_antisymmetric_within_a_category() {
    let duels = [
        ("9D 9C", "4H 4S"),
        ("8D 8H 8S", "6C 6H 6S"),
        ("3D 4C 5H 6S 7D", "4D 5C 6H 7S 8D"),
        ("3H 4H 5H 6H 7H", "8S 9S TS JS QS"),
    ];
    for (a, b) in duels {
        let (a, b) = (hand(a), hand(b));
        assert_ne!(a.beats(&b), b.beats(&a));
    }
}

#[test]
fn test_flush_compares_suit_before_rank() {
    let spades = hand("3S 5S 7S 9S JS");
    let hearts = hand("2H KH QH 7H 4H");
    assert!(spades.beats(&hearts));
    assert!(!hearts.beats(&spades));

    let higher_spades = hand("4S 6S 8S TS QS");
    assert!(higher_spades.beats(&spades));
    assert!(!spades.beats(&higher_spades));
}

#[test]
fn test_group_rank_decides_full_houses_and_quads() {
    let threes_full = hand("9S 9H 3D 3C 3H");
    let eights_full = hand("8C 8H 8S 4D 4C");
    assert!(eights_full.beats(&threes_full));
    assert!(!threes_full.beats(&eights_full));

    let threes_quad = hand("3D 3C 3H 3S KD");
    let fives_quad = hand("5D 5C 5H 5S 4D");
    assert!(fives_quad.beats(&threes_quad));
    assert!(!threes_quad.beats(&fives_quad));
}

#[test]
fn test_no_hand_beats_a_different_size() {
    assert!(!hand("9D 9C").beats(&hand("3D")));
    assert!(!hand("2S").beats(&hand("3D 3C")));
}
