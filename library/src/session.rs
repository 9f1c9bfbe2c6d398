use crate::card::{dealt, Card, OPENING_CARD};
use crate::hand::Hand;
use crate::seat::Seat;
use enum_iterator::all;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the deck is not a dealable set of distinct cards")]
    BadDeck,
    #[error("no round is in progress")]
    RoundNotInProgress,
    #[error("it is another seat's turn")]
    NotYourTurn,
    #[error("the card selection is out of range or repeats an index")]
    InvalidSelection,
    #[error("the selected cards do not form a hand")]
    UnclassifiableHand,
    #[error("the move does not follow the table")]
    IllegalMove,
}

/// One seat's lobby name and cards in hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    name: Option<String>,
    cards: Vec<Card>,
}

impl Player {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Cards still in hand, sorted by strength. Move indices refer to this
    /// ordering.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Dealing,
    InRound,
    RoundEnded { winner: Seat },
}

/// What a validated move did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Passed,
    Played(Hand),
}

enum Play {
    Pass,
    Hand(Hand),
}

/// The local mirror of one four-player round: hands, table history, whose
/// turn it is. All mutation goes through [`Session::start`],
/// [`Session::apply`] and [`Session::reset`]; a rejected move changes
/// nothing.
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    players: [Player; 4],
    table: Vec<Hand>,
    current: Seat,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            players: Default::default(),
            table: vec![],
            current: Seat::A,
            phase: Phase::Dealing,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// Hands played this round, oldest first. Passes are never recorded;
    /// the last entry is the hand to beat.
    pub fn table(&self) -> &[Hand] {
        &self.table
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The seat entitled to act, while a round is running.
    pub fn current_turn(&self) -> Option<Seat> {
        match self.phase {
            Phase::InRound => Some(self.current),
            _ => None,
        }
    }

    pub fn set_name(&mut self, seat: Seat, name: Option<String>) {
        self.players[seat.index()].name = name;
    }

    /// Deals a shuffled deck and opens the round. The deck must consist of
    /// distinct cards, split evenly over the four seats, and include the
    /// opening card; the seat dealt the opening card leads.
    pub fn start(&mut self, deck: Vec<Card>) -> Result<(), GameError> {
        let unique: BTreeSet<Card> = deck.iter().copied().collect();
        if deck.is_empty()
            || deck.len() % 4 != 0
            || unique.len() != deck.len()
            || !unique.contains(&OPENING_CARD)
        {
            return Err(GameError::BadDeck);
        }
        for (player, mut cards) in self.players.iter_mut().zip(dealt(deck)) {
            cards.sort();
            player.cards = cards;
        }
        self.table.clear();
        self.current = all::<Seat>()
            .find(|seat| self.players[seat.index()].cards.contains(&OPENING_CARD))
            .unwrap();
        self.phase = Phase::InRound;
        info!("round started, seat {} leads", self.current);
        Ok(())
    }

    /// Checks a proposed move without touching any state.
    pub fn validate(&self, seat: Seat, indices: &[usize]) -> Result<(), GameError> {
        self.resolve(seat, indices).map(|_| ())
    }

    /// Validates and applies one move: removes the played cards, records
    /// the hand, advances the turn and detects the end of the round.
    pub fn apply(&mut self, seat: Seat, indices: &[usize]) -> Result<Applied, GameError> {
        match self.resolve(seat, indices)? {
            Play::Pass => {
                debug!("seat {seat} passes");
                self.current = seat.next();
                Ok(Applied::Passed)
            }
            Play::Hand(hand) => {
                debug!("seat {seat} plays {hand}");
                let cards = &mut self.players[seat.index()].cards;
                cards.retain(|card| !hand.cards().contains(card));
                if cards.is_empty() {
                    info!("seat {seat} played their last card and wins the round");
                    self.phase = Phase::RoundEnded { winner: seat };
                } else {
                    self.current = seat.next();
                }
                self.table.push(hand.clone());
                Ok(Applied::Played(hand))
            }
        }
    }

    fn resolve(&self, seat: Seat, indices: &[usize]) -> Result<Play, GameError> {
        if self.phase != Phase::InRound {
            return Err(GameError::RoundNotInProgress);
        }
        if seat != self.current {
            return Err(GameError::NotYourTurn);
        }
        let in_hand = &self.players[seat.index()].cards;
        let picked: BTreeSet<usize> = indices.iter().copied().collect();
        if picked.len() != indices.len() {
            return Err(GameError::InvalidSelection);
        }
        match picked.last() {
            Some(&max) if max >= in_hand.len() => return Err(GameError::InvalidSelection),
            _ => {}
        }
        if picked.is_empty() {
            // passing is only possible against another seat's hand
            return match self.table.last() {
                Some(top) if top.seat() != seat => Ok(Play::Pass),
                _ => Err(GameError::IllegalMove),
            };
        }
        let selected: Vec<Card> = picked.into_iter().map(|i| in_hand[i]).collect();
        let hand = Hand::compose(seat, selected).ok_or(GameError::UnclassifiableHand)?;
        match self.table.last() {
            // the opening play must include the opening card
            None if hand.cards().contains(&OPENING_CARD) => Ok(Play::Hand(hand)),
            None => Err(GameError::IllegalMove),
            // everyone passed back to this seat: it leads whatever it likes
            Some(top) if top.seat() == seat => Ok(Play::Hand(hand)),
            Some(top) if hand.size() == top.size() && hand.beats(top) => Ok(Play::Hand(hand)),
            Some(_) => Err(GameError::IllegalMove),
        }
    }

    /// Seats ordered by remaining card count, fewest first.
    pub fn standings(&self) -> Vec<(Seat, usize)> {
        let mut counts: Vec<_> = all::<Seat>()
            .map(|seat| (seat, self.players[seat.index()].cards.len()))
            .collect();
        counts.sort_by_key(|&(_, count)| count);
        counts
    }

    /// Discards the round in progress. Lobby names survive; cards and
    /// table history do not.
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.cards.clear();
        }
        self.table.clear();
        self.phase = Phase::Dealing;
        info!("session reset");
    }
}

#[cfg(test)]
use crate::card::cards;

// Seat A holds hearts with 4♥ swapped out for 6♠, seat B spades with 6♠
// swapped out for 4♥ (giving B a pair of fours), seat C all diamonds
// (including the opener), seat D all clubs.
#[cfg(test)]
fn stacked_deck() -> Vec<Card> {
    let mut deck = cards("3H 5H 6H 7H 8H 9H TH JH QH KH AH 2H 6S");
    deck.extend(cards("3S 4S 5S 7S 8S 9S TS JS QS KS AS 2S 4H"));
    deck.extend(cards("3D 4D 5D 6D 7D 8D 9D TD JD QD KD AD 2D"));
    deck.extend(cards("3C 4C 5C 6C 7C 8C 9C TC JC QC KC AC 2C"));
    deck
}

#[cfg(test)]
fn in_play(session: &Session) -> usize {
    session.players.iter().map(|p| p.cards().len()).sum::<usize>()
        + session.table.iter().map(|h| h.size()).sum::<usize>()
}

#[test]
fn test_start_seats_the_opening_card_holder() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    assert_eq!(session.current_turn(), Some(Seat::C));
    assert!(session.table().is_empty());
    assert_eq!(in_play(&session), 52);
    // hands come out sorted by strength for stable display indices
    assert_eq!(session.player(Seat::C).cards()[0], OPENING_CARD);
}

#[test]
fn test_bad_decks_are_rejected() {
    let mut session = Session::new();
    assert_eq!(session.start(vec![]), Err(GameError::BadDeck));
    assert_eq!(session.start(cards("3D 3D 4D 5D")), Err(GameError::BadDeck));
    assert_eq!(session.start(cards("3D 4D 5D")), Err(GameError::BadDeck));
    assert_eq!(session.start(cards("4D 5D 6D 7D")), Err(GameError::BadDeck));
    assert_eq!(session.phase(), &Phase::Dealing);
}

#[test]
fn test_opening_play_must_contain_the_opening_card() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    // 4♦ alone is a fine single but not a legal opener, and neither is a pass
    assert_eq!(session.apply(Seat::C, &[1]), Err(GameError::IllegalMove));
    assert_eq!(session.apply(Seat::C, &[]), Err(GameError::IllegalMove));
    assert!(session.apply(Seat::C, &[0]).is_ok());
    assert_eq!(session.table().len(), 1);
}

#[test]
fn test_wrong_turns_and_bad_selections() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    assert_eq!(session.apply(Seat::A, &[0]), Err(GameError::NotYourTurn));
    assert_eq!(session.apply(Seat::C, &[0, 0]), Err(GameError::InvalidSelection));
    assert_eq!(session.apply(Seat::C, &[13]), Err(GameError::InvalidSelection));
    assert_eq!(
        session.apply(Seat::C, &[0, 1]),
        Err(GameError::UnclassifiableHand)
    );
    // nothing above moved a card
    assert_eq!(session.player(Seat::C).cards().len(), 13);
    assert!(session.table().is_empty());
}

#[test]
fn test_follow_must_match_size_and_beat_the_incumbent() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    // seat C opens with the 3♦ single
    assert!(matches!(
        session.apply(Seat::C, &[0]),
        Ok(Applied::Played(_))
    ));
    assert_eq!(session.current_turn(), Some(Seat::D));

    // seat D passes; it does not own the table
    assert_eq!(session.apply(Seat::D, &[]), Ok(Applied::Passed));
    assert_eq!(session.current_turn(), Some(Seat::A));
    assert_eq!(session.table().len(), 1);

    // seat A follows with a stronger single, the 5♥
    assert!(matches!(
        session.apply(Seat::A, &[1]),
        Ok(Applied::Played(_))
    ));
    assert_eq!(session.current_turn(), Some(Seat::B));
    assert_eq!(session.table().len(), 2);

    // seat B may not answer a single with a pair of fours
    assert_eq!(session.apply(Seat::B, &[1, 2]), Err(GameError::IllegalMove));
    // nor with a weaker single, but a stronger one is fine
    assert_eq!(session.apply(Seat::B, &[0]), Err(GameError::IllegalMove));
    assert!(session.apply(Seat::B, &[12]).is_ok());
    assert_eq!(in_play(&session), 52);
}

#[test]
fn test_leader_after_all_passes_leads_freely() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    session.apply(Seat::C, &[0]).unwrap();
    session.apply(Seat::D, &[]).unwrap();
    session.apply(Seat::A, &[]).unwrap();
    session.apply(Seat::B, &[]).unwrap();

    // back at the owner of the table: a five-card lead over a single stands
    let applied = session.apply(Seat::C, &[0, 1, 2, 3, 4]).unwrap();
    match applied {
        Applied::Played(hand) => {
            assert_eq!(hand.category(), crate::hand::Category::StraightFlush)
        }
        Applied::Passed => panic!("expected a played hand"),
    }
    assert_eq!(session.table().len(), 2);
    assert_eq!(session.current_turn(), Some(Seat::D));
}

#[test]
fn test_owner_of_the_table_cannot_pass() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    session.apply(Seat::C, &[0]).unwrap();
    session.apply(Seat::D, &[]).unwrap();
    session.apply(Seat::A, &[]).unwrap();
    session.apply(Seat::B, &[]).unwrap();

    assert_eq!(session.apply(Seat::C, &[]), Err(GameError::IllegalMove));
}

#[test]
fn test_validate_never_mutates() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    assert!(session.validate(Seat::C, &[0]).is_ok());
    assert_eq!(session.validate(Seat::C, &[1]), Err(GameError::IllegalMove));
    assert_eq!(session.player(Seat::C).cards().len(), 13);
    assert!(session.table().is_empty());
    assert_eq!(session.current_turn(), Some(Seat::C));
}

#[test]
fn test_round_ends_when_a_hand_empties() {
    let mut session = Session::new();
    session.start(cards("3D 4C 5H 6S")).unwrap();
    assert_eq!(session.current_turn(), Some(Seat::A));

    let applied = session.apply(Seat::A, &[0]).unwrap();
    assert!(matches!(applied, Applied::Played(_)));
    assert_eq!(session.phase(), &Phase::RoundEnded { winner: Seat::A });
    assert_eq!(session.current_turn(), None);

    // the other seats' counts are untouched by the ending
    let standings = session.standings();
    assert_eq!(standings[0], (Seat::A, 0));
    assert!(standings[1..].iter().all(|&(_, count)| count == 1));

    assert_eq!(
        session.apply(Seat::B, &[0]),
        Err(GameError::RoundNotInProgress)
    );
}

#[test]
fn test_cards_are_conserved_through_play() {
    let mut session = Session::new();
    session.start(stacked_deck()).unwrap();

    session.apply(Seat::C, &[0]).unwrap();
    assert_eq!(in_play(&session), 52);
    session.apply(Seat::D, &[]).unwrap();
    assert_eq!(in_play(&session), 52);
    session.apply(Seat::A, &[1]).unwrap();
    assert_eq!(in_play(&session), 52);
}

#[test]
fn test_reset_clears_the_round_but_keeps_names() {
    let mut session = Session::new();
    session.set_name(Seat::A, Some("amy".to_owned()));
    session.start(stacked_deck()).unwrap();
    session.apply(Seat::C, &[0]).unwrap();

    session.reset();
    assert_eq!(session.phase(), &Phase::Dealing);
    assert!(session.table().is_empty());
    assert!(session.players().iter().all(|p| p.cards().is_empty()));
    assert_eq!(session.player(Seat::A).name(), Some("amy"));
}
