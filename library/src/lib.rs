//! Client-side engine for the Big Two card game: card and hand ordering,
//! legal-hand classification, turn sequencing, and the state machine that
//! keeps one player's view of a remote game consistent. Transport and
//! rendering live outside this crate, behind the [`Transport`] and
//! [`Presenter`] traits.

pub mod card;
pub mod client;
pub mod hand;
pub mod message;
pub mod seat;
pub mod session;

pub use card::{deck, shuffled, Card, Rank, Suit, OPENING_CARD};
pub use client::{ClientError, GameClient, Presenter, Transport};
pub use hand::{Category, Hand};
pub use message::{ClientCommand, ServerEvent};
pub use seat::Seat;
pub use session::{Applied, GameError, Phase, Player, Session};
