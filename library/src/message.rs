use crate::card::Card;
use crate::seat::Seat;
use serde::{Deserialize, Serialize};

/// Everything the authoritative server can tell a client. The server is
/// the only source of `PlayerList`, `Full` and `Start`; `Move` is the
/// rebroadcast of an accepted move, including the local player's own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerEvent {
    /// Sent on connect: the seat assigned to this client plus the names
    /// currently at the table, empty slots included.
    PlayerList {
        seat: Seat,
        names: [Option<String>; 4],
    },
    Join {
        seat: Seat,
        name: String,
    },
    /// The table already has four players; this connection is done.
    Full,
    Quit {
        seat: Seat,
    },
    Ready {
        seat: Seat,
    },
    /// A freshly shuffled deck; deal it and begin the round.
    Start {
        deck: Vec<Card>,
    },
    /// Indices into the acting seat's current hand ordering, empty for a
    /// pass.
    Move {
        seat: Seat,
        indices: Vec<usize>,
    },
    Chat {
        text: String,
    },
}

/// Everything a client can tell the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientCommand {
    Join { name: String },
    Ready,
    Move { indices: Vec<usize> },
    Chat { text: String },
}
