use enum_iterator::{next_cycle, Sequence};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A fixed table position, index 0 through 3. Seats act in index order,
/// wrapping from the last seat back to the first.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Sequence, Serialize, Deserialize, Hash,
)]
pub enum Seat {
    A,
    B,
    C,
    D,
}

impl Seat {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The seat entitled to act after this one.
    pub fn next(self) -> Seat {
        next_cycle(&self).unwrap()
    }
}

impl TryFrom<usize> for Seat {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Seat::A),
            1 => Ok(Seat::B),
            2 => Ok(Seat::C),
            3 => Ok(Seat::D),
            _ => Err(()),
        }
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[test]
fn test_turn_order_wraps() {
    assert_eq!(Seat::A.next(), Seat::B);
    assert_eq!(Seat::D.next(), Seat::A);
    assert_eq!(Seat::try_from(2), Ok(Seat::C));
    assert_eq!(Seat::try_from(4), Err(()));
}
