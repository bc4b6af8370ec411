use core::fmt;
use serde::{Deserialize, Serialize};

/// Suit indices are laid out so that `index ^ 3` is the same-color suit and
/// `index ^ 1` / `index ^ 2` are the two opposite-color suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Clubs),
            1 => Some(Suit::Diamonds),
            2 => Some(Suit::Hearts),
            3 => Some(Suit::Spades),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_black(self) -> bool {
        matches!(self, Suit::Clubs | Suit::Spades)
    }

    /// The other suit of the same color.
    pub const fn next_suit(self) -> Suit {
        match self {
            Suit::Clubs => Suit::Spades,
            Suit::Diamonds => Suit::Hearts,
            Suit::Hearts => Suit::Diamonds,
            Suit::Spades => Suit::Clubs,
        }
    }

    /// The two opposite-color suits in static index order (`^1`, then `^2`).
    pub const fn cross_suits(self) -> [Suit; 2] {
        match self {
            Suit::Clubs => [Suit::Diamonds, Suit::Hearts],
            Suit::Diamonds => [Suit::Clubs, Suit::Spades],
            Suit::Hearts => [Suit::Spades, Suit::Clubs],
            Suit::Spades => [Suit::Hearts, Suit::Diamonds],
        }
    }

    pub const fn same_color(self, other: Suit) -> bool {
        self.is_black() == other.is_black()
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Clubs => "C",
            Suit::Diamonds => "D",
            Suit::Hearts => "H",
            Suit::Spades => "S",
        };
        f.write_str(symbol)
    }
}

/// How a called suit relates to the turncard's suit, as reported in deal records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallRelation {
    Turn,
    Next,
    Other,
}

impl CallRelation {
    pub const ALL: [CallRelation; 3] = [CallRelation::Turn, CallRelation::Next, CallRelation::Other];

    pub fn between(turn: Suit, called: Suit) -> Self {
        if called == turn {
            CallRelation::Turn
        } else if called == turn.next_suit() {
            CallRelation::Next
        } else {
            CallRelation::Other
        }
    }

    pub const fn index(self) -> usize {
        match self {
            CallRelation::Turn => 0,
            CallRelation::Next => 1,
            CallRelation::Other => 2,
        }
    }
}
