use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use std::cmp::Ordering;
use std::fmt;

/// Decides whether `played` takes the trick away from `winning`.
///
/// Returns `Greater` when `played` becomes the new winner. Trump beats
/// non-trump regardless of the lead; within trump, or within the led suit,
/// the higher effective level wins; a card that neither follows nor trumps
/// never wins.
pub fn compare(lead: Card, winning: Card, played: Card, trump: Suit) -> Ordering {
    let lead_suit = lead.effective_suit(trump);
    let winning_trump = winning.is_trump(trump);
    let played_trump = played.is_trump(trump);

    match (winning_trump, played_trump) {
        (true, true) => played
            .effective_level(trump)
            .cmp(&winning.effective_level(trump)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let played_follows = played.effective_suit(trump) == lead_suit;
            let winning_follows = winning.effective_suit(trump) == lead_suit;
            match (winning_follows, played_follows) {
                (true, true) => played
                    .effective_level(trump)
                    .cmp(&winning.effective_level(trump)),
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (false, false) => Ordering::Less,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trick {
    leader: Seat,
    trump: Suit,
    plays: Vec<Play>,
    winning: Option<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
    AlreadyPlayed(Seat),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            TrickError::AlreadyPlayed(seat) => write!(f, "{seat} has already played this trick"),
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat, trump: Suit) -> Self {
        Self {
            leader,
            trump,
            plays: Vec::with_capacity(4),
            winning: None,
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn lead_card(&self) -> Option<Card> {
        self.plays.first().map(|play| play.card)
    }

    /// Effective suit of the led card.
    pub fn lead_suit(&self) -> Option<Suit> {
        self.lead_card().map(|card| card.effective_suit(self.trump))
    }

    /// The running winner, updated as each card lands.
    pub fn winning(&self) -> Option<Play> {
        self.winning
    }

    pub fn winner(&self) -> Option<Seat> {
        if self.is_complete() {
            self.winning.map(|play| play.seat)
        } else {
            None
        }
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next())
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        let play = Play { seat, card };
        self.winning = match (self.lead_card(), self.winning) {
            (Some(lead), Some(current)) => {
                if compare(lead, current.card, card, self.trump) == Ordering::Greater {
                    Some(play)
                } else {
                    Some(current)
                }
            }
            _ => Some(play),
        };
        self.plays.push(play);
        Ok(())
    }
}
