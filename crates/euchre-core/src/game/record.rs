use crate::model::deal::{Deal, DealPhase};
use crate::model::player::Seat;
use crate::model::score::caller_points;
use crate::model::suit::{CallRelation, Suit};
use serde::{Deserialize, Serialize};

/// Outcome of one finished deal, as handed to statistics consumers.
///
/// Call fields are `None` when all eight bidders passed. `points` is signed
/// relative to the calling side: -2 for a euchre, otherwise 1, 2 or 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealRecord {
    pub dealer_seat: Seat,
    pub turncard_suit: Suit,
    pub turncard_level: u8,
    pub call_position: Option<u8>,
    pub call_seat: Option<Seat>,
    pub call_suit: Option<Suit>,
    pub call_suit_relation: Option<CallRelation>,
    pub caller_tricks: Option<u8>,
    pub team_tricks: [u8; 2],
    pub points: i8,
    pub team_points: [u8; 2],
}

impl DealRecord {
    /// Builds the record for a deal that is passed out or scored.
    pub fn from_deal(deal: &Deal) -> Option<Self> {
        if !deal.phase().is_finished() {
            return None;
        }
        let turncard = deal.turncard()?;
        let caller_team = deal.caller_team();
        let points = match (deal.phase(), caller_team) {
            (DealPhase::Scored, Some(team)) => caller_points(deal.team_points(), team),
            _ => 0,
        };
        Some(Self {
            dealer_seat: deal.dealer(),
            turncard_suit: turncard.suit,
            turncard_level: turncard.settled_turncard_level(deal.contract()),
            call_position: deal.call_position().map(|p| p as u8),
            call_seat: deal.caller(),
            call_suit: deal.contract(),
            call_suit_relation: deal
                .contract()
                .map(|suit| CallRelation::between(turncard.suit, suit)),
            caller_tricks: caller_team.map(|team| deal.team_tricks()[team.index()]),
            team_tricks: deal.team_tricks(),
            points,
            team_points: deal.team_points(),
        })
    }

    pub fn is_passed(&self) -> bool {
        self.call_seat.is_none()
    }

    pub fn is_made(&self) -> bool {
        self.points > 0
    }

    pub fn is_march(&self) -> bool {
        self.caller_tricks == Some(5)
    }

    pub fn is_euchre(&self) -> bool {
        self.points < 0
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
