mod forced;
mod heuristic;

pub use forced::{FORCED_VARIANTS, ForcedBidPolicy};
pub use heuristic::HeuristicPolicy;

use crate::bot::{DiscardError, PlayError, UnseenTracker};
use euchre_core::analysis::AnalysisError;
use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::player::Seat;
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::Trick;
use rand::RngCore;
use std::fmt;

/// What a seat can see when it is asked to bid.
pub struct BidContext<'a> {
    pub seat: Seat,
    /// 0-3 is the order-up round, 4-7 the open round; 3 and 7 are the dealer.
    pub position: usize,
    pub hand: &'a Hand,
    pub turncard: Card,
    pub dealer: Seat,
    pub stick_the_dealer: bool,
}

/// The dealer's view after picking up: six cards, trump already named.
pub struct DiscardContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub trump: Suit,
    pub turncard: Card,
}

pub struct PlayContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub trump: Suit,
    pub caller: Seat,
    pub call_position: usize,
    pub turn_suit: Suit,
    pub trick: &'a Trick,
    pub tricks_played: usize,
    pub tracker: &'a UnseenTracker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    Analysis(AnalysisError),
    Discard(DiscardError),
    Play(PlayError),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Analysis(err) => write!(f, "hand analysis failed: {err}"),
            PolicyError::Discard(err) => write!(f, "discard failed: {err}"),
            PolicyError::Play(err) => write!(f, "play failed: {err}"),
        }
    }
}

impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolicyError::Analysis(err) => Some(err),
            PolicyError::Discard(err) => Some(err),
            PolicyError::Play(err) => Some(err),
        }
    }
}

impl From<AnalysisError> for PolicyError {
    fn from(err: AnalysisError) -> Self {
        PolicyError::Analysis(err)
    }
}

impl From<DiscardError> for PolicyError {
    fn from(err: DiscardError) -> Self {
        PolicyError::Discard(err)
    }
}

impl From<PlayError> for PolicyError {
    fn from(err: PlayError) -> Self {
        PolicyError::Play(err)
    }
}

/// Decision-making interface for one seat at the table.
pub trait Policy: Send {
    /// `None` passes.
    fn choose_bid(&mut self, ctx: &BidContext) -> Result<Option<Suit>, PolicyError>;

    /// Called only for the dealer after the turncard was ordered up.
    fn choose_discard(&mut self, ctx: &DiscardContext) -> Result<Card, PolicyError>;

    /// Called once trump is fixed, before the first trick.
    fn begin_play(&mut self, _trump: Suit) {}

    fn choose_play(
        &mut self,
        ctx: &PlayContext,
        rng: &mut dyn RngCore,
    ) -> Result<Card, PolicyError>;
}
