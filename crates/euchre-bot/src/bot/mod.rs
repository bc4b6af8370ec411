mod bid;
mod discard;
mod params;
mod play;
mod strategy;
mod tracker;

pub use bid::{BidChoice, BidPlanner};
pub use discard::{DiscardError, DiscardPlanner};
pub use params::BotParams;
pub use play::{PlayError, PlayInput, PlayPlanner};
pub use strategy::{Strategy, StrategySet};
pub use tracker::UnseenTracker;

use euchre_core::model::card::Card;
use euchre_core::model::suit::Suit;

/// Lowest card by effective level; ties go to the lower suit index.
pub(crate) fn lowest(cards: impl IntoIterator<Item = Card>, trump: Suit) -> Option<Card> {
    cards
        .into_iter()
        .min_by_key(|card| (card.effective_level(trump), card.suit.index()))
}

pub(crate) fn highest(cards: impl IntoIterator<Item = Card>, trump: Suit) -> Option<Card> {
    cards
        .into_iter()
        .max_by_key(|card| (card.effective_level(trump), std::cmp::Reverse(card.suit.index())))
}
