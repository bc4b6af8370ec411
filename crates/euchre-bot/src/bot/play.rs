use super::strategy::{Strategy, StrategySet};
use super::tracker::UnseenTracker;
use super::{highest, lowest};
use euchre_core::model::card::Card;
use euchre_core::model::hand::Hand;
use euchre_core::model::player::Seat;
use euchre_core::model::rank::Rank;
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::{Trick, compare};
use rand::RngCore;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    EmptyHand(Seat),
    Exhausted(Seat),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::EmptyHand(seat) => write!(f, "{seat} has no cards to play"),
            PlayError::Exhausted(seat) => write!(f, "no play rule produced a card for {seat}"),
        }
    }
}

impl std::error::Error for PlayError {}

/// Everything a seat may legitimately look at when choosing a card.
pub struct PlayInput<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub trump: Suit,
    pub caller: Seat,
    /// Bidding position (0-7) at which trump was named.
    pub call_position: usize,
    pub turn_suit: Suit,
    pub trick: &'a Trick,
    /// Completed tricks in this deal.
    pub tricks_played: usize,
    pub tracker: &'a UnseenTracker,
    pub strategies: &'a mut StrategySet,
    pub rng: &'a mut dyn RngCore,
}

impl PlayInput<'_> {
    fn legal(&self) -> Vec<Card> {
        match self.trick.lead_suit() {
            Some(suit) if self.hand.has_suit(suit) => self.hand.suit_cards(suit).to_vec(),
            _ => self.hand.cards().to_vec(),
        }
    }

    fn can_follow(&self) -> bool {
        self.trick
            .lead_suit()
            .is_some_and(|suit| self.hand.has_suit(suit))
    }

    fn trump_cards(&self) -> &[Card] {
        self.hand.suit_cards(self.trump)
    }

    fn off_suit_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.hand
            .cards()
            .iter()
            .copied()
            .filter(|c| !c.is_trump(self.trump))
    }

    fn off_suits(&self) -> impl Iterator<Item = Suit> + '_ {
        Suit::ALL.into_iter().filter(|&s| s != self.trump)
    }

    fn is_caller_side(&self) -> bool {
        self.caller.team() == self.seat.team()
    }

    fn partner_called(&self) -> bool {
        self.caller == self.seat.partner()
    }

    /// Trump still held by other seats, as far as this seat can tell.
    fn trump_outstanding(&self) -> bool {
        self.tracker.outstanding_count(self.trump) > 0
    }

    /// An opponent has shown out of `suit` while trump is still around.
    fn opponent_can_ruff(&self, suit: Suit) -> bool {
        self.trump_outstanding()
            && [self.seat.next(), self.seat.previous()]
                .into_iter()
                .any(|opponent| self.tracker.is_void(opponent, suit))
    }

    /// Lowest card of a non-trump suit held exactly once, skipping aces.
    fn void_candidate(&self) -> Option<Card> {
        let singles = self.off_suits().filter_map(|suit| match self.hand.suit_cards(suit) {
            [only] if !only.is_ace() => Some(*only),
            _ => None,
        });
        lowest(singles, self.trump)
    }
}

pub type PlayRule = fn(&mut PlayInput<'_>) -> Option<Card>;

const FIRST_LEAD: &[(&str, PlayRule)] = &[
    ("next_call_lead", next_call_lead),
    ("draw_trump", draw_trump),
    ("lone_off_ace", lone_off_ace),
    ("partner_called_trump", partner_called_trump),
    ("create_void_lead", create_void_lead),
    ("low_from_long_suit", low_from_long_suit),
];

const SUBSEQUENT_LEAD: &[(&str, PlayRule)] = &[
    ("last_card", last_card),
    ("continue_draw_trump", continue_draw_trump),
    ("partner_support_lead", partner_support_lead),
    ("safe_winner_lead", safe_winner_lead),
    ("create_void_lead", create_void_lead),
    ("low_from_long_offsuit", low_from_long_offsuit),
    ("random_legal", random_legal),
];

const PARTNER_WINNING: &[(&str, PlayRule)] = &[
    ("last_card", last_card),
    ("follow_low", follow_low),
    ("void_discard", void_discard),
    ("throw_off_lowest", throw_off_lowest),
    ("lowest_trump", lowest_trump),
    ("random_legal", random_legal),
];

const OPPONENT_WINNING: &[(&str, PlayRule)] = &[
    ("last_card", last_card),
    ("follow_overtake", follow_overtake),
    ("trump_in", trump_in),
    ("void_discard", void_discard),
    ("throw_off_lowest", throw_off_lowest),
    ("lowest_trump", lowest_trump),
    ("random_legal", random_legal),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaySituation {
    FirstLead,
    SubsequentLead,
    PartnerWinning,
    OpponentWinning,
}

impl PlaySituation {
    pub fn of(input: &PlayInput<'_>) -> Self {
        match input.trick.winning() {
            None if input.tricks_played == 0 => PlaySituation::FirstLead,
            None => PlaySituation::SubsequentLead,
            Some(play) if play.seat == input.seat.partner() => PlaySituation::PartnerWinning,
            Some(_) => PlaySituation::OpponentWinning,
        }
    }

    fn rules(self) -> &'static [(&'static str, PlayRule)] {
        match self {
            PlaySituation::FirstLead => FIRST_LEAD,
            PlaySituation::SubsequentLead => SUBSEQUENT_LEAD,
            PlaySituation::PartnerWinning => PARTNER_WINNING,
            PlaySituation::OpponentWinning => OPPONENT_WINNING,
        }
    }
}

pub struct PlayPlanner;

impl PlayPlanner {
    /// Runs the cascade for the current situation and returns the first legal
    /// card a rule produces, with the rule's name.
    pub fn choose(input: &mut PlayInput<'_>) -> Result<(Card, &'static str), PlayError> {
        if input.hand.is_empty() {
            return Err(PlayError::EmptyHand(input.seat));
        }
        let legal = input.legal();
        for (name, rule) in PlaySituation::of(input).rules() {
            if let Some(card) = rule(input) {
                if legal.contains(&card) {
                    return Ok((card, *name));
                }
            }
        }
        Err(PlayError::Exhausted(input.seat))
    }
}

fn next_call_lead(input: &mut PlayInput<'_>) -> Option<Card> {
    let next_call = input.caller == input.seat
        && input.call_position == 4
        && input.trump == input.turn_suit.next_suit();
    if !next_call {
        return None;
    }
    let trump = input.trump_cards();
    let right = trump.iter().any(|c| c.is_right_bower(input.trump));
    let ace = trump
        .iter()
        .copied()
        .find(|c| c.rank == Rank::Ace && c.suit == input.trump);
    match ace {
        Some(ace) if right => Some(ace),
        _ => trump.first().copied(),
    }
}

fn draw_trump(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.caller != input.seat || input.trump_cards().len() < 3 {
        return None;
    }
    input.strategies.push(Strategy::DrawTrump);
    input.trump_cards().last().copied()
}

fn lone_off_ace(input: &mut PlayInput<'_>) -> Option<Card> {
    input
        .off_suits()
        .find_map(|suit| match input.hand.suit_cards(suit) {
            [only] if only.is_ace() => Some(*only),
            _ => None,
        })
}

fn partner_called_trump(input: &mut PlayInput<'_>) -> Option<Card> {
    if !input.partner_called() || input.tracker.trump_played() > 0 {
        return None;
    }
    input.trump_cards().last().copied()
}

fn create_void_lead(input: &mut PlayInput<'_>) -> Option<Card> {
    input.void_candidate()
}

fn low_from_long_suit(input: &mut PlayInput<'_>) -> Option<Card> {
    low_from_long_offsuit(input).or_else(|| input.trump_cards().first().copied())
}

fn low_from_long_offsuit(input: &mut PlayInput<'_>) -> Option<Card> {
    let longest = input
        .off_suits()
        .filter(|&s| input.hand.has_suit(s))
        .max_by_key(|&s| (input.hand.count(s), std::cmp::Reverse(s.index())))?;
    input.hand.suit_cards(longest).first().copied()
}

fn last_card(input: &mut PlayInput<'_>) -> Option<Card> {
    match input.hand.cards() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Keeps leading the top trump while opponents may still hold trump; once
/// they are out, switches to preserving the rest.
fn continue_draw_trump(input: &mut PlayInput<'_>) -> Option<Card> {
    if !input.strategies.contains(Strategy::DrawTrump) {
        return None;
    }
    if input.trump_outstanding() && !input.trump_cards().is_empty() {
        return input.trump_cards().last().copied();
    }
    input.strategies.pop(Strategy::DrawTrump);
    input.strategies.push(Strategy::PreserveTrump);
    None
}

fn partner_support_lead(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.strategies.contains(Strategy::PreserveTrump) {
        return None;
    }
    partner_called_trump(input)
}

fn safe_winner_lead(input: &mut PlayInput<'_>) -> Option<Card> {
    let tracker = input.tracker;
    let winners = input
        .off_suit_cards()
        .filter(|&c| {
            tracker.is_boss(c) && !input.opponent_can_ruff(c.effective_suit(input.trump))
        });
    highest(winners, input.trump)
}

fn follow_low(input: &mut PlayInput<'_>) -> Option<Card> {
    let suit = input.trick.lead_suit()?;
    input.hand.suit_cards(suit).first().copied()
}

fn follow_overtake(input: &mut PlayInput<'_>) -> Option<Card> {
    let suit = input.trick.lead_suit()?;
    let lead = input.trick.lead_card()?;
    let winning = input.trick.winning()?.card;
    let cards = input.hand.suit_cards(suit);
    cards
        .iter()
        .copied()
        .find(|&c| compare(lead, winning, c, input.trump) == Ordering::Greater)
        .or_else(|| cards.first().copied())
}

fn trump_in(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.can_follow() {
        return None;
    }
    let lead = input.trick.lead_card()?;
    let winning = input.trick.winning()?.card;
    input
        .trump_cards()
        .iter()
        .copied()
        .find(|&c| compare(lead, winning, c, input.trump) == Ordering::Greater)
}

fn void_discard(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.can_follow() {
        return None;
    }
    input.void_candidate()
}

fn throw_off_lowest(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.can_follow() {
        return None;
    }
    lowest(input.off_suit_cards(), input.trump)
}

fn lowest_trump(input: &mut PlayInput<'_>) -> Option<Card> {
    if input.can_follow() {
        return None;
    }
    input.trump_cards().first().copied()
}

fn random_legal(input: &mut PlayInput<'_>) -> Option<Card> {
    let legal = input.legal();
    if input.strategies.contains(Strategy::PreserveTrump) {
        let plain: Vec<Card> = legal
            .iter()
            .copied()
            .filter(|c| !c.is_trump(input.trump))
            .collect();
        if let Some(card) = plain.choose(&mut *input.rng) {
            return Some(*card);
        }
    }
    legal.choose(&mut *input.rng).copied()
}
