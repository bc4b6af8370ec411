use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Seat, Team};
use crate::model::score::{TRICKS_PER_DEAL, score};
use crate::model::suit::Suit;
use crate::model::trick::{Play, Trick, TrickError};
use rand::Rng;
use std::{array, fmt};

pub const HAND_SIZE: usize = 5;
pub const BID_POSITIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealPhase {
    Pending,
    Shuffled,
    Dealt,
    Bidding,
    /// The turncard was ordered up; the dealer holds six cards.
    Discarding,
    PassedOut,
    TrumpSet,
    Playing,
    Scored,
}

impl DealPhase {
    pub const fn is_finished(self) -> bool {
        matches!(self, DealPhase::PassedOut | DealPhase::Scored)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DealRules {
    /// The dealer may not pass the final bidding position.
    pub stick_the_dealer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub seat: Seat,
    pub call: Option<Suit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidStatus {
    Continue,
    AwaitingDiscard,
    TrumpSet(Suit),
    PassedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: Seat },
    DealScored { points: [u8; 2] },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    WrongPhase { action: &'static str, phase: DealPhase },
    OutOfTurn { expected: Seat, actual: Seat },
    TurnSuitRequired { called: Suit, turn: Suit },
    TurnSuitRejected { turn: Suit },
    DealerMustCall(Seat),
    NotDealer(Seat),
    CardNotInHand { seat: Seat, card: Card },
    MustFollowSuit { seat: Seat, suit: Suit },
    Trick(TrickError),
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::WrongPhase { action, phase } => {
                write!(f, "cannot {action} while deal is {phase:?}")
            }
            DealError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to act but got {actual}")
            }
            DealError::TurnSuitRequired { called, turn } => {
                write!(f, "first-round bid {called} does not match turncard suit {turn}")
            }
            DealError::TurnSuitRejected { turn } => {
                write!(f, "second-round bid may not name turned-down suit {turn}")
            }
            DealError::DealerMustCall(seat) => write!(f, "dealer {seat} is stuck and must call"),
            DealError::NotDealer(seat) => write!(f, "{seat} is not the dealer"),
            DealError::CardNotInHand { seat, card } => write!(f, "{seat} does not hold {card}"),
            DealError::MustFollowSuit { seat, suit } => write!(f, "{seat} must follow {suit}"),
            DealError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DealError {}

impl From<TrickError> for DealError {
    fn from(err: TrickError) -> Self {
        DealError::Trick(err)
    }
}

/// One shuffle / deal / bid / play / score cycle.
///
/// Hands are indexed by seat. Every transition validates the acting seat and
/// the current phase; a rejected action leaves the deal untouched.
#[derive(Debug, Clone)]
pub struct Deal {
    dealer: Seat,
    rules: DealRules,
    phase: DealPhase,
    deck: Option<Deck>,
    hands: [Hand; 4],
    bury: Vec<Card>,
    turncard: Option<Card>,
    turncard_up: bool,
    discard: Option<Card>,
    bids: Vec<Bid>,
    contract: Option<Suit>,
    caller: Option<Seat>,
    current_trick: Option<Trick>,
    tricks: Vec<Trick>,
    team_tricks: [u8; 2],
    team_points: [u8; 2],
}

impl Deal {
    pub fn new(dealer: Seat, rules: DealRules) -> Self {
        Self {
            dealer,
            rules,
            phase: DealPhase::Pending,
            deck: None,
            hands: array::from_fn(|_| Hand::new()),
            bury: Vec::with_capacity(4),
            turncard: None,
            turncard_up: false,
            discard: None,
            bids: Vec::with_capacity(BID_POSITIONS),
            contract: None,
            caller: None,
            current_trick: None,
            tricks: Vec::with_capacity(TRICKS_PER_DEAL as usize),
            team_tricks: [0; 2],
            team_points: [0; 2],
        }
    }

    /// Starts a deal from an already shuffled deck, e.g. to replay its cards.
    pub fn from_deck(dealer: Seat, rules: DealRules, deck: Deck) -> Self {
        let mut deal = Self::new(dealer, rules);
        deal.deck = Some(deck);
        deal.phase = DealPhase::Shuffled;
        deal
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), DealError> {
        self.require(DealPhase::Pending, "shuffle")?;
        self.deck = Some(Deck::shuffled(rng));
        self.phase = DealPhase::Shuffled;
        Ok(())
    }

    /// Five cards to each seat starting left of the dealer; of the last four,
    /// the top card is turned up and the rest are buried.
    pub fn deal_cards(&mut self) -> Result<(), DealError> {
        self.require(DealPhase::Shuffled, "deal")?;
        let Some(deck) = self.deck.as_ref() else {
            return Err(DealError::WrongPhase {
                action: "deal",
                phase: self.phase,
            });
        };
        let cards = deck.cards().to_vec();
        for position in 0..4 {
            let seat = Seat::at_position(self.dealer, position);
            let start = position * HAND_SIZE;
            self.hands[seat.index()] = Hand::with_cards(cards[start..start + HAND_SIZE].to_vec());
        }
        self.bury = cards[4 * HAND_SIZE..].to_vec();
        self.turncard = self.bury.pop();
        self.turncard_up = true;
        self.phase = DealPhase::Dealt;
        Ok(())
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn rules(&self) -> DealRules {
        self.rules
    }

    pub fn phase(&self) -> DealPhase {
        self.phase
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hand_at_position(&self, position: usize) -> &Hand {
        self.hand(Seat::at_position(self.dealer, position))
    }

    pub fn turncard(&self) -> Option<Card> {
        self.turncard
    }

    /// True while the turncard is face up on the kitty.
    pub fn turncard_up(&self) -> bool {
        self.turncard_up
    }

    pub fn bury(&self) -> &[Card] {
        &self.bury
    }

    pub fn discard(&self) -> Option<Card> {
        self.discard
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn contract(&self) -> Option<Suit> {
        self.contract
    }

    pub fn caller(&self) -> Option<Seat> {
        self.caller
    }

    /// Bidding position (0-7) at which the contract was made.
    pub fn call_position(&self) -> Option<usize> {
        self.caller.map(|_| self.bids.len() - 1)
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        self.current_trick.as_ref()
    }

    pub fn tricks(&self) -> &[Trick] {
        &self.tricks
    }

    pub fn team_tricks(&self) -> [u8; 2] {
        self.team_tricks
    }

    pub fn team_points(&self) -> [u8; 2] {
        self.team_points
    }

    pub fn bid_position(&self) -> usize {
        self.bids.len()
    }

    pub fn expected_bidder(&self) -> Option<Seat> {
        match self.phase {
            DealPhase::Dealt | DealPhase::Bidding => {
                Some(Seat::at_position(self.dealer, self.bids.len()))
            }
            _ => None,
        }
    }

    pub fn expected_player(&self) -> Option<Seat> {
        match self.phase {
            DealPhase::TrumpSet | DealPhase::Playing => {
                self.current_trick.as_ref().map(Trick::expected_seat)
            }
            _ => None,
        }
    }

    /// Every card in hands, bury, kitty and tricks. Always 24 once dealt.
    pub fn total_cards(&self) -> usize {
        let in_hands: usize = self.hands.iter().map(Hand::len).sum();
        let kitty = usize::from(self.turncard_up);
        let played: usize = self.tricks.iter().map(|t| t.plays().len()).sum::<usize>()
            + self.current_trick.as_ref().map_or(0, |t| t.plays().len());
        in_hands + self.bury.len() + kitty + played
    }

    pub fn submit_bid(&mut self, seat: Seat, call: Option<Suit>) -> Result<BidStatus, DealError> {
        if !matches!(self.phase, DealPhase::Dealt | DealPhase::Bidding) {
            return Err(DealError::WrongPhase {
                action: "bid",
                phase: self.phase,
            });
        }
        let position = self.bids.len();
        let expected = Seat::at_position(self.dealer, position);
        if expected != seat {
            return Err(DealError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        let Some(turncard) = self.turncard else {
            return Err(DealError::WrongPhase {
                action: "bid",
                phase: self.phase,
            });
        };
        let turn = turncard.suit;
        let first_round = position < 4;

        match call {
            Some(called) if first_round && called != turn => {
                return Err(DealError::TurnSuitRequired { called, turn });
            }
            Some(called) if !first_round && called == turn => {
                return Err(DealError::TurnSuitRejected { turn });
            }
            None if position == BID_POSITIONS - 1 && self.rules.stick_the_dealer => {
                return Err(DealError::DealerMustCall(seat));
            }
            _ => {}
        }

        self.phase = DealPhase::Bidding;
        self.bids.push(Bid { seat, call });

        match call {
            Some(suit) if first_round => {
                self.contract = Some(suit);
                self.caller = Some(seat);
                self.turncard_up = false;
                self.hands[self.dealer.index()].add(turncard);
                self.phase = DealPhase::Discarding;
                Ok(BidStatus::AwaitingDiscard)
            }
            Some(suit) => {
                self.contract = Some(suit);
                self.caller = Some(seat);
                self.fix_trump(suit);
                Ok(BidStatus::TrumpSet(suit))
            }
            None => {
                if position == 3 {
                    self.turncard_up = false;
                    self.bury.push(turncard);
                }
                if self.bids.len() == BID_POSITIONS {
                    self.phase = DealPhase::PassedOut;
                    Ok(BidStatus::PassedOut)
                } else {
                    Ok(BidStatus::Continue)
                }
            }
        }
    }

    pub fn submit_discard(&mut self, seat: Seat, card: Card) -> Result<Suit, DealError> {
        self.require(DealPhase::Discarding, "discard")?;
        if seat != self.dealer {
            return Err(DealError::NotDealer(seat));
        }
        let Some(trump) = self.contract else {
            return Err(DealError::WrongPhase {
                action: "discard",
                phase: self.phase,
            });
        };
        if !self.hands[seat.index()].remove(card) {
            return Err(DealError::CardNotInHand { seat, card });
        }
        self.discard = Some(card);
        self.bury.push(card);
        self.fix_trump(trump);
        Ok(trump)
    }

    /// Cards `seat` may legally play to the current trick.
    pub fn legal_cards(&self, seat: Seat) -> Vec<Card> {
        let hand = self.hand(seat);
        match self.current_trick.as_ref().and_then(Trick::lead_suit) {
            Some(suit) if hand.has_suit(suit) => hand.suit_cards(suit).to_vec(),
            _ => hand.cards().to_vec(),
        }
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, DealError> {
        if !matches!(self.phase, DealPhase::TrumpSet | DealPhase::Playing) {
            return Err(DealError::WrongPhase {
                action: "play",
                phase: self.phase,
            });
        }
        let Some(trick) = self.current_trick.as_mut() else {
            return Err(DealError::WrongPhase {
                action: "play",
                phase: self.phase,
            });
        };
        let expected = trick.expected_seat();
        if expected != seat {
            return Err(DealError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        let hand = &self.hands[seat.index()];
        if !hand.contains(card) {
            return Err(DealError::CardNotInHand { seat, card });
        }
        if let Some(suit) = trick.lead_suit() {
            if card.effective_suit(trick.trump()) != suit && hand.has_suit(suit) {
                return Err(DealError::MustFollowSuit { seat, suit });
            }
        }

        trick.play(seat, card)?;
        self.hands[seat.index()].remove(card);
        self.phase = DealPhase::Playing;

        if !trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let trump = trick.trump();
        let Some(winner) = trick.winner() else {
            return Err(DealError::WrongPhase {
                action: "score trick",
                phase: self.phase,
            });
        };
        let next = Trick::new(winner, trump);
        if let Some(finished) = self.current_trick.replace(next) {
            self.tricks.push(finished);
        }
        self.team_tricks[winner.team().index()] += 1;

        if self.tricks.len() < TRICKS_PER_DEAL as usize {
            return Ok(PlayOutcome::TrickCompleted { winner });
        }

        self.current_trick = None;
        let caller_team = self.caller_team().unwrap_or(Team::NorthSouth);
        self.team_points = score(self.team_tricks, caller_team, false);
        self.phase = DealPhase::Scored;
        Ok(PlayOutcome::DealScored {
            points: self.team_points,
        })
    }

    pub fn caller_team(&self) -> Option<Team> {
        self.caller.map(Seat::team)
    }

    /// Plays of every completed trick followed by the trick in progress.
    pub fn plays_so_far(&self) -> impl Iterator<Item = &Play> {
        self.tricks
            .iter()
            .chain(self.current_trick.iter())
            .flat_map(|trick| trick.plays().iter())
    }

    fn fix_trump(&mut self, trump: Suit) {
        for hand in &mut self.hands {
            hand.set_trump(trump);
        }
        self.current_trick = Some(Trick::new(Seat::at_position(self.dealer, 0), trump));
        self.phase = DealPhase::TrumpSet;
    }

    fn require(&self, phase: DealPhase, action: &'static str) -> Result<(), DealError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(DealError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BidStatus, Deal, DealError, DealPhase, DealRules, PlayOutcome};
    use crate::model::card::Card;
    use crate::model::deck::{DECK_SIZE, Deck};
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn dealt(dealer: Seat, seed: u64) -> Deal {
        let mut deal = Deal::from_deck(dealer, DealRules::default(), Deck::shuffled_with_seed(seed));
        deal.deal_cards().unwrap();
        deal
    }

    #[test]
    fn dealing_gives_five_cards_and_turns_top_of_kitty() {
        let deck = Deck::standard();
        let mut deal = Deal::from_deck(Seat::West, DealRules::default(), deck.clone());
        deal.deal_cards().unwrap();
        assert_eq!(deal.phase(), DealPhase::Dealt);
        assert_eq!(deal.hand(Seat::North).cards(), &deck.cards()[0..5]);
        assert_eq!(deal.hand(Seat::West).cards(), &deck.cards()[15..20]);
        assert_eq!(deal.turncard(), Some(deck.cards()[23]));
        assert_eq!(deal.bury(), &deck.cards()[20..23]);
        assert_eq!(deal.total_cards(), DECK_SIZE);
    }

    #[test]
    fn redealing_is_rejected() {
        let mut deal = dealt(Seat::North, 3);
        assert!(matches!(
            deal.deal_cards(),
            Err(DealError::WrongPhase { action: "deal", .. })
        ));
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        assert!(deal.shuffle(&mut rng).is_err());
    }

    #[test]
    fn out_of_turn_bid_is_rejected() {
        let mut deal = dealt(Seat::North, 7);
        assert_eq!(
            deal.submit_bid(Seat::South, None),
            Err(DealError::OutOfTurn {
                expected: Seat::East,
                actual: Seat::South
            })
        );
    }

    #[test]
    fn first_round_bid_must_name_turn_suit() {
        let mut deal = dealt(Seat::North, 11);
        let turn = deal.turncard().unwrap().suit;
        let wrong = turn.next_suit();
        assert!(matches!(
            deal.submit_bid(Seat::East, Some(wrong)),
            Err(DealError::TurnSuitRequired { .. })
        ));
        assert!(deal.bids().is_empty());
    }

    #[test]
    fn order_up_moves_turncard_to_dealer_then_discard_sets_trump() {
        let mut deal = dealt(Seat::North, 5);
        let turncard = deal.turncard().unwrap();
        assert_eq!(
            deal.submit_bid(Seat::East, Some(turncard.suit)),
            Ok(BidStatus::AwaitingDiscard)
        );
        assert_eq!(deal.hand(Seat::North).len(), 6);
        assert!(deal.hand(Seat::North).contains(turncard));
        assert_eq!(deal.total_cards(), DECK_SIZE);

        let discard = deal.hand(Seat::North).cards()[0];
        assert_eq!(deal.submit_discard(Seat::East, discard), Err(DealError::NotDealer(Seat::East)));
        deal.submit_discard(Seat::North, discard).unwrap();
        assert_eq!(deal.phase(), DealPhase::TrumpSet);
        assert_eq!(deal.hand(Seat::North).len(), 5);
        assert_eq!(deal.bury().len(), 4);
        assert_eq!(deal.caller(), Some(Seat::East));
        assert_eq!(deal.call_position(), Some(0));
        assert_eq!(deal.expected_player(), Some(Seat::East));
        assert_eq!(deal.total_cards(), DECK_SIZE);
    }

    #[test]
    fn second_round_rejects_turn_suit_and_accepts_other() {
        let mut deal = dealt(Seat::East, 9);
        let turn = deal.turncard().unwrap().suit;
        for position in 0..4 {
            let seat = Seat::at_position(Seat::East, position);
            deal.submit_bid(seat, None).unwrap();
        }
        assert!(!deal.turncard_up());
        assert_eq!(deal.bury().len(), 4);
        assert_eq!(
            deal.submit_bid(Seat::South, Some(turn)),
            Err(DealError::TurnSuitRejected { turn })
        );
        assert_eq!(
            deal.submit_bid(Seat::South, Some(turn.next_suit())),
            Ok(BidStatus::TrumpSet(turn.next_suit()))
        );
        assert_eq!(deal.call_position(), Some(4));
    }

    #[test]
    fn eight_passes_pass_the_deal_out() {
        let mut deal = dealt(Seat::South, 13);
        let mut last = BidStatus::Continue;
        for position in 0..8 {
            let seat = Seat::at_position(Seat::South, position);
            last = deal.submit_bid(seat, None).unwrap();
        }
        assert_eq!(last, BidStatus::PassedOut);
        assert_eq!(deal.phase(), DealPhase::PassedOut);
        assert_eq!(deal.contract(), None);
        assert_eq!(deal.team_points(), [0, 0]);
        assert_eq!(deal.total_cards(), DECK_SIZE);
    }

    #[test]
    fn stuck_dealer_cannot_pass() {
        let rules = DealRules {
            stick_the_dealer: true,
        };
        let mut deal = Deal::from_deck(Seat::North, rules, Deck::shuffled_with_seed(21));
        deal.deal_cards().unwrap();
        for position in 0..7 {
            let seat = Seat::at_position(Seat::North, position);
            deal.submit_bid(seat, None).unwrap();
        }
        assert_eq!(
            deal.submit_bid(Seat::North, None),
            Err(DealError::DealerMustCall(Seat::North))
        );
    }

    #[test]
    fn play_validates_turn_ownership_and_following() {
        // Unshuffled order: North 9-K clubs, East A clubs and 9-Q diamonds,
        // turncard A spades.
        let deck = Deck::standard();
        let mut deal = Deal::from_deck(Seat::West, DealRules::default(), deck);
        deal.deal_cards().unwrap();
        for position in 0..4 {
            deal.submit_bid(Seat::at_position(Seat::West, position), None).unwrap();
        }
        deal.submit_bid(Seat::North, Some(Suit::Hearts)).unwrap();

        let nine_clubs = Card::new(Rank::Nine, Suit::Clubs);
        assert!(matches!(
            deal.play_card(Seat::East, nine_clubs),
            Err(DealError::OutOfTurn { .. })
        ));
        assert!(matches!(
            deal.play_card(Seat::North, Card::new(Rank::Nine, Suit::Hearts)),
            Err(DealError::CardNotInHand { .. })
        ));
        assert_eq!(deal.play_card(Seat::North, nine_clubs), Ok(PlayOutcome::Played));
        let east_diamond = deal.hand(Seat::East).suit_cards(Suit::Diamonds)[0];
        assert!(matches!(
            deal.play_card(Seat::East, east_diamond),
            Err(DealError::MustFollowSuit { .. })
        ));
        assert_eq!(deal.legal_cards(Seat::East), vec![Card::new(Rank::Ace, Suit::Clubs)]);
    }

    #[test]
    fn full_deal_scores_after_five_tricks() {
        let mut deal = dealt(Seat::North, 17);
        let turn = deal.turncard().unwrap().suit;
        deal.submit_bid(Seat::East, Some(turn)).unwrap();
        let discard = deal.hand(Seat::North).cards()[0];
        deal.submit_discard(Seat::North, discard).unwrap();

        let mut outcome = PlayOutcome::Played;
        while let Some(seat) = deal.expected_player() {
            let card = deal.legal_cards(seat)[0];
            outcome = deal.play_card(seat, card).unwrap();
            assert_eq!(deal.total_cards(), DECK_SIZE);
        }
        assert_eq!(deal.phase(), DealPhase::Scored);
        assert_eq!(deal.tricks().len(), 5);
        let tricks = deal.team_tricks();
        assert_eq!(tricks[0] + tricks[1], 5);
        match outcome {
            PlayOutcome::DealScored { points } => {
                assert_eq!(points, deal.team_points());
                assert!(points[0] > 0 || points[1] > 0);
            }
            other => panic!("expected DealScored, got {other:?}"),
        }
        assert!(deal.hand(Seat::North).is_empty());
    }
}
