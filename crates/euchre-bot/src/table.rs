use crate::bot::{BotParams, UnseenTracker};
use crate::policy::{
    BidContext, DiscardContext, HeuristicPolicy, PlayContext, Policy, PolicyError,
};
use euchre_core::game::record::DealRecord;
use euchre_core::model::card::Card;
use euchre_core::model::deal::{BidStatus, Deal, DealError, DealPhase, PlayOutcome};
use euchre_core::model::player::Seat;
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::Play;
use rand::RngCore;
use std::fmt;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidOutcome {
    pub contract: Option<Suit>,
    pub caller: Option<Seat>,
    pub call_position: Option<usize>,
    /// The dealer's discard after an order-up.
    pub discard: Option<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickResult {
    pub leader: Seat,
    pub winner: Seat,
    pub plays: Vec<Play>,
}

#[derive(Debug)]
pub enum TableError {
    Deal(DealError),
    Policy { seat: Seat, source: PolicyError },
    Phase(DealPhase),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Deal(err) => write!(f, "deal rejected action: {err}"),
            TableError::Policy { seat, source } => write!(f, "policy for {seat} failed: {source}"),
            TableError::Phase(phase) => write!(f, "table cannot act on a deal in phase {phase:?}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Deal(err) => Some(err),
            TableError::Policy { source, .. } => Some(source),
            TableError::Phase(_) => None,
        }
    }
}

impl From<DealError> for TableError {
    fn from(err: DealError) -> Self {
        TableError::Deal(err)
    }
}

/// Four policies seated around a deal. The table asks each seat for its
/// decisions and feeds them to the deal state machine, which rejects anything
/// illegal.
pub struct Table {
    seats: [Box<dyn Policy>; 4],
}

impl Table {
    pub fn new(seats: [Box<dyn Policy>; 4]) -> Self {
        Self { seats }
    }

    /// Every seat plays the heuristic with the same parameters.
    pub fn heuristic(params: BotParams) -> Self {
        Self::new(std::array::from_fn(|_| {
            Box::new(HeuristicPolicy::new(params)) as Box<dyn Policy>
        }))
    }

    pub fn seat_policy(&mut self, seat: Seat, policy: Box<dyn Policy>) {
        self.seats[seat.index()] = policy;
    }

    /// Deals the deck if needed, then bids, discards and plays to the end.
    pub fn play_deal(
        &mut self,
        deal: &mut Deal,
        rng: &mut dyn RngCore,
    ) -> Result<DealRecord, TableError> {
        match deal.phase() {
            DealPhase::Pending => {
                deal.shuffle(rng)?;
                deal.deal_cards()?;
            }
            DealPhase::Shuffled => deal.deal_cards()?,
            _ => {}
        }
        let outcome = self.run_bidding(deal)?;
        if outcome.contract.is_some() {
            self.run_tricks(deal, rng)?;
        }
        let record = DealRecord::from_deal(deal).ok_or(TableError::Phase(deal.phase()))?;
        event!(
            target: "euchre_bot::table",
            Level::INFO,
            dealer = ?deal.dealer(),
            caller = ?deal.caller(),
            contract = ?deal.contract(),
            team_tricks = ?deal.team_tricks(),
            points = record.points,
            "deal finished"
        );
        Ok(record)
    }

    /// Runs up to eight bids, including the dealer's discard on an order-up.
    pub fn run_bidding(&mut self, deal: &mut Deal) -> Result<BidOutcome, TableError> {
        if !matches!(deal.phase(), DealPhase::Dealt | DealPhase::Bidding) {
            return Err(TableError::Phase(deal.phase()));
        }
        let turncard = deal.turncard().ok_or(TableError::Phase(deal.phase()))?;
        let dealer = deal.dealer();
        let stick_the_dealer = deal.rules().stick_the_dealer;

        while let Some(seat) = deal.expected_bidder() {
            let position = deal.bid_position();
            let call = {
                let ctx = BidContext {
                    seat,
                    position,
                    hand: deal.hand_at_position(position),
                    turncard,
                    dealer,
                    stick_the_dealer,
                };
                self.seats[seat.index()]
                    .choose_bid(&ctx)
                    .map_err(|source| TableError::Policy { seat, source })?
            };
            event!(
                target: "euchre_bot::table",
                Level::DEBUG,
                seat = ?seat,
                position,
                call = ?call,
                "bid"
            );

            match deal.submit_bid(seat, call)? {
                BidStatus::AwaitingDiscard => {
                    let card = {
                        let ctx = DiscardContext {
                            seat: dealer,
                            hand: deal.hand(dealer),
                            trump: turncard.suit,
                            turncard,
                        };
                        self.seats[dealer.index()]
                            .choose_discard(&ctx)
                            .map_err(|source| TableError::Policy {
                                seat: dealer,
                                source,
                            })?
                    };
                    deal.submit_discard(dealer, card)?;
                }
                BidStatus::Continue | BidStatus::TrumpSet(_) | BidStatus::PassedOut => {}
            }
        }

        if deal.phase() == DealPhase::PassedOut {
            event!(
                target: "euchre_bot::table",
                Level::DEBUG,
                dealer = ?dealer,
                "passed out"
            );
        }

        Ok(BidOutcome {
            contract: deal.contract(),
            caller: deal.caller(),
            call_position: deal.call_position(),
            discard: deal.discard(),
        })
    }

    /// Plays all five tricks. Each seat keeps its own unseen-card ledger fed
    /// only with its hand and the cards that land on the table.
    pub fn run_tricks(
        &mut self,
        deal: &mut Deal,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<TrickResult>, TableError> {
        if deal.phase() != DealPhase::TrumpSet {
            return Err(TableError::Phase(deal.phase()));
        }
        let (Some(trump), Some(caller), Some(call_position), Some(turncard)) = (
            deal.contract(),
            deal.caller(),
            deal.call_position(),
            deal.turncard(),
        ) else {
            return Err(TableError::Phase(deal.phase()));
        };

        let mut trackers = Seat::LOOP.map(|seat| {
            let mut known_out = Vec::with_capacity(2);
            if call_position >= 4 {
                known_out.push(turncard);
            }
            if seat == deal.dealer() {
                known_out.extend(deal.discard());
            }
            let mut tracker = UnseenTracker::new(seat, trump);
            tracker.reset(deal.hand(seat), trump, &known_out);
            tracker
        });
        for policy in &mut self.seats {
            policy.begin_play(trump);
        }

        let mut results = Vec::with_capacity(5);
        while let Some(seat) = deal.expected_player() {
            let Some(trick) = deal.current_trick() else {
                return Err(TableError::Phase(deal.phase()));
            };
            let lead_suit = trick.lead_suit();
            let card = {
                let ctx = PlayContext {
                    seat,
                    hand: deal.hand(seat),
                    trump,
                    caller,
                    call_position,
                    turn_suit: turncard.suit,
                    trick,
                    tricks_played: deal.tricks().len(),
                    tracker: &trackers[seat.index()],
                };
                self.seats[seat.index()]
                    .choose_play(&ctx, rng)
                    .map_err(|source| TableError::Policy { seat, source })?
            };

            let outcome = deal.play_card(seat, card)?;
            for tracker in &mut trackers {
                tracker.note_play(lead_suit, Play { seat, card });
            }

            match outcome {
                PlayOutcome::Played => {}
                PlayOutcome::TrickCompleted { .. } | PlayOutcome::DealScored { .. } => {
                    if let Some(finished) = deal.tricks().last() {
                        let result = TrickResult {
                            leader: finished.leader(),
                            winner: finished.winner().unwrap_or(seat),
                            plays: finished.plays().to_vec(),
                        };
                        event!(
                            target: "euchre_bot::table",
                            Level::DEBUG,
                            trick = results.len() + 1,
                            leader = ?result.leader,
                            winner = ?result.winner,
                            "trick complete"
                        );
                        results.push(result);
                    }
                }
            }
        }
        Ok(results)
    }
}
