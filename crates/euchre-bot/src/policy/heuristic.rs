use super::{BidContext, DiscardContext, PlayContext, Policy, PolicyError};
use crate::bot::{BidChoice, BidPlanner, BotParams, DiscardPlanner, PlayInput, PlayPlanner};
use crate::bot::{Strategy, StrategySet};
use euchre_core::model::card::Card;
use euchre_core::model::suit::Suit;
use rand::RngCore;
use tracing::{Level, event};

/// Adapter that drives the bid, discard and play planners for one seat.
#[derive(Debug, Clone, Default)]
pub struct HeuristicPolicy {
    params: BotParams,
    strategies: StrategySet,
}

impl HeuristicPolicy {
    pub fn new(params: BotParams) -> Self {
        Self {
            params,
            strategies: StrategySet::new(),
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    pub(crate) fn bid_choice(&self, ctx: &BidContext) -> Result<BidChoice, PolicyError> {
        BidPlanner::choose(
            ctx.hand.cards(),
            ctx.position,
            ctx.turncard,
            ctx.stick_the_dealer,
            &self.params,
        )
    }
}

impl Policy for HeuristicPolicy {
    fn choose_bid(&mut self, ctx: &BidContext) -> Result<Option<Suit>, PolicyError> {
        let choice = self.bid_choice(ctx)?;
        log_bid_decision(ctx, &choice);
        Ok(choice.call)
    }

    fn choose_discard(&mut self, ctx: &DiscardContext) -> Result<Card, PolicyError> {
        let (card, rule) = DiscardPlanner::choose_with_rule(ctx.hand.cards(), ctx.trump)?;
        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "euchre_bot::discard",
                Level::DEBUG,
                seat = ?ctx.seat,
                trump = %ctx.trump,
                turncard = %ctx.turncard,
                rule,
                chosen = %card,
            );
        }
        Ok(card)
    }

    fn begin_play(&mut self, _trump: Suit) {
        self.strategies.clear();
    }

    fn choose_play(
        &mut self,
        ctx: &PlayContext,
        rng: &mut dyn RngCore,
    ) -> Result<Card, PolicyError> {
        let mut input = PlayInput {
            seat: ctx.seat,
            hand: ctx.hand,
            trump: ctx.trump,
            caller: ctx.caller,
            call_position: ctx.call_position,
            turn_suit: ctx.turn_suit,
            trick: ctx.trick,
            tricks_played: ctx.tricks_played,
            tracker: ctx.tracker,
            strategies: &mut self.strategies,
            rng,
        };
        let (card, rule) = PlayPlanner::choose(&mut input)?;
        log_play_decision(ctx, &self.strategies, card, rule);
        Ok(card)
    }
}

fn log_bid_decision(ctx: &BidContext, choice: &BidChoice) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let call = choice
        .call
        .map(|suit| suit.to_string())
        .unwrap_or_else(|| "pass".to_string());
    event!(
        target: "euchre_bot::bid",
        Level::DEBUG,
        seat = ?ctx.seat,
        position = ctx.position,
        turncard = %ctx.turncard,
        score = choice.score,
        threshold = choice.threshold,
        reason = choice.reason,
        call = %call,
    );
}

fn log_play_decision(ctx: &PlayContext, strategies: &StrategySet, chosen: Card, rule: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "euchre_bot::play",
        Level::DEBUG,
        seat = ?ctx.seat,
        trick = ctx.tricks_played + 1,
        trick_cards = ctx.trick.plays().len(),
        hand_size = ctx.hand.len(),
        drawing_trump = strategies.contains(Strategy::DrawTrump),
        preserving_trump = strategies.contains(Strategy::PreserveTrump),
        rule,
        chosen = %chosen,
    );
}

#[cfg(test)]
mod tests {
    use super::HeuristicPolicy;
    use crate::bot::{Strategy, UnseenTracker};
    use crate::policy::{BidContext, DiscardContext, PlayContext, Policy};
    use euchre_core::model::card::Card;
    use euchre_core::model::hand::Hand;
    use euchre_core::model::player::Seat;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::suit::Suit;
    use euchre_core::model::trick::Trick;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn bids_discards_and_plays_through_the_trait() {
        let mut policy = HeuristicPolicy::default();
        let mut hand = Hand::with_cards(vec![
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Jack, Suit::Diamonds),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Nine, Suit::Clubs),
        ]);
        let turncard = c(Rank::Ten, Suit::Hearts);
        let bid = policy
            .choose_bid(&BidContext {
                seat: Seat::South,
                position: 3,
                hand: &hand,
                turncard,
                dealer: Seat::South,
                stick_the_dealer: false,
            })
            .unwrap();
        assert_eq!(bid, Some(Suit::Hearts));

        hand.add(turncard);
        hand.set_trump(Suit::Hearts);
        let discard = policy
            .choose_discard(&DiscardContext {
                seat: Seat::South,
                hand: &hand,
                trump: Suit::Hearts,
                turncard,
            })
            .unwrap();
        assert_eq!(discard, c(Rank::Nine, Suit::Clubs));
        hand.remove(discard);

        policy.begin_play(Suit::Hearts);
        let mut tracker = UnseenTracker::new(Seat::South, Suit::Hearts);
        tracker.reset(&hand, Suit::Hearts, &[discard]);
        let trick = Trick::new(Seat::South, Suit::Hearts);
        let mut rng = StdRng::seed_from_u64(1);
        let card = policy
            .choose_play(
                &PlayContext {
                    seat: Seat::South,
                    hand: &hand,
                    trump: Suit::Hearts,
                    caller: Seat::South,
                    call_position: 3,
                    turn_suit: Suit::Hearts,
                    trick: &trick,
                    tricks_played: 0,
                    tracker: &tracker,
                },
                &mut rng,
            )
            .unwrap();
        assert_eq!(card, c(Rank::Jack, Suit::Hearts));
        assert!(policy.strategies().contains(Strategy::DrawTrump));

        policy.begin_play(Suit::Spades);
        assert!(policy.strategies().is_empty());
    }
}
