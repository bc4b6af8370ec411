use super::{BidContext, DiscardContext, HeuristicPolicy, PlayContext, Policy, PolicyError};
use crate::bot::BotParams;
use euchre_core::model::card::Card;
use euchre_core::model::suit::Suit;
use rand::RngCore;
use tracing::{Level, event};

/// Number of distinct forced-bid variants: four first-round order-ups and
/// three second-round suits at each of four positions.
pub const FORCED_VARIANTS: u8 = 16;

/// Forces a single bid at one table position and passes everywhere else.
///
/// Variant `v` below 4 orders up the turn suit at position `v`. From 4 up the
/// bidder at position `4 + (v & 3)` calls next, green or purple for
/// `v / 4` of 1, 2 or 3, where green and purple are taken by suit index from
/// the turn suit rather than by hand strength. Discards and card play are
/// left to the heuristic.
#[derive(Debug, Clone)]
pub struct ForcedBidPolicy {
    variant: u8,
    inner: HeuristicPolicy,
}

impl ForcedBidPolicy {
    pub fn new(variant: u8, params: BotParams) -> Self {
        Self {
            variant: variant % FORCED_VARIANTS,
            inner: HeuristicPolicy::new(params),
        }
    }

    pub fn variant(&self) -> u8 {
        self.variant
    }

    /// Position this variant bids at.
    pub fn position(&self) -> usize {
        if self.variant < 4 {
            self.variant as usize
        } else {
            4 + (self.variant & 3) as usize
        }
    }

    /// Suit this variant names for a given turn suit.
    pub fn forced_suit(&self, turn: Suit) -> Suit {
        let [green, purple] = turn.cross_suits();
        match self.variant / 4 {
            0 => turn,
            1 => turn.next_suit(),
            2 => green,
            _ => purple,
        }
    }
}

impl Policy for ForcedBidPolicy {
    fn choose_bid(&mut self, ctx: &BidContext) -> Result<Option<Suit>, PolicyError> {
        if ctx.position == self.position() {
            let call = self.forced_suit(ctx.turncard.suit);
            event!(
                target: "euchre_bot::bid",
                Level::DEBUG,
                seat = ?ctx.seat,
                position = ctx.position,
                variant = self.variant,
                reason = "forced",
                call = %call,
            );
            return Ok(Some(call));
        }
        if ctx.stick_the_dealer && ctx.position == 7 {
            return self.inner.choose_bid(ctx);
        }
        Ok(None)
    }

    fn choose_discard(&mut self, ctx: &DiscardContext) -> Result<Card, PolicyError> {
        self.inner.choose_discard(ctx)
    }

    fn begin_play(&mut self, trump: Suit) {
        self.inner.begin_play(trump);
    }

    fn choose_play(
        &mut self,
        ctx: &PlayContext,
        rng: &mut dyn RngCore,
    ) -> Result<Card, PolicyError> {
        self.inner.choose_play(ctx, rng)
    }
}
