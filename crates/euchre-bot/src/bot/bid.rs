use super::discard::DiscardPlanner;
use super::params::BotParams;
use crate::policy::PolicyError;
use euchre_core::analysis::HandAnalyzer;
use euchre_core::model::card::Card;
use euchre_core::model::suit::Suit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidChoice {
    pub call: Option<Suit>,
    /// Score of the best candidate suit, after any position adjustment.
    pub score: i32,
    pub threshold: i32,
    pub reason: &'static str,
}

/// Turns hand analysis into an order-up, a call or a pass.
///
/// Sees only the bidder's own cards and the turncard.
pub struct BidPlanner;

impl BidPlanner {
    pub fn choose(
        hand: &[Card],
        position: usize,
        turncard: Card,
        stick_the_dealer: bool,
        params: &BotParams,
    ) -> Result<BidChoice, PolicyError> {
        let analyzer = HandAnalyzer::new(params.weights);
        let threshold = params.threshold(position);
        let turn = turncard.suit;

        if position < 4 {
            let score = if position == 3 {
                Self::dealer_score(&analyzer, hand, turncard)?
            } else {
                analyzer.analyze(hand, turn)?.hand_score
                    + analyzer.turncard_adjustment(position, turncard)
            };
            let call = (score > threshold).then_some(turn);
            return Ok(BidChoice {
                call,
                score,
                threshold,
                reason: if call.is_some() { "order_up" } else { "pass" },
            });
        }

        let (best, score) = Self::best_other_suit(&analyzer, hand, turn)?;
        let (call, reason) = if score > threshold {
            (Some(best), "call")
        } else if stick_the_dealer && position == 7 {
            (Some(best), "stuck_dealer")
        } else {
            (None, "pass")
        };
        Ok(BidChoice {
            call,
            score,
            threshold,
            reason,
        })
    }

    /// The dealer values the hand it would keep after picking up and
    /// discarding.
    fn dealer_score(
        analyzer: &HandAnalyzer,
        hand: &[Card],
        turncard: Card,
    ) -> Result<i32, PolicyError> {
        let mut cards = hand.to_vec();
        cards.push(turncard);
        let discard = DiscardPlanner::choose(&cards, turncard.suit)?;
        cards.retain(|&c| c != discard);
        Ok(analyzer.analyze(&cards, turncard.suit)?.hand_score)
    }

    /// Highest-scoring suit other than `turn`. Ties go to the next suit, then
    /// to the lower suit index.
    fn best_other_suit(
        analyzer: &HandAnalyzer,
        hand: &[Card],
        turn: Suit,
    ) -> Result<(Suit, i32), PolicyError> {
        let [green, purple] = turn.cross_suits();
        let mut best: Option<(Suit, i32)> = None;
        for suit in [turn.next_suit(), green, purple] {
            let score = analyzer.analyze(hand, suit)?.hand_score;
            match best {
                Some((best_suit, best_score))
                    if score < best_score
                        || (score == best_score && !prefer_on_tie(suit, best_suit, turn)) => {}
                _ => best = Some((suit, score)),
            }
        }
        Ok(best.unwrap_or((turn.next_suit(), i32::MIN)))
    }
}

fn prefer_on_tie(candidate: Suit, current: Suit, turn: Suit) -> bool {
    let next = turn.next_suit();
    if current == next {
        false
    } else if candidate == next {
        true
    } else {
        candidate.index() < current.index()
    }
}
