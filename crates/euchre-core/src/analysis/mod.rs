use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::{array, fmt};

pub const ANALYSIS_HAND_SIZE: usize = 5;
pub const TOP_TRUMP_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisWeights {
    pub trump_weight: i32,
    pub void_weight: i32,
    pub ace_weight: i32,
    /// Points per two turncard levels gained or risked by ordering up.
    pub turncard_weight: i32,
}

impl Default for AnalysisWeights {
    fn default() -> Self {
        Self {
            trump_weight: 4,
            void_weight: 3,
            ace_weight: 4,
            turncard_weight: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    HandSize { expected: usize, actual: usize },
    DuplicateCard(Card),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::HandSize { expected, actual } => {
                write!(f, "analysis needs {expected} cards, got {actual}")
            }
            AnalysisError::DuplicateCard(card) => write!(f, "{card} appears twice in hand"),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Static suit roles for a trump suit. `green` and `purple` here are the two
/// opposite-color suits in index order; an analysis may swap them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeSuits {
    pub trump: Suit,
    pub next: Suit,
    pub green: Suit,
    pub purple: Suit,
}

impl RelativeSuits {
    pub const fn for_trump(trump: Suit) -> Self {
        let [green, purple] = trump.cross_suits();
        Self {
            trump,
            next: trump.next_suit(),
            green,
            purple,
        }
    }

    pub const fn off_suits(&self) -> [Suit; 3] {
        [self.next, self.green, self.purple]
    }
}

/// Bidding features of one five-card hand for one candidate trump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandAnalysis {
    pub suits: RelativeSuits,
    /// Cards per effective suit, lowest effective level first.
    pub buckets: [Vec<Card>; 4],
    pub trumps: usize,
    pub bowers: usize,
    pub voids: usize,
    pub singletons: usize,
    pub trump_score: i32,
    pub next_score: i32,
    pub green_score: i32,
    pub purple_score: i32,
    /// Running sum of trump levels from the highest trump down.
    pub top_trump: [i32; TOP_TRUMP_DEPTH],
    pub off_aces: usize,
    pub hand_score: i32,
}

impl HandAnalysis {
    pub fn trump(&self) -> Suit {
        self.suits.trump
    }

    pub fn count(&self, suit: Suit) -> usize {
        self.buckets[suit.index()].len()
    }

    pub fn suit_cards(&self, suit: Suit) -> &[Card] {
        &self.buckets[suit.index()]
    }

    pub fn holds_right_bower(&self) -> bool {
        self.suit_cards(self.trump())
            .last()
            .is_some_and(|card| card.is_right_bower(self.trump()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HandAnalyzer {
    weights: AnalysisWeights,
}

impl HandAnalyzer {
    pub const fn new(weights: AnalysisWeights) -> Self {
        Self { weights }
    }

    pub const fn weights(&self) -> AnalysisWeights {
        self.weights
    }

    pub fn analyze(&self, cards: &[Card], trump: Suit) -> Result<HandAnalysis, AnalysisError> {
        if cards.len() != ANALYSIS_HAND_SIZE {
            return Err(AnalysisError::HandSize {
                expected: ANALYSIS_HAND_SIZE,
                actual: cards.len(),
            });
        }
        let mut seen = [false; 24];
        for &card in cards {
            if std::mem::replace(&mut seen[card.index()], true) {
                return Err(AnalysisError::DuplicateCard(card));
            }
        }

        let mut buckets: [Vec<Card>; 4] =
            array::from_fn(|_| Vec::with_capacity(ANALYSIS_HAND_SIZE));
        for &card in cards {
            buckets[card.effective_suit(trump).index()].push(card);
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|card| card.effective_level(trump));
        }

        let level_sum = |suit: Suit| -> i32 {
            buckets[suit.index()]
                .iter()
                .map(|card| i32::from(card.effective_level(trump)))
                .sum()
        };

        let mut suits = RelativeSuits::for_trump(trump);
        let trump_score = level_sum(trump);
        let next_score = level_sum(suits.next);
        let mut green_score = level_sum(suits.green);
        let mut purple_score = level_sum(suits.purple);
        if purple_score > green_score {
            std::mem::swap(&mut suits.green, &mut suits.purple);
            std::mem::swap(&mut green_score, &mut purple_score);
        }

        let off = suits.off_suits();
        let voids = off.iter().filter(|s| buckets[s.index()].is_empty()).count();
        let singletons = off.iter().filter(|s| buckets[s.index()].len() == 1).count();
        let off_aces = off
            .iter()
            .flat_map(|s| buckets[s.index()].iter())
            .filter(|card| card.is_ace())
            .count();

        let trump_cards = &buckets[trump.index()];
        let trumps = trump_cards.len();
        let bowers = trump_cards
            .iter()
            .filter(|card| card.rank == Rank::Jack)
            .count();

        let mut top_trump = [0; TOP_TRUMP_DEPTH];
        let mut running = 0;
        for (slot, card) in top_trump.iter_mut().zip(trump_cards.iter().rev()) {
            running += i32::from(card.effective_level(trump));
            *slot = running;
        }
        for idx in 1..TOP_TRUMP_DEPTH {
            top_trump[idx] = top_trump[idx].max(top_trump[idx - 1]);
        }

        let w = self.weights;
        let hand_score = trump_score
            + trumps as i32 * w.trump_weight
            + voids as i32 * w.void_weight
            + off_aces as i32 * w.ace_weight;

        Ok(HandAnalysis {
            suits,
            buckets,
            trumps,
            bowers,
            voids,
            singletons,
            trump_score,
            next_score,
            green_score,
            purple_score,
            top_trump,
            off_aces,
            hand_score,
        })
    }

    /// All four candidate trumps, indexed by suit.
    pub fn analyze_all(&self, cards: &[Card]) -> Result<[HandAnalysis; 4], AnalysisError> {
        let [c, d, h, s] = Suit::ALL.map(|suit| self.analyze(cards, suit));
        Ok([c?, d?, h?, s?])
    }

    /// First-round adjustment for ordering the turncard into the dealer's hand.
    ///
    /// The seats left and across from the dealer hand the dealer's side the
    /// turncard's value; the dealer's partner adds it. Other positions and the
    /// dealer (who is analyzed with the turncard already in hand) get zero.
    pub fn turncard_adjustment(&self, position: usize, turncard: Card) -> i32 {
        let value = i32::from(turncard.turncard_level()) * self.weights.turncard_weight / 2;
        match position {
            0 | 2 => -value,
            1 => value,
            _ => 0,
        }
    }
}
