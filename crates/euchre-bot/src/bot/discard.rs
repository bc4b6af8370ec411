use super::lowest;
use euchre_core::model::card::Card;
use euchre_core::model::suit::Suit;
use std::{array, fmt};

pub const DISCARD_HAND_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardError {
    HandSize { expected: usize, actual: usize },
    Exhausted,
}

impl fmt::Display for DiscardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardError::HandSize { expected, actual } => {
                write!(f, "discard needs {expected} cards, got {actual}")
            }
            DiscardError::Exhausted => write!(f, "no discard rule produced a card"),
        }
    }
}

impl std::error::Error for DiscardError {}

/// The dealer's six cards split by effective suit, lowest level first.
struct DiscardInput {
    trump: Suit,
    cards: Vec<Card>,
    buckets: [Vec<Card>; 4],
}

impl DiscardInput {
    fn new(cards: &[Card], trump: Suit) -> Self {
        let mut buckets: [Vec<Card>; 4] = array::from_fn(|_| Vec::new());
        for &card in cards {
            buckets[card.effective_suit(trump).index()].push(card);
        }
        for bucket in &mut buckets {
            bucket.sort_by_key(|card| card.effective_level(trump));
        }
        Self {
            trump,
            cards: cards.to_vec(),
            buckets,
        }
    }

    fn bucket(&self, suit: Suit) -> &[Card] {
        &self.buckets[suit.index()]
    }

    fn off_suits(&self) -> impl Iterator<Item = Suit> + '_ {
        Suit::ALL.into_iter().filter(move |&s| s != self.trump)
    }

    /// Discarding `card` would leave a king with no guard.
    fn unguards_king(&self, card: Card) -> bool {
        let bucket = self.bucket(card.effective_suit(self.trump));
        bucket.len() == 2 && !card.is_king() && bucket.iter().any(|c| c.is_king())
    }
}

type DiscardRule = fn(&DiscardInput) -> Option<Card>;

const RULES: &[(&str, DiscardRule)] = &[
    ("all_trump", all_trump),
    ("create_void", create_void),
    ("create_doubleton", create_doubleton),
    ("thin_next", thin_next),
    ("lowest_overall", lowest_overall),
];

/// Picks the dealer's discard after taking up the turncard.
pub struct DiscardPlanner;

impl DiscardPlanner {
    pub fn choose(cards: &[Card], trump: Suit) -> Result<Card, DiscardError> {
        Self::choose_with_rule(cards, trump).map(|(card, _)| card)
    }

    /// Same as `choose`, also naming the rule that fired.
    pub fn choose_with_rule(
        cards: &[Card],
        trump: Suit,
    ) -> Result<(Card, &'static str), DiscardError> {
        if cards.len() != DISCARD_HAND_SIZE {
            return Err(DiscardError::HandSize {
                expected: DISCARD_HAND_SIZE,
                actual: cards.len(),
            });
        }
        let input = DiscardInput::new(cards, trump);
        RULES
            .iter()
            .find_map(|(name, rule)| rule(&input).map(|card| (card, *name)))
            .ok_or(DiscardError::Exhausted)
    }
}

fn all_trump(input: &DiscardInput) -> Option<Card> {
    if input.cards.iter().all(|c| c.is_trump(input.trump)) {
        input.bucket(input.trump).first().copied()
    } else {
        None
    }
}

fn create_void(input: &DiscardInput) -> Option<Card> {
    let singletons = input
        .off_suits()
        .filter_map(|suit| match input.bucket(suit) {
            [only] if !only.is_ace() => Some(*only),
            _ => None,
        });
    lowest(singletons, input.trump)
}

fn create_doubleton(input: &DiscardInput) -> Option<Card> {
    let mut triples = input.off_suits().filter(|&s| input.bucket(s).len() == 3);
    match (triples.next(), triples.next()) {
        (Some(suit), None) => input
            .bucket(suit)
            .iter()
            .copied()
            .find(|&c| !input.unguards_king(c)),
        _ => None,
    }
}

fn thin_next(input: &DiscardInput) -> Option<Card> {
    let next = input.bucket(input.trump.next_suit());
    if next.len() == 2 && !next.iter().any(|c| c.is_king()) {
        next.first().copied()
    } else {
        None
    }
}

fn lowest_overall(input: &DiscardInput) -> Option<Card> {
    let mut candidates: Vec<Card> = input
        .cards
        .iter()
        .copied()
        .filter(|c| !c.is_trump(input.trump))
        .collect();
    candidates.sort_by_key(|c| (c.effective_level(input.trump), c.suit.index()));

    let mut save = Vec::new();
    for card in candidates {
        let lone_ace = card.is_ace() && input.bucket(card.suit).len() == 1;
        if lone_ace || input.unguards_king(card) {
            save.push(card);
            continue;
        }
        return Some(card);
    }
    save.first().copied()
}

#[cfg(test)]
mod tests {
    use super::{DiscardError, DiscardPlanner};
    use euchre_core::model::card::Card;
    use euchre_core::model::deck::Deck;
    use euchre_core::model::rank::Rank;
    use euchre_core::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn nines_hand_voids_a_nine_and_keeps_the_bower() {
        let cards = [
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Jack, Suit::Clubs),
        ];
        let (card, rule) = DiscardPlanner::choose_with_rule(&cards, Suit::Clubs).unwrap();
        assert_eq!(rule, "create_void");
        assert!(card.rank == Rank::Nine && card.suit != Suit::Clubs);
        assert_eq!(card, c(Rank::Nine, Suit::Diamonds));
    }

    #[test]
    fn all_trump_discards_lowest_trump() {
        let cards = [
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Jack, Suit::Diamonds),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
        ];
        let (card, rule) = DiscardPlanner::choose_with_rule(&cards, Suit::Hearts).unwrap();
        assert_eq!(rule, "all_trump");
        assert_eq!(card, c(Rank::Ten, Suit::Hearts));
    }

    #[test]
    fn singleton_ace_is_not_voided() {
        let cards = [
            c(Rank::Ace, Suit::Clubs),
            c(Rank::Nine, Suit::Hearts),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Ten, Suit::Diamonds),
            c(Rank::Queen, Suit::Diamonds),
        ];
        let (card, rule) = DiscardPlanner::choose_with_rule(&cards, Suit::Diamonds).unwrap();
        assert_ne!(card, c(Rank::Ace, Suit::Clubs));
        assert_eq!(rule, "thin_next");
        assert_eq!(card, c(Rank::Nine, Suit::Hearts));
    }

    #[test]
    fn triple_suit_drops_to_doubleton() {
        let cards = [
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::King, Suit::Diamonds),
            c(Rank::Ace, Suit::Diamonds),
            c(Rank::Ace, Suit::Spades),
            c(Rank::King, Suit::Spades),
            c(Rank::Jack, Suit::Clubs),
        ];
        let (card, rule) = DiscardPlanner::choose_with_rule(&cards, Suit::Clubs).unwrap();
        assert_eq!(rule, "create_doubleton");
        assert_eq!(card, c(Rank::Nine, Suit::Diamonds));
    }

    #[test]
    fn fallback_protects_guarded_king() {
        // Trump hearts; next is diamonds with a king so thin_next is skipped.
        let cards = [
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::King, Suit::Diamonds),
            c(Rank::Ten, Suit::Clubs),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
        ];
        let (card, rule) = DiscardPlanner::choose_with_rule(&cards, Suit::Hearts).unwrap();
        assert_eq!(rule, "lowest_overall");
        assert_eq!(card, c(Rank::Ten, Suit::Clubs));
    }

    #[test]
    fn rejects_wrong_hand_size() {
        assert_eq!(
            DiscardPlanner::choose(&[c(Rank::Nine, Suit::Clubs)], Suit::Clubs),
            Err(DiscardError::HandSize {
                expected: 6,
                actual: 1
            })
        );
    }

    #[test]
    fn every_six_card_hand_yields_a_held_card() {
        let deck = Deck::standard();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..2_000 {
            let cards: Vec<Card> = deck.cards().choose_multiple(&mut rng, 6).copied().collect();
            for trump in Suit::ALL {
                let card = DiscardPlanner::choose(&cards, trump).unwrap();
                assert!(cards.contains(&card));
                let suit_of = |x: &Card| {
                    cards
                        .iter()
                        .filter(|o| o.effective_suit(trump) == x.effective_suit(trump))
                        .count()
                };
                let lone_ace = |x: &Card| x.is_ace() && !x.is_trump(trump) && suit_of(x) == 1;
                let king_guard = |x: &Card| {
                    suit_of(x) == 2
                        && !x.is_king()
                        && cards.iter().any(|o| {
                            o.is_king() && o.effective_suit(trump) == x.effective_suit(trump)
                        })
                };
                let only_saved_cards_left = cards
                    .iter()
                    .filter(|x| !x.is_trump(trump))
                    .all(|x| lone_ace(x) || king_guard(x));
                if lone_ace(&card) {
                    assert!(only_saved_cards_left, "lone ace {card} discarded from {cards:?}");
                }
                if king_guard(&card) {
                    assert!(only_saved_cards_left, "king guard {card} discarded from {cards:?}");
                }
            }
        }
    }
}
