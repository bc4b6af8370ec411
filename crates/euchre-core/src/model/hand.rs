use crate::model::card::{Card, trump_sort_key};
use crate::model::suit::Suit;
use std::array;

/// A seat's holding. The flat card list and the per-suit buckets are only ever
/// changed together, through `add`, `remove` and `set_trump`.
///
/// Before trump is fixed, cards are bucketed by natural suit; afterwards by
/// effective suit, so the left bower sits in the trump bucket. Buckets are
/// ordered by effective level, lowest first.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
    buckets: [Vec<Card>; 4],
    trump: Option<Suit>,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            buckets: array::from_fn(|_| Vec::new()),
            trump: None,
        }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self {
            cards,
            ..Self::new()
        };
        hand.rebuild();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.rebuild();
    }

    pub fn remove(&mut self, card: Card) -> bool {
        let Some(index) = self.cards.iter().position(|&c| c == card) else {
            return false;
        };
        self.cards.remove(index);
        let suit = self.bucket_of(card);
        let bucket = &mut self.buckets[suit.index()];
        if let Some(pos) = bucket.iter().position(|&c| c == card) {
            bucket.remove(pos);
        }
        true
    }

    /// Re-sorts and re-buckets the hand relative to the declared trump.
    pub fn set_trump(&mut self, trump: Suit) {
        self.trump = Some(trump);
        self.rebuild();
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Cards whose (effective) suit is `suit`, lowest level first.
    pub fn suit_cards(&self, suit: Suit) -> &[Card] {
        &self.buckets[suit.index()]
    }

    pub fn count(&self, suit: Suit) -> usize {
        self.buckets[suit.index()].len()
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        !self.buckets[suit.index()].is_empty()
    }

    fn bucket_of(&self, card: Card) -> Suit {
        match self.trump {
            Some(trump) => card.effective_suit(trump),
            None => card.suit,
        }
    }

    fn level_of(&self, card: Card) -> u8 {
        match self.trump {
            Some(trump) => card.effective_level(trump),
            None => card.rank.level(),
        }
    }

    fn rebuild(&mut self) {
        match self.trump {
            Some(trump) => self.cards.sort_by_key(|&c| trump_sort_key(c, trump)),
            None => self.cards.sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank))),
        }
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for &card in &self.cards {
            let suit = self.bucket_of(card);
            self.buckets[suit.index()].push(card);
        }
        for idx in 0..self.buckets.len() {
            let mut bucket = std::mem::take(&mut self.buckets[idx]);
            bucket.sort_by_key(|&c| self.level_of(c));
            self.buckets[idx] = bucket;
        }
    }
}
