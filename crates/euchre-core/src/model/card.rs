use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Effective level of the left bower (jack of the trump suit's color mate).
pub const LEFT_BOWER_LEVEL: u8 = 7;
/// Effective level of the right bower (jack of trump).
pub const RIGHT_BOWER_LEVEL: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn is_right_bower(self, trump: Suit) -> bool {
        matches!(self.rank, Rank::Jack) && self.suit as u8 == trump as u8
    }

    pub const fn is_left_bower(self, trump: Suit) -> bool {
        matches!(self.rank, Rank::Jack) && self.suit as u8 == trump.next_suit() as u8
    }

    /// Suit the card plays as once `trump` is fixed. The left bower becomes trump.
    pub const fn effective_suit(self, trump: Suit) -> Suit {
        if self.is_left_bower(trump) {
            trump
        } else {
            self.suit
        }
    }

    pub const fn is_trump(self, trump: Suit) -> bool {
        self.effective_suit(trump) as u8 == trump as u8
    }

    /// Level relative to `trump`: 9 < 10 < J < Q < K < A < left bower < right bower.
    pub const fn effective_level(self, trump: Suit) -> u8 {
        if self.is_right_bower(trump) {
            RIGHT_BOWER_LEVEL
        } else if self.is_left_bower(trump) {
            LEFT_BOWER_LEVEL
        } else {
            self.rank.level()
        }
    }

    /// Level of a turned-up card, valued as though its own suit were trump.
    pub const fn turncard_level(self) -> u8 {
        self.effective_level(self.suit)
    }

    /// Level of the turncard once bidding has settled. A jack counts as the
    /// right bower whenever the contract made it either bower; otherwise the
    /// plain rank level applies, including when the deal was passed out.
    pub const fn settled_turncard_level(self, contract: Option<Suit>) -> u8 {
        match contract {
            Some(trump) if self.is_right_bower(trump) || self.is_left_bower(trump) => {
                RIGHT_BOWER_LEVEL
            }
            _ => self.rank.level(),
        }
    }

    pub fn is_ace(self) -> bool {
        self.rank == Rank::Ace
    }

    pub fn is_king(self) -> bool {
        self.rank == Rank::King
    }

    /// Stable identity in `0..24`, grouped by suit.
    pub const fn index(self) -> usize {
        self.suit.index() * 6 + (self.rank.level() as usize - 1)
    }

}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Sort key that groups by effective suit and orders by effective level.
pub fn trump_sort_key(card: Card, trump: Suit) -> (usize, u8) {
    (card.effective_suit(trump).index(), card.effective_level(trump))
}

#[cfg(test)]
mod tests {
    use super::{Card, LEFT_BOWER_LEVEL, RIGHT_BOWER_LEVEL};
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use std::collections::HashSet;

    #[test]
    fn bowers_follow_trump_color() {
        let jc = Card::new(Rank::Jack, Suit::Clubs);
        let js = Card::new(Rank::Jack, Suit::Spades);
        assert_eq!(jc.effective_level(Suit::Clubs), RIGHT_BOWER_LEVEL);
        assert_eq!(js.effective_level(Suit::Clubs), LEFT_BOWER_LEVEL);
        assert_eq!(js.effective_suit(Suit::Clubs), Suit::Clubs);
        assert_eq!(js.effective_suit(Suit::Hearts), Suit::Spades);
        assert_eq!(jc.effective_level(Suit::Hearts), Rank::Jack.level());
    }

    #[test]
    fn effective_levels_are_a_total_order_within_each_suit() {
        let deck = Deck::standard();
        for trump in Suit::ALL {
            let mut rights = 0;
            let mut lefts = 0;
            for suit in Suit::ALL {
                let levels: Vec<u8> = deck
                    .cards()
                    .iter()
                    .filter(|c| c.effective_suit(trump) == suit)
                    .map(|c| c.effective_level(trump))
                    .collect();
                let unique: HashSet<u8> = levels.iter().copied().collect();
                assert_eq!(unique.len(), levels.len(), "duplicate level in {suit} with trump {trump}");
            }
            for card in deck.cards() {
                match card.effective_level(trump) {
                    RIGHT_BOWER_LEVEL => rights += 1,
                    LEFT_BOWER_LEVEL => lefts += 1,
                    level => assert!((1..=6).contains(&level)),
                }
            }
            assert_eq!(rights, 1);
            assert_eq!(lefts, 1);
        }
    }

    #[test]
    fn trump_suit_holds_seven_cards() {
        let deck = Deck::standard();
        for trump in Suit::ALL {
            let trumps = deck.cards().iter().filter(|c| c.is_trump(trump)).count();
            assert_eq!(trumps, 7);
            let next = trump.next_suit();
            let next_cards = deck
                .cards()
                .iter()
                .filter(|c| c.effective_suit(trump) == next)
                .count();
            assert_eq!(next_cards, 5);
        }
    }

    #[test]
    fn turned_jack_rates_as_right_bower() {
        assert_eq!(Card::new(Rank::Jack, Suit::Hearts).turncard_level(), RIGHT_BOWER_LEVEL);
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).turncard_level(), 6);
    }

    #[test]
    fn settled_jack_level_depends_on_the_contract() {
        let jack = Card::new(Rank::Jack, Suit::Hearts);
        assert_eq!(jack.settled_turncard_level(None), 3);
        assert_eq!(jack.settled_turncard_level(Some(Suit::Hearts)), RIGHT_BOWER_LEVEL);
        assert_eq!(jack.settled_turncard_level(Some(Suit::Diamonds)), RIGHT_BOWER_LEVEL);
        assert_eq!(jack.settled_turncard_level(Some(Suit::Clubs)), 3);
        let king = Card::new(Rank::King, Suit::Hearts);
        assert_eq!(king.settled_turncard_level(Some(Suit::Hearts)), 5);
    }

    #[test]
    fn indices_are_unique() {
        let deck = Deck::standard();
        let indices: HashSet<usize> = deck.cards().iter().map(|c| c.index()).collect();
        assert_eq!(indices.len(), 24);
        assert!(indices.iter().all(|&i| i < 24));
    }
}
