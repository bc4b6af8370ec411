use euchre_core::model::card::Card;
use euchre_core::model::deck::Deck;
use euchre_core::model::hand::Hand;
use euchre_core::model::player::Seat;
use euchre_core::model::suit::Suit;
use euchre_core::model::trick::Play;
use std::array;

/// One seat's view of the cards it has not seen, by effective suit.
///
/// Built once trump is fixed from the full deck minus the seat's own hand and
/// any cards it knows are out of play. Only information visible to the seat
/// flows in: its own cards and the cards played to tricks.
#[derive(Debug, Clone)]
pub struct UnseenTracker {
    seat: Seat,
    trump: Suit,
    outstanding: [Vec<Card>; 4],
    trump_played: usize,
    voids: [[bool; 4]; 4],
}

impl UnseenTracker {
    pub fn new(seat: Seat, trump: Suit) -> Self {
        Self {
            seat,
            trump,
            outstanding: array::from_fn(|_| Vec::new()),
            trump_played: 0,
            voids: [[false; 4]; 4],
        }
    }

    /// `known_out` lists cards the seat knows will never be played, such as a
    /// turned-down turncard or its own discard.
    pub fn reset(&mut self, hand: &Hand, trump: Suit, known_out: &[Card]) {
        self.trump = trump;
        self.trump_played = 0;
        self.voids = [[false; 4]; 4];
        for bucket in &mut self.outstanding {
            bucket.clear();
        }
        for &card in Deck::standard().cards() {
            if hand.contains(card) || known_out.contains(&card) {
                continue;
            }
            self.outstanding[card.effective_suit(trump).index()].push(card);
        }
        for bucket in &mut self.outstanding {
            bucket.sort_by_key(|card| card.effective_level(trump));
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn trump(&self) -> Suit {
        self.trump
    }

    /// Records a card landing on the table. A seat that does not follow the
    /// led suit is marked void in it.
    pub fn note_play(&mut self, lead_suit: Option<Suit>, play: Play) {
        let suit = play.card.effective_suit(self.trump);
        let bucket = &mut self.outstanding[suit.index()];
        if let Some(pos) = bucket.iter().position(|c| *c == play.card) {
            bucket.remove(pos);
        }
        if suit == self.trump {
            self.trump_played += 1;
        }
        if let Some(led) = lead_suit {
            if led != suit {
                self.voids[play.seat.index()][led.index()] = true;
            }
        }
    }

    /// Cards of `suit` still in other hands, lowest first.
    pub fn outstanding(&self, suit: Suit) -> &[Card] {
        &self.outstanding[suit.index()]
    }

    pub fn outstanding_count(&self, suit: Suit) -> usize {
        self.outstanding[suit.index()].len()
    }

    pub fn unseen_count(&self) -> usize {
        self.outstanding.iter().map(Vec::len).sum()
    }

    /// Highest card of `suit` not yet seen, if any remain.
    pub fn high_card(&self, suit: Suit) -> Option<Card> {
        self.outstanding[suit.index()].last().copied()
    }

    /// Whether `card` beats every unseen card of its effective suit.
    pub fn is_boss(&self, card: Card) -> bool {
        let suit = card.effective_suit(self.trump);
        self.high_card(suit)
            .is_none_or(|high| high.effective_level(self.trump) < card.effective_level(self.trump))
    }

    /// Trump cards played so far by any seat.
    pub fn trump_played(&self) -> usize {
        self.trump_played
    }

    pub fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids[seat.index()][suit.index()]
    }
}
