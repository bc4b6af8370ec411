use crate::game::record::DealRecord;
use crate::model::deal::{Deal, DealError, DealPhase, DealRules};
use crate::model::deck::Deck;
use crate::model::player::{Seat, Team};
use crate::model::score::ScoreBoard;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;

pub const DEFAULT_GAME_POINTS: u32 = 10;
pub const DEFAULT_MATCH_GAMES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub game_points: u32,
    pub rules: DealRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_points: DEFAULT_GAME_POINTS,
            rules: DealRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    GameOver(Team),
    DealUnfinished(DealPhase),
    WrongDealer { expected: Seat, actual: Seat },
    Deal(DealError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::GameOver(team) => write!(f, "game already won by {team}"),
            GameError::DealUnfinished(phase) => {
                write!(f, "deal cannot be archived while {phase:?}")
            }
            GameError::WrongDealer { expected, actual } => {
                write!(f, "deal was dealt by {actual} but {expected} holds the deal")
            }
            GameError::Deal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<DealError> for GameError {
    fn from(err: DealError) -> Self {
        GameError::Deal(err)
    }
}

/// A single game: deals rotate clockwise until one team reaches the target.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    scores: ScoreBoard,
    dealer: Seat,
    records: Vec<DealRecord>,
    winner: Option<Team>,
}

impl Game {
    /// Picks the first dealer at random.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        let dealer = Seat::LOOP[rng.gen_range(0..Seat::LOOP.len())];
        Self::with_dealer(config, dealer)
    }

    pub fn with_dealer(config: GameConfig, dealer: Seat) -> Self {
        Self {
            config,
            scores: ScoreBoard::new(),
            dealer,
            records: Vec::new(),
            winner: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn records(&self) -> &[DealRecord] {
        &self.records
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Shuffles and deals the next deal for the current dealer.
    pub fn start_deal<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Deal, GameError> {
        self.start_deal_from_deck(Deck::shuffled(rng))
    }

    pub fn start_deal_from_deck(&self, deck: Deck) -> Result<Deal, GameError> {
        if let Some(team) = self.winner {
            return Err(GameError::GameOver(team));
        }
        let mut deal = Deal::from_deck(self.dealer, self.config.rules, deck);
        deal.deal_cards()?;
        Ok(deal)
    }

    /// Archives a finished deal, applies its points and passes the deal on.
    pub fn finish_deal(&mut self, deal: &Deal) -> Result<DealRecord, GameError> {
        if let Some(team) = self.winner {
            return Err(GameError::GameOver(team));
        }
        if deal.dealer() != self.dealer {
            return Err(GameError::WrongDealer {
                expected: self.dealer,
                actual: deal.dealer(),
            });
        }
        let record =
            DealRecord::from_deal(deal).ok_or(GameError::DealUnfinished(deal.phase()))?;

        self.scores.apply_deal(record.team_points);
        self.records.push(record.clone());
        self.dealer = self.dealer.next();

        if let Some(team) = self.scores.leading_team() {
            if self.scores.score(team) >= self.config.game_points {
                self.winner = Some(team);
            }
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub game: GameConfig,
    pub match_games: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            match_games: DEFAULT_MATCH_GAMES,
        }
    }
}

/// A seeded match. Every deal draws its own seed from the match stream, so a
/// match is reproducible from `seed` alone.
#[derive(Debug, Clone)]
pub struct MatchState {
    config: MatchConfig,
    seed: u64,
    rng: StdRng,
    game: Game,
    games_won: [u32; 2],
    completed_games: Vec<Game>,
    deal_number: u32,
}

impl MatchState {
    pub fn with_seed(config: MatchConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let game = Game::new(config.game, &mut rng);
        Self {
            config,
            seed,
            rng,
            game,
            games_won: [0; 2],
            completed_games: Vec::new(),
            deal_number: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn completed_games(&self) -> &[Game] {
        &self.completed_games
    }

    pub fn games_won(&self) -> [u32; 2] {
        self.games_won
    }

    /// Number of the game in progress, or of the deciding game once the
    /// match is over.
    pub fn game_number(&self) -> u32 {
        let games = self.completed_games.len() as u32;
        if self.winner().is_some() { games } else { games + 1 }
    }

    pub fn deal_number(&self) -> u32 {
        self.deal_number
    }

    pub fn winner(&self) -> Option<Team> {
        Team::BOTH
            .into_iter()
            .find(|team| self.games_won[team.index()] >= self.config.match_games)
    }

    /// Deals the next hand. The returned generator continues the deal's own
    /// stream and is meant for decision tie-breaks within that deal.
    pub fn next_deal(&mut self) -> Result<(Deal, StdRng), GameError> {
        if let Some(team) = self.winner() {
            return Err(GameError::GameOver(team));
        }
        let mut deal_rng = StdRng::seed_from_u64(self.rng.next_u64());
        let deal = self.game.start_deal(&mut deal_rng)?;
        self.deal_number += 1;
        Ok((deal, deal_rng))
    }

    pub fn finish_deal(&mut self, deal: &Deal) -> Result<DealRecord, GameError> {
        let record = self.game.finish_deal(deal)?;
        if let Some(team) = self.game.winner() {
            self.games_won[team.index()] += 1;
            if self.winner().is_none() {
                let next = Game::new(self.config.game, &mut self.rng);
                self.completed_games
                    .push(std::mem::replace(&mut self.game, next));
            } else {
                // The deciding game stays current but is archived as well.
                self.completed_games.push(self.game.clone());
            }
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::{Game, GameConfig, GameError, MatchConfig, MatchState};
    use crate::model::deal::Deal;
    use crate::model::deck::Deck;
    use crate::model::player::{Seat, Team};

    /// Order up on the first bid and play the first legal card everywhere.
    fn play_out(deal: &mut Deal) {
        let first = Seat::at_position(deal.dealer(), 0);
        let turn = deal.turncard().unwrap().suit;
        deal.submit_bid(first, Some(turn)).unwrap();
        let dealer = deal.dealer();
        let discard = deal.hand(dealer).cards()[0];
        deal.submit_discard(dealer, discard).unwrap();
        while let Some(seat) = deal.expected_player() {
            let card = deal.legal_cards(seat)[0];
            deal.play_card(seat, card).unwrap();
        }
    }

    fn pass_out(deal: &mut Deal) {
        for position in 0..8 {
            let seat = Seat::at_position(deal.dealer(), position);
            deal.submit_bid(seat, None).unwrap();
        }
    }

    #[test]
    fn dealer_rotates_after_each_deal() {
        let mut game = Game::with_dealer(GameConfig::default(), Seat::South);
        let mut deal = game.start_deal_from_deck(Deck::standard()).unwrap();
        pass_out(&mut deal);
        game.finish_deal(&deal).unwrap();
        assert_eq!(game.dealer(), Seat::West);
        assert_eq!(game.records().len(), 1);
        assert_eq!(game.scores().totals(), [0, 0]);
    }

    #[test]
    fn unfinished_or_foreign_deals_are_rejected() {
        let mut game = Game::with_dealer(GameConfig::default(), Seat::North);
        let deal = game.start_deal_from_deck(Deck::standard()).unwrap();
        assert!(matches!(
            game.finish_deal(&deal),
            Err(GameError::DealUnfinished(_))
        ));

        let mut other = Game::with_dealer(GameConfig::default(), Seat::East)
            .start_deal_from_deck(Deck::standard())
            .unwrap();
        pass_out(&mut other);
        assert_eq!(
            game.finish_deal(&other),
            Err(GameError::WrongDealer {
                expected: Seat::North,
                actual: Seat::East
            })
        );
    }

    #[test]
    fn game_ends_at_target_and_refuses_new_deals() {
        let config = GameConfig {
            game_points: 1,
            ..GameConfig::default()
        };
        let mut game = Game::with_dealer(config, Seat::North);
        let mut deal = game
            .start_deal_from_deck(Deck::shuffled_with_seed(8))
            .unwrap();
        play_out(&mut deal);
        let record = game.finish_deal(&deal).unwrap();
        let winner = if record.team_points[0] > 0 {
            Team::NorthSouth
        } else {
            Team::EastWest
        };
        assert_eq!(game.winner(), Some(winner));
        assert_eq!(
            game.start_deal_from_deck(Deck::standard()).err(),
            Some(GameError::GameOver(winner))
        );
    }

    #[test]
    fn seeded_match_is_reproducible_and_finishes() {
        let run = |seed| {
            let mut state = MatchState::with_seed(MatchConfig::default(), seed);
            let mut records = Vec::new();
            while state.winner().is_none() {
                let (mut deal, _rng) = state.next_deal().unwrap();
                play_out(&mut deal);
                records.push(state.finish_deal(&deal).unwrap());
            }
            (records, state.games_won())
        };
        let (first, won) = run(77);
        let (second, _) = run(77);
        assert_eq!(first, second);
        assert!(won.contains(&2));
        assert!(won.iter().sum::<u32>() <= 3);
    }

    #[test]
    fn finished_match_archives_every_game() {
        let mut state = MatchState::with_seed(MatchConfig::default(), 12);
        let mut deals = 0;
        while state.winner().is_none() {
            let (mut deal, _rng) = state.next_deal().unwrap();
            play_out(&mut deal);
            state.finish_deal(&deal).unwrap();
            deals += 1;
        }
        let played: u32 = state.games_won().iter().sum();
        let games = state.completed_games();
        assert_eq!(games.len() as u32, played);
        assert_eq!(state.game_number(), played);
        assert!(games.iter().all(|game| game.winner().is_some()));
        let last = games.last().unwrap();
        assert_eq!(last.winner(), state.winner());
        assert_eq!(last.records(), state.game().records());
        let archived: usize = games.iter().map(|game| game.records().len()).sum();
        assert_eq!(archived, deals);
    }
}
