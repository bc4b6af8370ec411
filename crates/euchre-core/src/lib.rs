//! Rules engine for four-player partnership Euchre: cards and hands, the
//! bidding and trick-taking state machine, hand analysis, and game/match
//! bookkeeping.

pub mod analysis;
pub mod game;
pub mod model;
